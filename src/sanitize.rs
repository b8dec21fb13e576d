//! Identifier sanitization for PDDL output (§4.6).

use std::collections::HashMap;

/// Replace every character outside `[A-Za-z0-9_]` with `_`.
pub fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Uniquifies sanitized action names by suffixing `_2`, `_3`, ... on
/// collision (§4.6, §4.4 rule 8's `_from_<src>` disambiguation).
#[derive(Default)]
pub struct NameUniquifier {
    used: HashMap<String, usize>,
}

impl NameUniquifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unique(&mut self, base: impl Into<String>) -> String {
        let base = base.into();
        match self.used.get_mut(&base) {
            None => {
                self.used.insert(base.clone(), 1);
                base
            }
            Some(count) => {
                *count += 1;
                format!("{base}_{count}")
            }
        }
    }
}
