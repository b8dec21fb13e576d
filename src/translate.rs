//! Orchestrates ingest → normalize → analyze → encode → problem generation
//! and writes the resulting artifacts to disk (§5, §6).

use crate::analyze::analyze;
use crate::encode::encode;
use crate::error::{Error, Result};
use crate::ingest::ingest_file;
use crate::normalize::normalize;
use crate::problem::generate_problems;
use std::fs;
use std::path::{Path, PathBuf};

/// Paths of every artifact written by a successful translation.
pub struct Output {
    pub domain_path: PathBuf,
    pub problem_paths: Vec<PathBuf>,
}

/// Translates the BPMN file at `input_path` into a PDDL domain named
/// `domain_name`, writing artifacts under
/// `<cwd>/<diagram_stem>/not_flattened/` (§5 shared-resource policy, §6).
pub fn translate(input_path: &Path, domain_name: &str) -> Result<Output> {
    log::info!("ingesting {}", input_path.display());
    let mut graph = ingest_file(input_path)?;

    log::info!("normalizing graph");
    normalize(&mut graph);

    log::info!("analyzing graph structure");
    let analyzed = analyze(&graph)?;

    log::info!("encoding PDDL domain");
    let domain = encode(&graph, &analyzed, domain_name);
    let problems = generate_problems(&graph, domain_name, &domain.predicates);

    let stem = input_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| domain_name.to_string());
    let out_dir = Path::new(".").join(&stem).join("not_flattened");
    fs::create_dir_all(&out_dir).map_err(|e| Error::OutputDir(out_dir.display().to_string(), e))?;

    let domain_path = out_dir.join(format!("{stem}_domain_no_flatten.pddl"));
    fs::write(&domain_path, domain.to_string())
        .map_err(|e| Error::OutputFile(domain_path.display().to_string(), e))?;

    let mut problem_paths = Vec::with_capacity(problems.len());
    for problem in &problems {
        let path = out_dir.join(format!("{}.pddl", problem.file_stem));
        fs::write(&path, &problem.text)
            .map_err(|e| Error::OutputFile(path.display().to_string(), e))?;
        problem_paths.push(path);
    }

    Ok(Output {
        domain_path,
        problem_paths,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn translates_minimal_diagram_to_disk() {
        let xml = r#"<?xml version="1.0"?>
<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL" id="defs">
  <bpmn:process id="p">
    <bpmn:startEvent id="s" name="Start"/>
    <bpmn:task id="t" name="Do it"/>
    <bpmn:endEvent id="e" name="End"/>
    <bpmn:sequenceFlow id="f1" sourceRef="s" targetRef="t"/>
    <bpmn:sequenceFlow id="f2" sourceRef="t" targetRef="e"/>
  </bpmn:process>
</bpmn:definitions>"#;
        let dir = tempfile::tempdir().unwrap();
        let input_path = dir.path().join("minimal.bpmn");
        let mut f = fs::File::create(&input_path).unwrap();
        f.write_all(xml.as_bytes()).unwrap();

        let cwd = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir.path()).unwrap();
        let result = translate(&input_path, "minimal");
        let output = result.unwrap();
        assert!(output.domain_path.exists());
        assert_eq!(output.problem_paths.len(), 2);
        for p in &output.problem_paths {
            assert!(p.exists());
        }
        std::env::set_current_dir(cwd).unwrap();
    }
}
