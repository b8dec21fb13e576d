//! Emits PDDL problem files (§4.5). Grounded on
//! `original_source/save.py::generate_problem_files`.

use crate::model::Graph;
use crate::sanitize::sanitize;

/// One `(define (problem ...))` file, paired with its intended filename.
pub struct Problem {
    pub file_stem: String,
    pub text: String,
}

/// Predicates excluded from the `:objects` section even though they stay
/// declared (§4.5): per-diverge-gateway branch and activation markers.
fn is_object_excluded(predicate: &str) -> bool {
    predicate.starts_with("branch_started_") || predicate.starts_with("at_least_one_branch_")
}

/// Classifies a declared predicate into an object type by substring
/// heuristic on the sanitized name: gateway > event > task (§4.5, §9).
fn classify(predicate: &str) -> Option<&'static str> {
    if is_object_excluded(predicate) {
        return None;
    }
    if predicate.contains("Gateway") {
        Some("gateway")
    } else if predicate.contains("Event") {
        Some("event")
    } else if predicate.contains("Task") || predicate.contains("Activity") {
        Some("task")
    } else {
        None
    }
}

fn objects_section(predicates: &[String]) -> String {
    let mut tasks = Vec::new();
    let mut events = Vec::new();
    let mut gateways = Vec::new();

    for p in predicates {
        match classify(p) {
            Some("task") => tasks.push(p.as_str()),
            Some("event") => events.push(p.as_str()),
            Some("gateway") => gateways.push(p.as_str()),
            _ => {}
        }
    }

    let mut out = String::new();
    if !tasks.is_empty() {
        out.push_str(&format!("    {} - task\n", tasks.join(" ")));
    }
    if !events.is_empty() {
        out.push_str(&format!("    {} - event\n", events.join(" ")));
    }
    if !gateways.is_empty() {
        out.push_str(&format!("    {} - gateway\n", gateways.join(" ")));
    }
    out
}

fn inclusive_counter_zero_facts(predicates: &[String]) -> Vec<&str> {
    predicates
        .iter()
        .filter(|p| p.starts_with("inclusive_counter_") && p.ends_with("_0"))
        .map(String::as_str)
        .collect()
}

fn render(problem_name: &str, domain_name: &str, objects: &str, init_facts: &[String]) -> String {
    let init = init_facts
        .iter()
        .map(|f| format!("({f})"))
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "(define (problem {problem_name})\n  (:domain {domain_name})\n  (:objects\n{objects}  )\n  (:init {init})\n  (:goal (and (done)))\n)"
    )
}

/// Generates `p0.pddl` plus one `p0<i>.pddl` per Start Event (§4.5).
pub fn generate_problems(graph: &Graph, domain_name: &str, predicates: &[String]) -> Vec<Problem> {
    let objects = objects_section(predicates);
    let counter_zeros: Vec<String> = inclusive_counter_zero_facts(predicates)
        .into_iter()
        .map(String::from)
        .collect();

    let mut problems = Vec::with_capacity(graph.start_events().count() + 1);

    problems.push(Problem {
        file_stem: "p0".to_string(),
        text: render("p0", domain_name, &objects, &counter_zeros),
    });

    for (i, start) in graph.start_events().enumerate() {
        let mut init = vec![sanitize(&start.id)];
        init.extend(counter_zeros.iter().cloned());
        let file_stem = format!("p0{}", i + 1);
        problems.push(Problem {
            file_stem: file_stem.clone(),
            text: render(&file_stem, domain_name, &objects, &init),
        });
    }

    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::ingest_str;
    use crate::normalize::normalize;

    fn build(xml: &str) -> Graph {
        let mut graph = ingest_str(xml).unwrap();
        normalize(&mut graph);
        graph
    }

    #[test]
    fn one_problem_per_start_event_plus_default() {
        let xml = r#"<?xml version="1.0"?>
<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL" id="defs">
  <bpmn:process id="p">
    <bpmn:startEvent id="s1" name="Start A"/>
    <bpmn:startEvent id="s2" name="Start B"/>
    <bpmn:task id="a"/>
    <bpmn:endEvent id="e"/>
    <bpmn:sequenceFlow id="f1" sourceRef="s1" targetRef="a"/>
    <bpmn:sequenceFlow id="f2" sourceRef="s2" targetRef="a"/>
    <bpmn:sequenceFlow id="f3" sourceRef="a" targetRef="e"/>
  </bpmn:process>
</bpmn:definitions>"#;
        let graph = build(xml);
        let predicates = vec![
            "s1".to_string(),
            "s2".to_string(),
            "a".to_string(),
            "e".to_string(),
        ];
        let problems = generate_problems(&graph, "d", &predicates);
        assert_eq!(problems.len(), 3);
        assert_eq!(problems[0].file_stem, "p0");
        assert_eq!(problems[1].file_stem, "p01");
        assert_eq!(problems[2].file_stem, "p02");
        assert!(problems[1].text.contains("(s1)"));
        assert!(problems[2].text.contains("(s2)"));
    }

    #[test]
    fn excludes_branch_markers_from_objects() {
        let graph = Graph::default();
        let predicates = vec![
            "branch_started_d_a".to_string(),
            "at_least_one_branch_d".to_string(),
            "done".to_string(),
        ];
        let problems = generate_problems(&graph, "d", &predicates);
        assert!(!problems[0].text.contains("branch_started"));
        assert!(!problems[0].text.contains("at_least_one_branch"));
    }
}
