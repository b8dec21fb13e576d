//! Translates a small inline BPMN diagram and prints the resulting PDDL
//! domain and problem to stdout, without touching the filesystem.

use bpmn2pddl::analyze::analyze;
use bpmn2pddl::encode::encode;
use bpmn2pddl::ingest::ingest_str;
use bpmn2pddl::normalize::normalize;
use bpmn2pddl::problem::generate_problems;

extern crate pretty_env_logger;

const DIAGRAM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL" id="defs">
  <bpmn:process id="order">
    <bpmn:startEvent id="s1" name="Order placed"/>
    <bpmn:exclusiveGateway id="g1" name="In stock?"/>
    <bpmn:task id="t1" name="Ship item"/>
    <bpmn:task id="t2" name="Notify backorder"/>
    <bpmn:endEvent id="e1" name="Order closed"/>
    <bpmn:sequenceFlow id="f1" sourceRef="s1" targetRef="g1"/>
    <bpmn:sequenceFlow id="f2" sourceRef="g1" targetRef="t1"/>
    <bpmn:sequenceFlow id="f3" sourceRef="g1" targetRef="t2"/>
    <bpmn:sequenceFlow id="f4" sourceRef="t1" targetRef="e1"/>
    <bpmn:sequenceFlow id="f5" sourceRef="t2" targetRef="e1"/>
  </bpmn:process>
</bpmn:definitions>"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    let mut graph = ingest_str(DIAGRAM)?;
    normalize(&mut graph);
    let analyzed = analyze(&graph)?;
    let domain = encode(&graph, &analyzed, "order");
    let problems = generate_problems(&graph, "order", &domain.predicates);

    println!("{domain}");
    for problem in &problems {
        println!("\n; --- {}.pddl ---\n{}", problem.file_stem, problem.text);
    }
    Ok(())
}
