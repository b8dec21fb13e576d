//! End-to-end fixtures exercising the whole pipeline: ingest through
//! problem generation, against the §8 testable properties.

use bpmn2pddl::analyze::analyze;
use bpmn2pddl::encode::encode;
use bpmn2pddl::ingest::ingest_str;
use bpmn2pddl::model::Graph;
use bpmn2pddl::normalize::normalize;
use bpmn2pddl::problem::generate_problems;

fn run(
    xml: &str,
    domain_name: &str,
) -> (
    Graph,
    bpmn2pddl::encode::EncodedDomain,
    Vec<bpmn2pddl::problem::Problem>,
) {
    let mut graph = ingest_str(xml).unwrap();
    normalize(&mut graph);
    let analyzed = analyze(&graph).unwrap();
    let domain = encode(&graph, &analyzed, domain_name);
    let problems = generate_problems(&graph, domain_name, &domain.predicates);
    (graph, domain, problems)
}

/// §8 property 6: the emitted domain is balanced, well-formed S-expression
/// text.
fn assert_balanced(text: &str) {
    let mut depth = 0i32;
    for c in text.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
        assert!(depth >= 0, "unbalanced parens in {text}");
    }
    assert_eq!(depth, 0, "unbalanced parens in {text}");
}

/// §8 property 1: every predicate used in an action is declared.
fn assert_predicates_declared(domain: &bpmn2pddl::encode::EncodedDomain) {
    let declared: std::collections::HashSet<&str> =
        domain.predicates.iter().map(String::as_str).collect();
    for action in &domain.actions {
        for text in [&action.precondition, &action.effect] {
            for token in text.split(['(', ')', ' ']).filter(|t| !t.is_empty()) {
                if token == "and" || token == "not" || token == "oneof" || token == "when" {
                    continue;
                }
                assert!(
                    declared.contains(token),
                    "predicate {token} used in action {} but not declared",
                    action.name
                );
            }
        }
    }
}

const LINEAR: &str = r#"<?xml version="1.0"?>
<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL" id="defs">
  <bpmn:process id="p">
    <bpmn:startEvent id="s1" name="Start"/>
    <bpmn:task id="t1" name="Pay"/>
    <bpmn:endEvent id="e1" name="End"/>
    <bpmn:sequenceFlow id="f1" sourceRef="s1" targetRef="t1"/>
    <bpmn:sequenceFlow id="f2" sourceRef="t1" targetRef="e1"/>
  </bpmn:process>
</bpmn:definitions>"#;

#[test]
fn linear_diagram_end_to_end() {
    let (_graph, domain, problems) = run(LINEAR, "order");
    assert_eq!(domain.actions.len(), 3);
    assert_balanced(&domain.to_string());
    assert_predicates_declared(&domain);

    assert_eq!(problems.len(), 2);
    assert_eq!(problems[0].file_stem, "p0");
    assert_eq!(problems[1].file_stem, "p01");
    assert!(problems[1].text.contains("(s1)"));
    assert_balanced(&problems[1].text);
}

/// §8 idempotence: two runs on the same input produce byte-identical
/// output.
#[test]
fn idempotent_across_runs() {
    let (_g1, d1, p1) = run(LINEAR, "order");
    let (_g2, d2, p2) = run(LINEAR, "order");
    assert_eq!(d1.to_string(), d2.to_string());
    assert_eq!(
        p1.iter().map(|p| &p.text).collect::<Vec<_>>(),
        p2.iter().map(|p| &p.text).collect::<Vec<_>>()
    );
}

/// §8 boundary case: no start events produces only `p0.pddl` and a domain
/// with no actions beyond end-event goals (here, none).
#[test]
fn diagram_with_no_start_events() {
    let xml = r#"<?xml version="1.0"?>
<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL" id="defs">
  <bpmn:process id="p"/>
</bpmn:definitions>"#;
    let (_graph, domain, problems) = run(xml, "empty");
    assert!(domain.actions.is_empty());
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].file_stem, "p0");
}

/// §8 scenario 6 ("Message flow promotion"): a task-to-start-event message
/// flow reclassifies the start event and splices a synthetic sequence
/// flow, so the planner sees `ta` and `sb` as sequentially linked.
#[test]
fn message_flow_promotion_links_pools() {
    let xml = r#"<?xml version="1.0"?>
<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL" id="defs">
  <bpmn:process id="pa">
    <bpmn:task id="ta" name="Send"/>
  </bpmn:process>
  <bpmn:process id="pb">
    <bpmn:startEvent id="sb" name="Receive"/>
    <bpmn:task id="tb" name="Handle"/>
    <bpmn:sequenceFlow id="f1" sourceRef="sb" targetRef="tb"/>
  </bpmn:process>
  <bpmn:messageFlow id="mf1" sourceRef="ta" targetRef="sb"/>
</bpmn:definitions>"#;
    let (graph, domain, _problems) = run(xml, "pools");

    assert!(matches!(
        graph.get("sb").unwrap().kind,
        bpmn2pddl::model::NodeKind::Event(bpmn2pddl::model::EventKind::IntermediateCatch)
    ));
    assert!(
        graph
            .sequence_flows()
            .any(|e| e.id == "mf1_from_msgflow" && e.source_id == "ta" && e.target_id == "sb")
    );

    // `ta` has an outgoing message flow, so its completion conjunctively
    // activates `sb` rather than offering it as a `oneof` alternative.
    let send = domain.actions.iter().find(|a| a.name == "Send").unwrap();
    assert!(send.effect.contains("(sb)"));
    assert_balanced(&domain.to_string());
}

/// §8 boundary case: a diagram whose only gateway is event-based emits
/// `oneof` branches in source order.
#[test]
fn event_based_gateway_emits_oneof_in_source_order() {
    let xml = r#"<?xml version="1.0"?>
<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL" id="defs">
  <bpmn:process id="p">
    <bpmn:startEvent id="s"/>
    <bpmn:eventBasedGateway id="g"/>
    <bpmn:intermediateCatchEvent id="m1" name="First"/>
    <bpmn:intermediateCatchEvent id="m2" name="Second"/>
    <bpmn:sequenceFlow id="f1" sourceRef="s" targetRef="g"/>
    <bpmn:sequenceFlow id="f2" sourceRef="g" targetRef="m1"/>
    <bpmn:sequenceFlow id="f3" sourceRef="g" targetRef="m2"/>
  </bpmn:process>
</bpmn:definitions>"#;
    let (_graph, domain, _problems) = run(xml, "race");
    let gw = domain.actions.iter().find(|a| a.name == "event_g").unwrap();
    let m1_pos = gw.effect.find("(m1)").unwrap();
    let m2_pos = gw.effect.find("(m2)").unwrap();
    assert!(
        m1_pos < m2_pos,
        "branches must stay in source order: {}",
        gw.effect
    );
    assert!(gw.effect.starts_with("(and (oneof (m1) (m2))"));
}
