//! Normalizes a raw ingested graph (§4.2): duplicate collapse, message-flow
//! promotion, alias rewriting. Grounded on
//! `original_source/save.py::merge_duplicate_elements` and the message-flow
//! promotion block inside `generate_pddl_domain`.

use crate::model::{EventKind, FlowKind, Graph, NodeKind};
use std::collections::{BTreeSet, HashMap};

/// Maps a collapsed duplicate id to the primary id it was merged into.
pub type Alias = HashMap<String, String>;

#[derive(PartialEq, Eq, Hash, Clone, Copy)]
enum KindKey {
    Event(EventKind),
    Task(crate::model::TaskKind),
    Lane,
    Pool,
}

fn kind_key(kind: &NodeKind) -> Option<KindKey> {
    match kind {
        NodeKind::Event(k) => Some(KindKey::Event(*k)),
        NodeKind::Task(k) => Some(KindKey::Task(*k)),
        NodeKind::Lane { .. } => Some(KindKey::Lane),
        NodeKind::Pool { .. } => Some(KindKey::Pool),
        NodeKind::Gateway(_) => None,
    }
}

/// Mutates `graph` in place per §4.2 and returns the resulting alias map.
pub fn normalize(graph: &mut Graph) -> Alias {
    let alias = collapse_duplicates(graph);
    promote_message_flows(graph);
    rewrite_aliases(graph, &alias);
    alias
}

/// §4.2 duplicate collapse: merges non-flow, non-gateway nodes sharing
/// `(kind, name, outgoing-target-set)`. Flow nodes (edges) and all
/// gateways are always kept distinct.
fn collapse_duplicates(graph: &mut Graph) -> Alias {
    let mut outgoing: HashMap<&str, BTreeSet<&str>> = HashMap::new();
    for edge in graph.sequence_flows() {
        outgoing
            .entry(edge.source_id.as_str())
            .or_default()
            .insert(edge.target_id.as_str());
    }

    let mut alias = Alias::new();
    let mut seen: HashMap<(KindKey, Option<String>, BTreeSet<String>), String> = HashMap::new();
    let mut keep = vec![true; graph.nodes.len()];
    let mut merges: Vec<(usize, usize)> = Vec::new();

    #[allow(clippy::needless_range_loop)]
    for i in 0..graph.nodes.len() {
        let node = &graph.nodes[i];
        let Some(kk) = kind_key(&node.kind) else {
            continue;
        };
        let outs: BTreeSet<String> = outgoing
            .get(node.id.as_str())
            .map(|s| s.iter().map(|s| s.to_string()).collect())
            .unwrap_or_default();
        let key = (kk, node.name.clone(), outs);

        if let Some(canonical_id) = seen.get(&key) {
            alias.insert(node.id.clone(), canonical_id.clone());
            keep[i] = false;
            let canonical_idx = graph
                .nodes
                .iter()
                .position(|n| &n.id == canonical_id)
                .unwrap();
            merges.push((canonical_idx, i));
        } else {
            seen.insert(key, node.id.clone());
        }
    }

    for (canonical_idx, dup_idx) in merges {
        let dup = graph.nodes[dup_idx].clone();
        graph.nodes[canonical_idx].merge_extras(&dup);
    }

    let mut idx = 0;
    graph.nodes.retain(|_| {
        let keep_this = keep[idx];
        idx += 1;
        keep_this
    });

    log::debug!("collapsed {} duplicate node(s)", alias.len());
    alias
}

/// §4.2 message-flow promotion: a valid message flow (task↔event
/// endpoints) reclassifies a Start Event endpoint as an Intermediate Catch
/// Event and splices a synthetic sequence flow between the endpoints.
fn promote_message_flows(graph: &mut Graph) {
    let mut synthetic = Vec::new();
    let mut to_reclassify = Vec::new();

    {
        let index = graph.index();
        for edge in graph.message_flows() {
            let (Some(source), Some(target)) = (
                index.get(edge.source_id.as_str()).copied(),
                index.get(edge.target_id.as_str()).copied(),
            ) else {
                continue;
            };

            let valid = (source.kind.is_task() && target.kind.is_event())
                || (source.kind.is_event() && target.kind.is_task());
            if !valid {
                continue;
            }

            if matches!(source.kind, NodeKind::Event(EventKind::Start)) {
                to_reclassify.push(source.id.clone());
            }
            if matches!(target.kind, NodeKind::Event(EventKind::Start)) {
                to_reclassify.push(target.id.clone());
            }

            synthetic.push(crate::model::Edge {
                id: format!("{}_from_msgflow", edge.id),
                kind: FlowKind::Sequence,
                name: edge.name.clone(),
                source_id: edge.source_id.clone(),
                target_id: edge.target_id.clone(),
            });
        }
    }

    for id in to_reclassify {
        if let Some(node) = graph.get_mut(&id) {
            log::debug!("promoting start event {id} to intermediate catch event");
            node.kind = NodeKind::Event(EventKind::IntermediateCatch);
        }
    }
    graph.edges.extend(synthetic);
}

/// §4.2 step (d): route sequence-flow endpoints through the alias map.
fn rewrite_aliases(graph: &mut Graph, alias: &Alias) {
    for edge in graph
        .edges
        .iter_mut()
        .filter(|e| e.kind == FlowKind::Sequence)
    {
        if let Some(canonical) = alias.get(&edge.source_id) {
            edge.source_id = canonical.clone();
        }
        if let Some(canonical) = alias.get(&edge.target_id) {
            edge.target_id = canonical.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::ingest_str;

    #[test]
    fn collapses_structural_duplicates() {
        let xml = r#"<?xml version="1.0"?>
<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL" id="defs">
  <bpmn:process id="p">
    <bpmn:startEvent id="s1" name="Start"/>
    <bpmn:task id="a" name="Pay"/>
    <bpmn:task id="b" name="Pay"/>
    <bpmn:endEvent id="e1" name="End"/>
    <bpmn:sequenceFlow id="f1" sourceRef="s1" targetRef="a"/>
    <bpmn:sequenceFlow id="f2" sourceRef="s1" targetRef="b"/>
    <bpmn:sequenceFlow id="f3" sourceRef="a" targetRef="e1"/>
    <bpmn:sequenceFlow id="f4" sourceRef="b" targetRef="e1"/>
  </bpmn:process>
</bpmn:definitions>"#;
        let mut graph = ingest_str(xml).unwrap();
        let alias = normalize(&mut graph);
        // "a" and "b" are same type/name/outgoing-set ({e1}) so one collapses.
        assert_eq!(alias.len(), 1);
        assert_eq!(graph.nodes.iter().filter(|n| n.kind.is_task()).count(), 1);
    }

    #[test]
    fn promotes_start_event_and_splices_flow() {
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
        let mut graph = ingest_str(xml).unwrap();
        normalize(&mut graph);
        assert!(matches!(
            graph.get("sb").unwrap().kind,
            NodeKind::Event(EventKind::IntermediateCatch)
        ));
        assert!(
            graph
                .sequence_flows()
                .any(|e| e.id == "mf1_from_msgflow" && e.source_id == "ta" && e.target_id == "sb")
        );
    }

    #[test]
    fn rejects_invalid_message_flows() {
        let xml = r#"<?xml version="1.0"?>
<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL" id="defs">
  <bpmn:process id="pa">
    <bpmn:task id="ta"/>
    <bpmn:task id="tb"/>
  </bpmn:process>
  <bpmn:messageFlow id="mf1" sourceRef="ta" targetRef="tb"/>
</bpmn:definitions>"#;
        let mut graph = ingest_str(xml).unwrap();
        normalize(&mut graph);
        assert!(graph.sequence_flows().count() == 0);
    }
}
