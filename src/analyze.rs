//! Structural analysis over the normalized, read-only graph (§4.3).
//!
//! Grounded on `original_source/save.py::map_inclusive_gateway_pairs` (the
//! LIFO-stack pairing walk) and the parallel-gateway tracing code in
//! `generate_pddl_domain`.

use crate::error::{Error, Result};
use crate::model::{GatewayKind, Graph, NodeKind};
use std::collections::{HashMap, HashSet, VecDeque};

/// An accepted parallel fork/join region (§4.3).
#[derive(Debug, Clone)]
pub struct ParallelRegion {
    pub diverge: String,
    pub converge: String,
    /// Tasks encountered along the branches between fork and join.
    pub intermediate: Vec<String>,
    /// The converging gateway's single outgoing successor.
    pub exit: String,
}

/// Adjacency plus the analyzer's derived structural maps, computed once
/// from a read-only `Graph` reference (§3 Lifecycle, §5: "read-only during
/// encoding").
#[derive(Debug)]
pub struct AnalyzedGraph<'g> {
    pub graph: &'g Graph,
    outgoing: HashMap<String, Vec<String>>,
    incoming: HashMap<String, Vec<String>>,
    /// Bidirectional: diverging id -> converging id and vice versa.
    pub inclusive_pairs: HashMap<String, String>,
    pub parallel_regions: Vec<ParallelRegion>,
}

impl<'g> AnalyzedGraph<'g> {
    pub fn outgoing(&self, id: &str) -> &[String] {
        self.outgoing.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn incoming(&self, id: &str) -> &[String] {
        self.incoming.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_diverging(&self, id: &str) -> bool {
        self.outgoing(id).len() > 1
    }

    pub fn is_converging(&self, id: &str) -> bool {
        self.incoming(id).len() > 1
    }

    pub fn parallel_region_for_diverge(&self, id: &str) -> Option<&ParallelRegion> {
        self.parallel_regions.iter().find(|r| r.diverge == id)
    }

    pub fn parallel_region_for_converge(&self, id: &str) -> Option<&ParallelRegion> {
        self.parallel_regions.iter().find(|r| r.converge == id)
    }
}

/// Builds adjacency (preserving source order) and runs the inclusive-gateway
/// pairing and parallel-region recognition passes.
pub fn analyze(graph: &Graph) -> Result<AnalyzedGraph<'_>> {
    let index = graph.index();
    let mut outgoing: HashMap<String, Vec<String>> = HashMap::new();
    let mut incoming: HashMap<String, Vec<String>> = HashMap::new();

    for edge in graph.sequence_flows() {
        if !index.contains_key(edge.source_id.as_str()) {
            return Err(Error::UnresolvedReference(
                "sequenceFlow",
                edge.id.clone(),
                edge.source_id.clone(),
            ));
        }
        if !index.contains_key(edge.target_id.as_str()) {
            return Err(Error::UnresolvedReference(
                "sequenceFlow",
                edge.id.clone(),
                edge.target_id.clone(),
            ));
        }
        outgoing
            .entry(edge.source_id.clone())
            .or_default()
            .push(edge.target_id.clone());
        incoming
            .entry(edge.target_id.clone())
            .or_default()
            .push(edge.source_id.clone());
    }

    let inclusive_pairs = pair_inclusive_gateways(graph, &outgoing, &incoming);
    let parallel_regions = find_parallel_regions(graph, &outgoing, &incoming);

    Ok(AnalyzedGraph {
        graph,
        outgoing,
        incoming,
        inclusive_pairs,
        parallel_regions,
    })
}

/// §4.3 inclusive-gateway pairing: one BFS per Start Event, with a LIFO
/// stack of currently open diverging inclusive gateways. Stack underflow
/// leaves the converging gateway unpaired rather than self-paired (§9 Open
/// Question).
fn pair_inclusive_gateways(
    graph: &Graph,
    outgoing: &HashMap<String, Vec<String>>,
    incoming: &HashMap<String, Vec<String>>,
) -> HashMap<String, String> {
    let mut pairs = HashMap::new();

    for start in graph.start_events() {
        let mut visited: HashSet<String> = HashSet::new();
        let mut stack: Vec<String> = Vec::new();
        let mut queue: VecDeque<String> = VecDeque::new();
        queue.push_back(start.id.clone());

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current.clone()) {
                continue;
            }

            if let Some(node) = graph.get(&current)
                && matches!(node.kind, NodeKind::Gateway(GatewayKind::Inclusive))
            {
                let n_in = incoming.get(&current).map(Vec::len).unwrap_or(0);
                let n_out = outgoing.get(&current).map(Vec::len).unwrap_or(0);

                if n_in == 1 && n_out > 1 {
                    stack.push(current.clone());
                } else if n_in > 1
                    && n_out == 1
                    && let Some(diverging_id) = stack.pop()
                {
                    pairs.insert(diverging_id.clone(), current.clone());
                    pairs.insert(current.clone(), diverging_id);
                } else if n_in > 1 && n_out == 1 {
                    log::warn!("{}", crate::error::UNPAIRED_INCLUSIVE_GATEWAY);
                }
            }

            for target in outgoing.get(&current).into_iter().flatten() {
                if !visited.contains(target) {
                    queue.push_back(target.clone());
                }
            }
        }
    }

    pairs
}

/// §4.3 parallel region recognition: trace each outgoing branch of a
/// diverging parallel gateway through a chain of single-successor nodes
/// until a converging gateway is hit, accepting the region only if every
/// branch converges at the same gateway with a single exit and no branch
/// fans out along the way.
fn find_parallel_regions(
    graph: &Graph,
    outgoing: &HashMap<String, Vec<String>>,
    incoming: &HashMap<String, Vec<String>>,
) -> Vec<ParallelRegion> {
    let mut regions = Vec::new();

    for node in &graph.nodes {
        if !matches!(node.kind, NodeKind::Gateway(GatewayKind::Parallel)) {
            continue;
        }
        let branches = outgoing.get(&node.id).cloned().unwrap_or_default();
        if branches.len() <= 1 {
            continue;
        }

        let mut converge_target: Option<String> = None;
        let mut intermediate = Vec::new();
        let mut accepted = true;

        for branch_start in &branches {
            let mut current = branch_start.clone();
            let mut chain = Vec::new();
            loop {
                let Some(current_node) = graph.get(&current) else {
                    accepted = false;
                    break;
                };
                if current_node.kind.is_gateway() {
                    if incoming.get(&current).map(Vec::len).unwrap_or(0) <= 1 {
                        accepted = false;
                    }
                    match &converge_target {
                        None => converge_target = Some(current.clone()),
                        Some(existing) if *existing != current => accepted = false,
                        _ => {}
                    }
                    break;
                }
                chain.push(current.clone());
                let nexts = outgoing.get(&current).cloned().unwrap_or_default();
                if nexts.len() != 1 {
                    accepted = false;
                    break;
                }
                current = nexts.into_iter().next().unwrap();
            }
            if !accepted {
                break;
            }
            intermediate.extend(chain);
        }

        if !accepted {
            log::warn!("{}", crate::error::UNPAIRED_PARALLEL_GATEWAY);
            continue;
        }
        let Some(converge) = converge_target else {
            continue;
        };
        let converge_outs = outgoing.get(&converge).cloned().unwrap_or_default();
        if converge_outs.len() != 1 {
            log::warn!("{}", crate::error::UNPAIRED_PARALLEL_GATEWAY);
            continue;
        }

        regions.push(ParallelRegion {
            diverge: node.id.clone(),
            converge,
            intermediate,
            exit: converge_outs.into_iter().next().unwrap(),
        });
    }

    regions
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
    fn pairs_inclusive_gateways() {
        let xml = r#"<?xml version="1.0"?>
<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL" id="defs">
  <bpmn:process id="p">
    <bpmn:startEvent id="s"/>
    <bpmn:inclusiveGateway id="d"/>
    <bpmn:task id="a"/>
    <bpmn:task id="b"/>
    <bpmn:inclusiveGateway id="c"/>
    <bpmn:endEvent id="e"/>
    <bpmn:sequenceFlow id="f1" sourceRef="s" targetRef="d"/>
    <bpmn:sequenceFlow id="f2" sourceRef="d" targetRef="a"/>
    <bpmn:sequenceFlow id="f3" sourceRef="d" targetRef="b"/>
    <bpmn:sequenceFlow id="f4" sourceRef="a" targetRef="c"/>
    <bpmn:sequenceFlow id="f5" sourceRef="b" targetRef="c"/>
    <bpmn:sequenceFlow id="f6" sourceRef="c" targetRef="e"/>
  </bpmn:process>
</bpmn:definitions>"#;
        let graph = build(xml);
        let analyzed = analyze(&graph).unwrap();
        assert_eq!(analyzed.inclusive_pairs.get("d"), Some(&"c".to_string()));
        assert_eq!(analyzed.inclusive_pairs.get("c"), Some(&"d".to_string()));
    }

    #[test]
    fn accepts_parallel_region() {
        let xml = r#"<?xml version="1.0"?>
<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL" id="defs">
  <bpmn:process id="p">
    <bpmn:startEvent id="s"/>
    <bpmn:parallelGateway id="f"/>
    <bpmn:task id="a" name="A"/>
    <bpmn:task id="b" name="B"/>
    <bpmn:parallelGateway id="j"/>
    <bpmn:endEvent id="e"/>
    <bpmn:sequenceFlow id="f1" sourceRef="s" targetRef="f"/>
    <bpmn:sequenceFlow id="f2" sourceRef="f" targetRef="a"/>
    <bpmn:sequenceFlow id="f3" sourceRef="f" targetRef="b"/>
    <bpmn:sequenceFlow id="f4" sourceRef="a" targetRef="j"/>
    <bpmn:sequenceFlow id="f5" sourceRef="b" targetRef="j"/>
    <bpmn:sequenceFlow id="f6" sourceRef="j" targetRef="e"/>
  </bpmn:process>
</bpmn:definitions>"#;
        let graph = build(xml);
        let analyzed = analyze(&graph).unwrap();
        assert_eq!(analyzed.parallel_regions.len(), 1);
        let region = &analyzed.parallel_regions[0];
        assert_eq!(region.diverge, "f");
        assert_eq!(region.converge, "j");
        assert_eq!(region.exit, "e");
    }

    #[test]
    fn rejects_unresolved_reference() {
        let xml = r#"<?xml version="1.0"?>
<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL" id="defs">
  <bpmn:process id="p">
    <bpmn:startEvent id="s"/>
    <bpmn:sequenceFlow id="f1" sourceRef="s" targetRef="ghost"/>
  </bpmn:process>
</bpmn:definitions>"#;
        let graph = build(xml);
        let err = analyze(&graph).unwrap_err();
        assert!(matches!(err, Error::UnresolvedReference(..)));
    }
}
