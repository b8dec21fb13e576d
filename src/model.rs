//! In-memory representation of a BPMN diagram (§3).
//!
//! Mirrors the teacher's tagged-variant-over-node-kinds approach
//! (`cosmincatalin-snurr/src/diagram.rs`'s `Bpmn` enum) but flattened: a
//! single `Node` struct carries the id/name shared by every kind, with a
//! `NodeKind` enum distinguishing events/tasks/gateways/containers and
//! their sub-variants.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Start,
    End,
    IntermediateCatch,
    MessageCatch,
    TimerCatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    User,
    Service,
    Manual,
    Script,
    Generic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayKind {
    Exclusive,
    Parallel,
    Inclusive,
    EventBased,
}

/// The closed set of BPMN flow-node kinds this translator recognizes (§3).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Event(EventKind),
    Task(TaskKind),
    Gateway(GatewayKind),
    Lane { flow_node_refs: Vec<String> },
    Pool { process_ref: Option<String> },
}

impl NodeKind {
    pub fn is_gateway(&self) -> bool {
        matches!(self, NodeKind::Gateway(_))
    }

    pub fn is_event(&self) -> bool {
        matches!(self, NodeKind::Event(_))
    }

    pub fn is_task(&self) -> bool {
        matches!(self, NodeKind::Task(_))
    }

    pub fn gateway_kind(&self) -> Option<GatewayKind> {
        match self {
            NodeKind::Gateway(kind) => Some(*kind),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub name: Option<String>,
}

impl Node {
    pub fn new(id: impl Into<String>, kind: NodeKind, name: Option<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            name,
        }
    }

    /// Merge another occurrence's list-valued extras into this node
    /// (set semantics, per §4.2 duplicate collapse).
    pub(crate) fn merge_extras(&mut self, other: &Node) {
        if let (
            NodeKind::Lane {
                flow_node_refs: ours,
            },
            NodeKind::Lane {
                flow_node_refs: theirs,
            },
        ) = (&mut self.kind, &other.kind)
        {
            for r in theirs {
                if !ours.contains(r) {
                    ours.push(r.clone());
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    Sequence,
    Message,
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub id: String,
    pub kind: FlowKind,
    pub name: Option<String>,
    pub source_id: String,
    pub target_id: String,
}

/// Owns all nodes and edges of one BPMN process diagram (§3).
///
/// Built once by `ingest`, mutated once by `normalize`, then read-only for
/// `analyze` and `encode` — reflected here by `analyze`/`encode` only ever
/// taking `&Graph`.
#[derive(Debug, Default)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn start_events(&self) -> impl Iterator<Item = &Node> {
        self.nodes
            .iter()
            .filter(|n| matches!(n.kind, NodeKind::Event(EventKind::Start)))
    }

    pub fn end_events(&self) -> impl Iterator<Item = &Node> {
        self.nodes
            .iter()
            .filter(|n| matches!(n.kind, NodeKind::Event(EventKind::End)))
    }

    pub fn sequence_flows(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(|e| e.kind == FlowKind::Sequence)
    }

    pub fn message_flows(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(|e| e.kind == FlowKind::Message)
    }

    /// `id → node` index, rebuilt on demand since the graph is mutated
    /// exactly once (by the normalizer) before becoming read-only.
    pub fn index(&self) -> HashMap<&str, &Node> {
        self.nodes.iter().map(|n| (n.id.as_str(), n)).collect()
    }
}
