//! Emits the PDDL domain (§4.4): predicate declarations plus the action
//! catalogue (start, gateway activation, inclusive diverge/converge,
//! counter arithmetic, parallel fork/join, exclusive/event-based choice,
//! task preconditions/effects, goal lifting).
//!
//! Grounded on `original_source/save.py::generate_pddl_domain`, restructured
//! into one function per action family in the teacher's module-per-concern
//! style rather than one long procedure.

use crate::analyze::AnalyzedGraph;
use crate::model::{EventKind, GatewayKind, Graph, Node, NodeKind};
use crate::sanitize::{NameUniquifier, sanitize};
use std::collections::{BTreeSet, HashMap, HashSet};

/// One `(:action ...)` block.
#[derive(Debug, Clone)]
pub struct Action {
    pub name: String,
    pub precondition: String,
    pub effect: String,
}

/// A fully encoded PDDL domain, ready for `Display`/`problem` consumption.
pub struct EncodedDomain {
    pub name: String,
    pub predicates: Vec<String>,
    pub actions: Vec<Action>,
}

impl std::fmt::Display for EncodedDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "(define (domain {})", self.name)?;
        writeln!(f, "  (:requirements :strips :typing)")?;
        writeln!(f, "  (:types task event gateway)")?;
        writeln!(f)?;
        writeln!(f, "  (:predicates")?;
        for pred in &self.predicates {
            writeln!(f, "    ({pred})")?;
        }
        writeln!(f, "  )")?;
        writeln!(f)?;
        for action in &self.actions {
            writeln!(f, "  (:action {}", action.name)?;
            writeln!(f, "    :precondition {}", action.precondition)?;
            writeln!(f, "    :effect {}", action.effect)?;
            writeln!(f, "  )")?;
            writeln!(f)?;
        }
        write!(f, ")")
    }
}

fn atom(name: &str) -> String {
    format!("({name})")
}

fn not_(inner: &str) -> String {
    format!("(not {inner})")
}

fn and_(parts: &[String]) -> String {
    format!("(and {})", parts.join(" "))
}

fn oneof_(parts: &[String]) -> String {
    format!("(oneof {})", parts.join(" "))
}

/// Declaration-order, deduplicated predicate set.
#[derive(Default)]
struct Predicates {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl Predicates {
    fn declare(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.seen.insert(name.clone()) {
            self.order.push(name);
        }
    }
}

pub fn encode(graph: &Graph, analyzed: &AnalyzedGraph, domain_name: &str) -> EncodedDomain {
    let mut predicates = Predicates::default();
    declare_predicates(graph, analyzed, &mut predicates);

    let mut actions = Vec::new();
    let mut parallel_counters: HashMap<String, usize> = HashMap::new();
    let mut uniquifier = NameUniquifier::new();

    emit_start_actions(graph, &mut actions);
    emit_gateway_activation(graph, analyzed, &mut actions);

    for node in &graph.nodes {
        let Some(gw_kind) = node.kind.gateway_kind() else {
            continue;
        };
        let diverging = analyzed.is_diverging(&node.id);
        let converging = analyzed.is_converging(&node.id);
        let both = diverging && converging;

        match gw_kind {
            GatewayKind::Inclusive if !both && diverging => {
                emit_inclusive_diverge(analyzed, node, &mut actions);
            }
            GatewayKind::Inclusive
                if !both && converging && analyzed.inclusive_pairs.contains_key(&node.id) =>
            {
                emit_inclusive_converge(analyzed, node, &mut actions, &mut parallel_counters);
            }
            GatewayKind::Inclusive if !both && converging => {
                emit_generic_gateway(analyzed, node, &mut actions, &mut parallel_counters);
            }
            GatewayKind::Parallel
                if !both && analyzed.parallel_region_for_diverge(&node.id).is_some() =>
            {
                emit_parallel_fork(analyzed, node, &mut actions, &mut parallel_counters);
            }
            GatewayKind::Parallel
                if !both && analyzed.parallel_region_for_converge(&node.id).is_some() =>
            {
                emit_parallel_join(analyzed, node, &mut actions);
            }
            GatewayKind::Exclusive | GatewayKind::EventBased => {
                emit_exclusive_or_eventbased(
                    graph,
                    analyzed,
                    node,
                    &mut actions,
                    &mut parallel_counters,
                );
            }
            GatewayKind::Inclusive if !diverging && !converging => {}
            _ => {
                emit_generic_gateway(analyzed, node, &mut actions, &mut parallel_counters);
            }
        }
    }

    for node in &graph.nodes {
        if node.kind.is_task() {
            emit_task(
                graph,
                analyzed,
                node,
                &mut actions,
                &mut parallel_counters,
                &mut uniquifier,
            );
        }
    }

    for node in graph.end_events() {
        emit_goal(node, &mut actions);
    }

    EncodedDomain {
        name: domain_name.to_string(),
        predicates: predicates.order,
        actions,
    }
}

/// §4.4 "Predicate section".
fn declare_predicates(graph: &Graph, analyzed: &AnalyzedGraph, predicates: &mut Predicates) {
    for node in &graph.nodes {
        if node.kind.is_event() || node.kind.is_task() || node.kind.is_gateway() {
            predicates.declare(sanitize(&node.id));
        }
        if matches!(node.kind, NodeKind::Gateway(GatewayKind::Exclusive)) {
            for tgt in analyzed.outgoing(&node.id) {
                predicates.declare(sanitize(tgt));
            }
        }
    }

    for node in &graph.nodes {
        if let NodeKind::Gateway(GatewayKind::Inclusive) = node.kind {
            let outs = analyzed.outgoing(&node.id);
            if analyzed.incoming(&node.id).len() == 1 && outs.len() > 1 {
                let gw = sanitize(&node.id);
                for i in 0..=outs.len() {
                    predicates.declare(format!("inclusive_counter_{gw}_{i}"));
                }
                predicates.declare(format!("increase_{gw}"));
                predicates.declare(format!("decrease_{gw}"));
                predicates.declare(format!("at_least_one_branch_{gw}"));
                for tgt in outs {
                    predicates.declare(format!(
                        "branch_started_{}",
                        sanitize(&format!("{}_{}", node.id, tgt))
                    ));
                }
            }
        }
    }

    for region in &analyzed.parallel_regions {
        let gw = sanitize(&region.converge);
        let n = analyzed.incoming(&region.converge).len();
        for i in 0..n {
            predicates.declare(format!("{gw}_precondition_{i}"));
        }
    }

    predicates.declare("done");
    predicates.declare("started");
}

/// §4.4 rule 1.
fn emit_start_actions(graph: &Graph, actions: &mut Vec<Action>) {
    let starts: Vec<&Node> = graph.start_events().collect();
    match starts.len() {
        0 => {}
        1 => {
            let s = starts[0];
            let sid = sanitize(&s.id);
            let base = s.name.clone().unwrap_or_else(|| s.id.clone());
            let action_name = sanitize(&format!("start_{base}"));
            actions.push(Action {
                name: action_name,
                precondition: and_(&[not_(&atom("started")), not_(&atom(&sid))]),
                effect: and_(&[atom(&sid), atom("started")]),
            });
        }
        _ => {
            let mut pre = vec![not_(&atom("started"))];
            let mut eff_oneof = Vec::new();
            for s in &starts {
                let sid = sanitize(&s.id);
                pre.push(not_(&atom(&sid)));
                eff_oneof.push(atom(&sid));
            }
            actions.push(Action {
                name: "start_process".to_string(),
                precondition: and_(&pre),
                effect: and_(&[oneof_(&eff_oneof), atom("started")]),
            });
        }
    }
}

/// §4.4 rule 2.
fn emit_gateway_activation(graph: &Graph, analyzed: &AnalyzedGraph, actions: &mut Vec<Action>) {
    for node in &graph.nodes {
        if !node.kind.is_gateway() {
            continue;
        }
        let inc = analyzed.incoming(&node.id);
        if inc.len() == 1
            && let Some(src) = graph.get(&inc[0])
            && matches!(src.kind, NodeKind::Event(EventKind::Start))
        {
            let start_id = sanitize(&src.id);
            let gw = sanitize(&node.id);
            actions.push(Action {
                name: format!("activate_{gw}"),
                precondition: and_(&[atom(&start_id)]),
                effect: and_(&[atom(&gw), not_(&atom(&start_id))]),
            });
        }
    }
}

fn gateway_action_name(prefix: &str, node: &Node) -> String {
    let label = node.name.clone().unwrap_or_else(|| node.id.clone());
    sanitize(&format!("{prefix}_{label}"))
}

/// Threads one arming token from `from_id` to a downstream accepted
/// parallel-join region, in ascending index order (§5).
fn arming_token(
    from_id: &str,
    analyzed: &AnalyzedGraph,
    counters: &mut HashMap<String, usize>,
) -> Option<String> {
    for tgt in analyzed.outgoing(from_id) {
        if let Some(region) = analyzed.parallel_region_for_converge(tgt) {
            let n = analyzed.incoming(&region.converge).len();
            let counter = counters.entry(region.converge.clone()).or_insert(0);
            if *counter >= n {
                return None;
            }
            let token = atom(&format!(
                "{}_precondition_{}",
                sanitize(&region.converge),
                counter
            ));
            *counter += 1;
            return Some(token);
        }
    }
    None
}

/// §4.4 rules 3 & 4: inclusive diverging gateway plus its counter
/// increase/decrease actions.
fn emit_inclusive_diverge(analyzed: &AnalyzedGraph, node: &Node, actions: &mut Vec<Action>) {
    let gw = sanitize(&node.id);
    let outs = analyzed.outgoing(&node.id);
    let k = outs.len();

    let mut inc_effect = vec![not_(&atom(&format!("increase_{gw}")))];
    for i in (0..k).rev() {
        let cur = format!("inclusive_counter_{gw}_{i}");
        let next = format!("inclusive_counter_{gw}_{}", i + 1);
        inc_effect.push(format!("(when ({cur}) (and (not ({cur})) ({next})))"));
    }
    actions.push(Action {
        name: format!("inclusive_increase_{gw}"),
        precondition: and_(&[atom(&format!("increase_{gw}"))]),
        effect: and_(&inc_effect),
    });

    let mut dec_effect = vec![not_(&atom(&format!("decrease_{gw}")))];
    for i in 1..=k {
        let cur = format!("inclusive_counter_{gw}_{i}");
        let prev = format!("inclusive_counter_{gw}_{}", i - 1);
        dec_effect.push(format!("(when ({cur}) (and (not ({cur})) ({prev})))"));
    }
    actions.push(Action {
        name: format!("inclusive_decrease_{gw}"),
        precondition: and_(&[atom(&format!("decrease_{gw}"))]),
        effect: and_(&dec_effect),
    });

    let mut diverge_effect = Vec::new();
    for tgt in outs {
        let tgt_id = sanitize(tgt);
        diverge_effect.push(format!(
            "(oneof (and ({tgt_id}) (increase_{gw}) (at_least_one_branch_{gw}) (not ({gw}))) (and))"
        ));
    }
    actions.push(Action {
        name: format!("inclusive_diverge_{gw}"),
        precondition: and_(&[atom(&gw)]),
        effect: and_(&diverge_effect),
    });
}

/// §4.4 rule 5.
fn emit_inclusive_converge(
    analyzed: &AnalyzedGraph,
    node: &Node,
    actions: &mut Vec<Action>,
    parallel_counters: &mut HashMap<String, usize>,
) {
    let gw = sanitize(&node.id);
    let diverge_id = analyzed.inclusive_pairs.get(&node.id).unwrap();
    let dgw = sanitize(diverge_id);
    let outs = analyzed.outgoing(&node.id);
    let next = sanitize(&outs[0]);

    let mut effect = vec![
        atom(&next),
        not_(&atom(&gw)),
        not_(&atom(&format!("at_least_one_branch_{dgw}"))),
    ];
    if let Some(token) = arming_token(&node.id, analyzed, parallel_counters) {
        effect.push(token);
    }

    actions.push(Action {
        name: format!("inclusive_converge_{gw}"),
        precondition: and_(&[
            atom(&gw),
            atom(&format!("at_least_one_branch_{dgw}")),
            atom(&format!("inclusive_counter_{dgw}_0")),
        ]),
        effect: and_(&effect),
    });
}

/// §4.4 rule 6, fork half.
fn emit_parallel_fork(
    analyzed: &AnalyzedGraph,
    node: &Node,
    actions: &mut Vec<Action>,
    counters: &mut HashMap<String, usize>,
) {
    let gw = sanitize(&node.id);
    let outs = analyzed.outgoing(&node.id);
    let mut effect: Vec<String> = outs.iter().map(|t| atom(&sanitize(t))).collect();
    effect.push(not_(&atom(&gw)));
    if let Some(token) = arming_token(&node.id, analyzed, counters) {
        effect.push(token);
    }
    actions.push(Action {
        name: gateway_action_name("parallel", node),
        precondition: and_(&[atom(&gw)]),
        effect: and_(&effect),
    });
}

/// §4.4 rule 6, join half.
fn emit_parallel_join(analyzed: &AnalyzedGraph, node: &Node, actions: &mut Vec<Action>) {
    let gw = sanitize(&node.id);
    let n = analyzed.incoming(&node.id).len();
    let mut pre = vec![atom(&gw)];
    for i in 0..n {
        pre.push(atom(&format!("{gw}_precondition_{i}")));
    }
    let outs = analyzed.outgoing(&node.id);
    let exit = sanitize(&outs[0]);
    actions.push(Action {
        name: gateway_action_name("parallel", node),
        precondition: and_(&pre),
        effect: and_(&[atom(&exit), not_(&atom(&gw))]),
    });
}

/// §4.4 rule 7.
fn emit_exclusive_or_eventbased(
    graph: &Graph,
    analyzed: &AnalyzedGraph,
    node: &Node,
    actions: &mut Vec<Action>,
    counters: &mut HashMap<String, usize>,
) {
    let gw = sanitize(&node.id);
    let outs = analyzed.outgoing(&node.id);
    let is_event_based = matches!(node.kind, NodeKind::Gateway(GatewayKind::EventBased));
    let prefix = if is_event_based { "event" } else { "exclusive" };

    let mut branch_effects = Vec::new();
    for tgt in outs {
        let mut branch = vec![atom(&sanitize(tgt))];
        if is_event_based {
            for next in analyzed.outgoing(tgt) {
                if let Some(next_node) = graph.get(next)
                    && next_node.kind.is_gateway()
                {
                    let p = atom(&sanitize(next));
                    if !branch.contains(&p) {
                        branch.push(p);
                    }
                }
            }
        }
        branch_effects.push(if branch.len() == 1 {
            branch.into_iter().next().unwrap()
        } else {
            and_(&branch)
        });
    }

    let mut effect = Vec::new();
    match branch_effects.len() {
        0 => {}
        1 => effect.push(branch_effects.into_iter().next().unwrap()),
        _ => effect.push(oneof_(&branch_effects)),
    }
    effect.push(not_(&atom(&gw)));
    if let Some(token) = arming_token(&node.id, analyzed, counters) {
        effect.push(token);
    }

    actions.push(Action {
        name: gateway_action_name(prefix, node),
        precondition: and_(&[atom(&gw)]),
        effect: and_(&effect),
    });
}

/// Fallback encoding for a gateway that is both diverging and converging,
/// an unaccepted parallel region, or an unpaired converging inclusive
/// gateway (§3 invariant, §7 `UnpairedGateway`).
fn emit_generic_gateway(
    analyzed: &AnalyzedGraph,
    node: &Node,
    actions: &mut Vec<Action>,
    counters: &mut HashMap<String, usize>,
) {
    let gw = sanitize(&node.id);
    let outs = analyzed.outgoing(&node.id);
    if outs.is_empty() {
        return;
    }
    let mut effect: Vec<String> = outs.iter().map(|t| atom(&sanitize(t))).collect();
    effect.push(not_(&atom(&gw)));
    if let Some(token) = arming_token(&node.id, analyzed, counters) {
        effect.push(token);
    }
    actions.push(Action {
        name: gateway_action_name("gateway", node),
        precondition: and_(&[atom(&gw)]),
        effect: and_(&effect),
    });
}

/// A task's effect for one of its successors: the successor's own
/// predicate, plus any immediate downstream gateway when the successor is
/// an Event (§4.4 rule 8, "Effects mirror the outgoing fan").
fn effect_for_target(graph: &Graph, analyzed: &AnalyzedGraph, target_id: &str) -> String {
    let mut parts = vec![atom(&sanitize(target_id))];
    if let Some(node) = graph.get(target_id)
        && node.kind.is_event()
    {
        for next in analyzed.outgoing(target_id) {
            if let Some(next_node) = graph.get(next)
                && next_node.kind.is_gateway()
            {
                let p = atom(&sanitize(next));
                if !parts.contains(&p) {
                    parts.push(p);
                }
            }
        }
    }
    if parts.len() == 1 {
        parts.into_iter().next().unwrap()
    } else {
        and_(&parts)
    }
}

fn has_control_gateway(graph: &Graph, incoming_ids: &[String]) -> bool {
    incoming_ids.iter().any(|src| {
        graph
            .get(src)
            .map(|n| {
                matches!(
                    n.kind,
                    NodeKind::Gateway(GatewayKind::Exclusive)
                        | NodeKind::Gateway(GatewayKind::Parallel)
                )
            })
            .unwrap_or(false)
    })
}

fn inclusive_branch_marker(src_id: &str, task_id: &str) -> String {
    format!(
        "branch_started_{}",
        sanitize(&format!("{src_id}_{task_id}"))
    )
}

/// Builds the non-merged-source precondition set, plus the inclusive
/// branch-marker negation/effect pair (§4.4 rule 8, last two bullets).
fn task_preconditions(
    graph: &Graph,
    analyzed: &AnalyzedGraph,
    task_id: &str,
    incoming_ids: &[String],
) -> (BTreeSet<String>, BTreeSet<String>, BTreeSet<String>) {
    let task_pred = atom(&sanitize(task_id));
    let mut standard: BTreeSet<String> = BTreeSet::new();

    if has_control_gateway(graph, incoming_ids) {
        standard.insert(task_pred.clone());
    } else {
        for src in incoming_ids {
            let Some(src_node) = graph.get(src) else {
                continue;
            };
            if let NodeKind::Gateway(GatewayKind::Inclusive) = src_node.kind
                && analyzed.outgoing(src).len() > 1
            {
                standard.insert(atom(&inclusive_branch_marker(src, task_id)));
                standard.insert(task_pred.clone());
            } else if src_node.kind.is_event() || src_node.kind.is_gateway() {
                standard.insert(atom(&sanitize(src)));
            } else {
                standard.insert(task_pred.clone());
            }
        }
        if standard.is_empty() {
            let starts: Vec<&Node> = graph.start_events().collect();
            if starts.len() == 1 {
                standard.insert(atom(&sanitize(&starts[0].id)));
            }
        }
    }

    let mut branch_not: BTreeSet<String> = BTreeSet::new();
    let mut branch_effects: BTreeSet<String> = BTreeSet::new();
    for src in incoming_ids {
        let Some(src_node) = graph.get(src) else {
            continue;
        };
        if let NodeKind::Gateway(GatewayKind::Inclusive) = src_node.kind
            && analyzed.outgoing(src).len() > 1
        {
            let marker = inclusive_branch_marker(src, task_id);
            branch_not.insert(not_(&atom(&marker)));
            branch_effects.insert(atom(&marker));
        }
    }

    // The diverging inclusive gateway's own effect already sets the task's
    // predicate directly; drop any positive branch-marker precondition so
    // only the `(not marker)` / extra-counter form is required (§9).
    let marker_names: Vec<String> = branch_effects
        .iter()
        .map(|e| e.trim_matches(|c| c == '(' || c == ')').to_string())
        .collect();
    standard.retain(|p| !marker_names.iter().any(|m| p.contains(m.as_str())));

    (standard, branch_not, branch_effects)
}

fn decrease_targets(graph: &Graph, analyzed: &AnalyzedGraph, task_id: &str) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    for tgt in analyzed.outgoing(task_id) {
        if let Some(tgt_node) = graph.get(tgt)
            && matches!(tgt_node.kind, NodeKind::Gateway(GatewayKind::Inclusive))
            && analyzed.incoming(tgt).len() > 1
            && let Some(diverge_id) = analyzed.inclusive_pairs.get(tgt)
        {
            out.insert(format!("decrease_{}", sanitize(diverge_id)));
        }
    }
    out
}

/// §4.4 rule 8: task preconditions/effects, including the merged-sources,
/// controlled-predecessor and inclusive-gateway-interaction cases.
fn emit_task(
    graph: &Graph,
    analyzed: &AnalyzedGraph,
    node: &Node,
    actions: &mut Vec<Action>,
    counters: &mut HashMap<String, usize>,
    uniquifier: &mut NameUniquifier,
) {
    let incoming_ids: Vec<String> = analyzed.incoming(&node.id).to_vec();
    let merged_sources: BTreeSet<String> = incoming_ids.iter().cloned().collect();
    let outgoing_targets: Vec<String> = analyzed.outgoing(&node.id).to_vec();
    let has_msgflow = graph.message_flows().any(|mf| mf.source_id == node.id);

    let effects: Vec<String> = if outgoing_targets.len() == 1 {
        vec![effect_for_target(graph, analyzed, &outgoing_targets[0])]
    } else {
        Vec::new()
    };
    let oneof_effects: Vec<String> = if outgoing_targets.len() > 1 {
        outgoing_targets
            .iter()
            .map(|t| effect_for_target(graph, analyzed, t))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    } else {
        Vec::new()
    };

    let mut append_outgoing_effects = |eff: &mut Vec<String>| {
        if !effects.is_empty() {
            eff.extend(effects.iter().cloned());
        }
        if !outgoing_targets.is_empty()
            && let Some(token) = arming_token(&node.id, analyzed, counters)
        {
            eff.push(token);
        }
        if !oneof_effects.is_empty() {
            if has_msgflow {
                eff.extend(oneof_effects.iter().cloned());
            } else if oneof_effects.len() == 1 {
                eff.push(oneof_effects[0].clone());
            } else {
                eff.push(oneof_(&oneof_effects));
            }
        }
    };

    let decrease = decrease_targets(graph, analyzed, &node.id);

    if merged_sources.len() > 1 {
        for src in &incoming_ids {
            let Some(src_node) = graph.get(src) else {
                continue;
            };
            let label = node.name.as_deref().unwrap_or(&node.id);
            let base = format!("{}_from_{}", sanitize(label), sanitize(src));
            let action_name = uniquifier.unique(base);

            let task_pred = atom(&sanitize(&node.id));
            let mut standard: BTreeSet<String> = BTreeSet::new();
            if src_node.kind.is_event() || src_node.kind.is_gateway() {
                standard.insert(atom(&sanitize(src)));
            } else {
                standard.insert(task_pred);
            }

            let mut branch_not = BTreeSet::new();
            let mut branch_effects = BTreeSet::new();
            if let NodeKind::Gateway(GatewayKind::Inclusive) = src_node.kind
                && analyzed.outgoing(src).len() > 1
            {
                let marker = inclusive_branch_marker(src, &node.id);
                branch_not.insert(not_(&atom(&marker)));
                branch_effects.insert(atom(&marker));
            }

            let mut pre: Vec<String> = standard.iter().cloned().collect();
            pre.extend(branch_not.iter().cloned());

            let mut eff: Vec<String> = Vec::new();
            append_outgoing_effects(&mut eff);
            for p in &standard {
                eff.push(not_(p));
            }
            eff.extend(branch_effects.iter().cloned());
            eff.extend(decrease.iter().map(|d| atom(d)));

            actions.push(Action {
                name: action_name,
                precondition: and_(&pre),
                effect: and_(&eff),
            });
        }
        return;
    }

    let (standard, branch_not, branch_effects) =
        task_preconditions(graph, analyzed, &node.id, &incoming_ids);

    let inclusive_diverge_src = incoming_ids.iter().find(|src| {
        graph
            .get(src.as_str())
            .map(|n| {
                matches!(n.kind, NodeKind::Gateway(GatewayKind::Inclusive))
                    && analyzed.outgoing(src).len() > 1
            })
            .unwrap_or(false)
    });

    let mut pre: Vec<String> = standard.iter().cloned().collect();
    pre.extend(branch_not.iter().cloned());
    if let Some(diverge_id) = inclusive_diverge_src {
        pre.push(not_(&atom(&format!(
            "inclusive_counter_{}_0",
            sanitize(diverge_id)
        ))));
    }

    let base = node.name.clone().unwrap_or_else(|| node.id.clone());
    let action_name = uniquifier.unique(sanitize(&base));

    let mut eff: Vec<String> = Vec::new();
    append_outgoing_effects(&mut eff);
    for p in &standard {
        eff.push(not_(p));
    }
    eff.extend(branch_effects.iter().cloned());
    eff.extend(decrease.iter().map(|d| atom(d)));

    actions.push(Action {
        name: action_name,
        precondition: and_(&pre),
        effect: and_(&eff),
    });
}

/// §4.4 rule 9.
fn emit_goal(node: &Node, actions: &mut Vec<Action>) {
    let eid = sanitize(&node.id);
    let label = node.name.clone().unwrap_or_else(|| node.id.clone());
    let action_name = format!("goal_{}", sanitize(&label));
    actions.push(Action {
        name: action_name,
        precondition: and_(&[atom(&eid)]),
        effect: atom("done"),
    });
}
