use std::collections::{HashMap, HashSet, VecDeque};

use super::builder::WorkflowGraph;

/// BFS reachability over every outgoing edge category.
pub fn reachable_from(graph: &WorkflowGraph, seeds: &[&str]) -> HashSet<String> {
    let mut reachable = HashSet::new();
    let mut queue = VecDeque::new();

    for seed in seeds {
        if graph.contains(seed) && reachable.insert((*seed).to_string()) {
            queue.push_back((*seed).to_string());
        }
    }

    while let Some(node) = queue.pop_front() {
        for next in graph.successors(&node) {
            if reachable.insert(next.to_string()) {
                queue.push_back(next.to_string());
            }
        }
    }

    reachable
}

/// Bounded-depth forward search: does any path starting from the given
/// output branch of `origin` lead back to `origin` within `max_depth` hops?
///
/// This is a heuristic bound, not a proof of absence; a path longer than
/// `max_depth` is reported as not connecting back.
pub fn connects_back(
    graph: &WorkflowGraph,
    origin: &str,
    category: &str,
    branch: usize,
    max_depth: usize,
) -> bool {
    let mut visited: HashSet<String> = HashSet::new();
    let mut stack: Vec<(String, usize)> = Vec::new();

    for target in graph.targets_of_branch(origin, category, branch) {
        if target == origin {
            return true;
        }
        if visited.insert(target.to_string()) {
            stack.push((target.to_string(), 1));
        }
    }

    while let Some((node, depth)) = stack.pop() {
        if depth >= max_depth {
            continue;
        }
        for next in graph.successors(&node) {
            if next == origin {
                return true;
            }
            if visited.insert(next.to_string()) {
                stack.push((next.to_string(), depth + 1));
            }
        }
    }

    false
}

/// Every node reachable from `seed` within `max_depth` hops, excluding the
/// seed itself unless a path loops back to it.
pub fn reachable_within(graph: &WorkflowGraph, seed: &str, max_depth: usize) -> HashSet<String> {
    let mut reached: HashSet<String> = HashSet::new();
    let mut stack: Vec<(String, usize)> = Vec::new();

    for target in graph.successors(seed) {
        if reached.insert(target.to_string()) {
            stack.push((target.to_string(), 1));
        }
    }

    while let Some((node, depth)) = stack.pop() {
        if depth >= max_depth {
            continue;
        }
        for next in graph.successors(&node) {
            if reached.insert(next.to_string()) {
                stack.push((next.to_string(), depth + 1));
            }
        }
    }

    reached
}

/// Every node from which `target` is reachable, including `target` itself.
pub fn upstream_of(graph: &WorkflowGraph, target: &str) -> HashSet<String> {
    let mut upstream = HashSet::new();
    let mut queue = VecDeque::new();

    if graph.contains(target) {
        upstream.insert(target.to_string());
        queue.push_back(target.to_string());
    }

    while let Some(node) = queue.pop_front() {
        for prev in graph.predecessors(&node) {
            if upstream.insert(prev.to_string()) {
                queue.push_back(prev.to_string());
            }
        }
    }

    upstream
}

/// Three-color DFS cycle detection returning each cycle as its node path.
pub fn find_cycles(graph: &WorkflowGraph) -> Vec<Vec<String>> {
    let mut cycles = Vec::new();
    let mut state: HashMap<String, u8> = HashMap::new();
    let mut stack: Vec<String> = Vec::new();

    for node in graph.node_names() {
        state.entry(node.to_string()).or_insert(0);
    }

    for node in graph.node_names() {
        if state.get(node).copied().unwrap_or(0) == 0 {
            dfs(node, graph, &mut state, &mut stack, &mut cycles);
        }
    }

    cycles
}

fn dfs(
    node: &str,
    graph: &WorkflowGraph,
    state: &mut HashMap<String, u8>,
    stack: &mut Vec<String>,
    cycles: &mut Vec<Vec<String>>,
) {
    state.insert(node.to_string(), 1);
    stack.push(node.to_string());

    for next in graph.successors(node) {
        match state.get(next).copied().unwrap_or(0) {
            0 => dfs(next, graph, state, stack, cycles),
            1 => {
                if let Some(pos) = stack.iter().position(|n| n == next) {
                    cycles.push(stack[pos..].to_vec());
                }
            }
            _ => {}
        }
    }

    stack.pop();
    state.insert(node.to_string(), 2);
}
