//! # Dependency Cycle Detection
//!
//! A call is refused when it would re-enter a chain that is waiting on it.
//! Two sources of edges are considered:
//!
//! - the active call path: originating chains of this and every enclosing
//!   call;
//! - calls in flight elsewhere: `from -> {to, dependencies}` for each
//!   call-table entry.

use shared_types::ChainId;
use std::collections::{BTreeMap, BTreeSet};

/// Outgoing edges of in-flight calls, keyed by originating chain.
pub type DependencyEdges = BTreeMap<ChainId, BTreeSet<ChainId>>;

/// Cycle the call `from -> targets` would close, if any.
///
/// `targets` is the destination chain followed by the declared
/// dependencies. The returned path starts and ends on the re-entered chain.
pub fn find_cycle(
    from: &ChainId,
    targets: &[ChainId],
    call_path: &[ChainId],
    edges: &DependencyEdges,
) -> Option<Vec<ChainId>> {
    // Chains the caller is (transitively) waiting in.
    let mut active: Vec<&ChainId> = call_path.iter().collect();
    active.push(from);

    for target in targets {
        if let Some(pos) = active.iter().position(|c| *c == target) {
            let mut path: Vec<ChainId> = active[pos..].iter().map(|c| (*c).clone()).collect();
            path.push(target.clone());
            return Some(path);
        }
    }

    for target in targets {
        let mut visited = BTreeSet::new();
        let mut stack = vec![target.clone()];
        if let Some(mut path) = reach(target, from, edges, &mut visited, &mut stack) {
            path.insert(0, from.clone());
            return Some(path);
        }
    }
    None
}

fn reach(
    node: &ChainId,
    goal: &ChainId,
    edges: &DependencyEdges,
    visited: &mut BTreeSet<ChainId>,
    stack: &mut Vec<ChainId>,
) -> Option<Vec<ChainId>> {
    if !visited.insert(node.clone()) {
        return None;
    }
    for next in edges.get(node).into_iter().flatten() {
        stack.push(next.clone());
        if next == goal {
            return Some(stack.clone());
        }
        if let Some(path) = reach(next, goal, edges, visited, stack) {
            return Some(path);
        }
        stack.pop();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn c(id: &str) -> ChainId {
        ChainId::new(id).unwrap()
    }

    #[test]
    fn test_no_cycle() {
        let edges = DependencyEdges::new();
        assert_eq!(find_cycle(&c("a_1-1"), &[c("b_2-1")], &[], &edges), None);
    }

    #[test]
    fn test_self_call_is_cycle() {
        let edges = DependencyEdges::new();
        assert_eq!(
            find_cycle(&c("a_1-1"), &[c("a_1-1")], &[], &edges),
            Some(vec![c("a_1-1"), c("a_1-1")])
        );
    }

    #[test]
    fn test_call_path_reentry() {
        let edges = DependencyEdges::new();
        let path = [c("a_1-1"), c("b_2-1")];
        assert_eq!(
            find_cycle(&c("c_3-1"), &[c("a_1-1")], &path, &edges),
            Some(vec![c("a_1-1"), c("b_2-1"), c("c_3-1"), c("a_1-1")])
        );
    }

    #[test]
    fn test_dependency_on_call_path() {
        let edges = DependencyEdges::new();
        let path = [c("a_1-1")];
        assert!(find_cycle(&c("b_2-1"), &[c("c_3-1"), c("a_1-1")], &path, &edges).is_some());
    }

    #[test]
    fn test_transitive_in_flight_edges() {
        let mut edges = DependencyEdges::new();
        edges.entry(c("b_2-1")).or_default().insert(c("c_3-1"));
        edges.entry(c("c_3-1")).or_default().insert(c("a_1-1"));
        assert_eq!(
            find_cycle(&c("a_1-1"), &[c("b_2-1")], &[], &edges),
            Some(vec![c("a_1-1"), c("b_2-1"), c("c_3-1"), c("a_1-1")])
        );
    }

    #[test]
    fn test_diamond_without_cycle() {
        let mut edges = DependencyEdges::new();
        edges.entry(c("b_2-1")).or_default().insert(c("d_4-1"));
        edges.entry(c("c_3-1")).or_default().insert(c("d_4-1"));
        assert_eq!(find_cycle(&c("a_1-1"), &[c("b_2-1"), c("c_3-1")], &[], &edges), None);
    }

    proptest! {
        #[test]
        fn prop_target_on_path_always_cycles(len in 1usize..6, pick in 0usize..6) {
            let path: Vec<ChainId> = (0..len)
                .map(|i| ChainId::from_parts("chain", 1000 + i as u64, 1).unwrap())
                .collect();
            let target = path[pick % len].clone();
            let from = ChainId::from_parts("origin", 1, 1).unwrap();
            let cycle = find_cycle(&from, &[target.clone()], &path, &DependencyEdges::new());
            prop_assert!(cycle.is_some());
            let cycle = cycle.unwrap();
            prop_assert_eq!(cycle.first(), Some(&target));
            prop_assert_eq!(cycle.last(), Some(&target));
        }
    }
}
