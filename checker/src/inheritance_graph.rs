//! Inheritance graph for a class hierarchy
//!
//! Edges point from a derived class to each of its direct bases, in the order
//! the bases are listed; reverse edges point from a base to the classes
//! deriving from it. Every walk keeps a visited set, so the graph may contain
//! cycles (a class that inherits from itself) without any walk looping.

use std::collections::VecDeque;

use crate::hierarchy::ClassId;

#[derive(Debug, Clone, Default)]
pub struct InheritanceGraph {
    /// Direct bases (derived -> bases)
    edges: Vec<Vec<ClassId>>,

    /// Direct derived classes (base -> derived)
    reverse_edges: Vec<Vec<ClassId>>,
}

impl InheritanceGraph {
    /// Create a graph with `node_count` classes and no edges
    pub fn new(node_count: usize) -> Self {
        Self {
            edges: vec![Vec::new(); node_count],
            reverse_edges: vec![Vec::new(); node_count],
        }
    }

    /// Record that `derived` lists `base` as a base; repeated edges are ignored
    pub fn add_edge(&mut self, derived: ClassId, base: ClassId) {
        if self.edges[derived.0].contains(&base) {
            return;
        }
        self.edges[derived.0].push(base);
        self.reverse_edges[base.0].push(derived);
    }

    pub fn node_count(&self) -> usize {
        self.edges.len()
    }

    pub fn direct_bases(&self, id: ClassId) -> &[ClassId] {
        &self.edges[id.0]
    }

    pub fn direct_derived(&self, id: ClassId) -> &[ClassId] {
        &self.reverse_edges[id.0]
    }

    /// Every class reachable through base lists, depth-first with the left-most
    /// base first. Each class appears once and `id` itself is never included.
    pub fn ancestors(&self, id: ClassId) -> Vec<ClassId> {
        self.depth_first(id, &self.edges)
    }

    /// Every class that (transitively) derives from `id`, `id` excluded
    pub fn descendants(&self, id: ClassId) -> Vec<ClassId> {
        self.depth_first(id, &self.reverse_edges)
    }

    /// Every ancestor of `id` ordered by distance; bases listed first come
    /// first among ancestors at the same distance
    pub fn ancestors_by_distance(&self, id: ClassId) -> Vec<ClassId> {
        let mut visited = vec![false; self.edges.len()];
        visited[id.0] = true;

        let mut order = Vec::new();
        let mut queue: VecDeque<ClassId> = self.direct_bases(id).iter().copied().collect();
        while let Some(current) = queue.pop_front() {
            if visited[current.0] {
                continue;
            }
            visited[current.0] = true;
            order.push(current);
            queue.extend(self.direct_bases(current).iter().copied());
        }
        order
    }

    pub fn is_ancestor(&self, ancestor: ClassId, of: ClassId) -> bool {
        self.ancestors(of).contains(&ancestor)
    }

    fn depth_first(&self, id: ClassId, adjacency: &[Vec<ClassId>]) -> Vec<ClassId> {
        let mut visited = vec![false; adjacency.len()];
        visited[id.0] = true;

        let mut order = Vec::new();
        let mut stack: Vec<ClassId> = adjacency[id.0].iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            if visited[current.0] {
                continue;
            }
            visited[current.0] = true;
            order.push(current);
            stack.extend(adjacency[current.0].iter().rev().copied());
        }
        order
    }

    /// The shortest base chain leading from `id` back to `id`, if any.
    ///
    /// The returned path starts and ends with `id`, e.g. `[A, B, A]`.
    pub fn cycle_through(&self, id: ClassId) -> Option<Vec<ClassId>> {
        let mut parent: Vec<Option<ClassId>> = vec![None; self.edges.len()];
        let mut seen = vec![false; self.edges.len()];
        let mut queue = VecDeque::new();

        for &base in self.direct_bases(id) {
            if base == id {
                return Some(vec![id, id]);
            }
            if !seen[base.0] {
                seen[base.0] = true;
                queue.push_back(base);
            }
        }

        while let Some(current) = queue.pop_front() {
            for &next in self.direct_bases(current) {
                if next == id {
                    let mut chain = vec![current];
                    let mut node = current;
                    while let Some(p) = parent[node.0] {
                        chain.push(p);
                        node = p;
                    }
                    chain.reverse();

                    let mut path = Vec::with_capacity(chain.len() + 2);
                    path.push(id);
                    path.extend(chain);
                    path.push(id);
                    return Some(path);
                }
                if !seen[next.0] {
                    seen[next.0] = true;
                    parent[next.0] = Some(current);
                    queue.push_back(next);
                }
            }
        }

        None
    }

    /// Nearest ancestors of `id` for which `matches` holds.
    ///
    /// The walk does not continue above a matching class. A match that is
    /// itself an ancestor of another match is hidden by it and dropped.
    pub fn nearest(&self, id: ClassId, mut matches: impl FnMut(ClassId) -> bool) -> Vec<ClassId> {
        let mut visited = vec![false; self.edges.len()];
        visited[id.0] = true;

        let mut found = Vec::new();
        let mut stack: Vec<ClassId> = self.direct_bases(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            if visited[current.0] {
                continue;
            }
            visited[current.0] = true;
            if matches(current) {
                found.push(current);
                continue;
            }
            stack.extend(self.direct_bases(current).iter().rev().copied());
        }

        let hidden: Vec<bool> = found
            .iter()
            .map(|&a| found.iter().any(|&b| b != a && self.is_ancestor(a, b)))
            .collect();
        found
            .into_iter()
            .zip(hidden)
            .filter(|(_, hidden)| !hidden)
            .map(|(class, _)| class)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(usize, usize)], count: usize) -> InheritanceGraph {
        let mut graph = InheritanceGraph::new(count);
        for &(derived, base) in edges {
            graph.add_edge(ClassId(derived), ClassId(base));
        }
        graph
    }

    fn ids(raw: &[usize]) -> Vec<ClassId> {
        raw.iter().map(|&i| ClassId(i)).collect()
    }

    #[test]
    fn test_linear_chain() {
        // 3 -> 2 -> 1 -> 0
        let g = graph(&[(1, 0), (2, 1), (3, 2)], 4);

        assert_eq!(g.ancestors(ClassId(3)), ids(&[2, 1, 0]));
        assert_eq!(g.descendants(ClassId(0)), ids(&[1, 2, 3]));
        assert!(g.is_ancestor(ClassId(0), ClassId(3)));
        assert!(!g.is_ancestor(ClassId(3), ClassId(0)));
        assert_eq!(g.cycle_through(ClassId(3)), None);
    }

    #[test]
    fn test_diamond_visits_shared_base_once() {
        // 3 -> {1, 2} -> 0
        let g = graph(&[(1, 0), (2, 0), (3, 1), (3, 2)], 4);

        assert_eq!(g.ancestors(ClassId(3)), ids(&[1, 0, 2]));
        assert_eq!(g.direct_derived(ClassId(0)), ids(&[1, 2]).as_slice());
    }

    #[test]
    fn test_ancestors_by_distance() {
        // 4 -> {1, 3}; 1 -> 0; 3 -> 2 -> 0
        let g = graph(&[(1, 0), (2, 0), (3, 2), (4, 1), (4, 3)], 5);

        assert_eq!(g.ancestors(ClassId(4)), ids(&[1, 0, 3, 2]));
        assert_eq!(g.ancestors_by_distance(ClassId(4)), ids(&[1, 3, 0, 2]));
    }

    #[test]
    fn test_cycle_detection() {
        // 0 -> 1 -> 2 -> 0, and 3 -> 0 hangs off the cycle
        let g = graph(&[(0, 1), (1, 2), (2, 0), (3, 0)], 4);

        assert_eq!(g.cycle_through(ClassId(0)), Some(ids(&[0, 1, 2, 0])));
        assert_eq!(g.cycle_through(ClassId(2)), Some(ids(&[2, 0, 1, 2])));
        assert_eq!(g.cycle_through(ClassId(3)), None);
        // Walks terminate and never report the start class
        assert_eq!(g.ancestors(ClassId(0)), ids(&[1, 2]));
        assert_eq!(g.ancestors(ClassId(3)), ids(&[0, 1, 2]));
        assert_eq!(g.ancestors_by_distance(ClassId(0)), ids(&[1, 2]));
    }

    #[test]
    fn test_self_inheritance() {
        let g = graph(&[(0, 0)], 1);
        assert_eq!(g.cycle_through(ClassId(0)), Some(ids(&[0, 0])));
        assert!(g.ancestors(ClassId(0)).is_empty());
    }

    #[test]
    fn test_nearest_stops_at_matches() {
        // 3 -> {1, 2} -> 0; 0 and 1 match
        let g = graph(&[(1, 0), (2, 0), (3, 1), (3, 2)], 4);
        let matching = [true, true, false, false];

        // 0 is reached through 2 but hidden by 1
        assert_eq!(g.nearest(ClassId(3), |c| matching[c.0]), ids(&[1]));
        assert_eq!(g.nearest(ClassId(2), |c| matching[c.0]), ids(&[0]));
        assert!(g.nearest(ClassId(0), |c| matching[c.0]).is_empty());
    }

    #[test]
    fn test_repeated_edges_are_ignored() {
        let g = graph(&[(1, 0), (1, 0)], 2);
        assert_eq!(g.direct_bases(ClassId(1)), ids(&[0]).as_slice());
        assert_eq!(g.direct_derived(ClassId(0)), ids(&[1]).as_slice());
    }
}
