use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::graph::{Graph, NodeId};

/// Lowest-cost path between two nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortestPath {
    /// Node identifiers from start to goal inclusive.
    pub nodes: Vec<NodeId>,
    /// Sum of the edge weights along `nodes`, in meters.
    pub distance: f64,
}

/// Run Dijkstra's algorithm from `start` until `goal` is settled.
///
/// Returns `None` when `goal` is unreachable or either endpoint is missing
/// from the graph. A route from a node to itself is the single-node path
/// with distance zero and needs no edges.
pub fn find_route_dijkstra(graph: &Graph, start: NodeId, goal: NodeId) -> Option<ShortestPath> {
    if !graph.contains(start) || !graph.contains(goal) {
        return None;
    }
    if start == goal {
        return Some(ShortestPath {
            nodes: vec![start],
            distance: 0.0,
        });
    }

    let mut search = DijkstraSearch::new(graph, start);
    while let Some((node, distance)) = search.next() {
        if node == goal {
            let nodes = search.path_to(goal)?;
            return Some(ShortestPath { nodes, distance });
        }
    }

    None
}

/// Incremental Dijkstra search over a campus graph.
///
/// Each call to [`Iterator::next`] settles the unvisited node with the lowest
/// tentative distance and yields it with its final distance. Neighbours of a
/// settled node are relaxed lazily on the following call, so stopping as soon
/// as the goal is yielded does no extra work. Iteration ends once every
/// reachable node has been settled.
#[derive(Debug)]
pub struct DijkstraSearch<'a> {
    graph: &'a Graph,
    start: NodeId,
    distances: HashMap<NodeId, f64>,
    parents: HashMap<NodeId, Option<NodeId>>,
    settled: HashSet<NodeId>,
    queue: BinaryHeap<QueueEntry>,
    pending: Option<NodeId>,
}

impl<'a> DijkstraSearch<'a> {
    /// Start a search rooted at `start`.
    pub fn new(graph: &'a Graph, start: NodeId) -> Self {
        let mut distances = HashMap::new();
        let mut parents = HashMap::new();
        let mut queue = BinaryHeap::new();

        if graph.contains(start) {
            distances.insert(start, 0.0);
            parents.insert(start, None);
            queue.push(QueueEntry::new(start, 0.0));
        }

        Self {
            graph,
            start,
            distances,
            parents,
            settled: HashSet::new(),
            queue,
            pending: None,
        }
    }

    /// Current best distance to `node`; final once the node has been settled.
    pub fn distance(&self, node: NodeId) -> Option<f64> {
        self.distances.get(&node).copied()
    }

    pub fn is_settled(&self, node: NodeId) -> bool {
        self.settled.contains(&node)
    }

    /// Reconstruct the path from the start to `goal` through the parent links.
    pub fn path_to(&self, goal: NodeId) -> Option<Vec<NodeId>> {
        if !self.parents.contains_key(&goal) {
            return None;
        }

        let mut path = Vec::new();
        let mut current = Some(goal);
        while let Some(node) = current {
            path.push(node);
            if node == self.start {
                break;
            }
            current = self.parents.get(&node).copied().flatten();
        }
        path.reverse();
        Some(path)
    }

    fn relax(&mut self, node: NodeId) {
        let Some(base) = self.distances.get(&node).copied() else {
            return;
        };

        for edge in self.graph.neighbours(node) {
            let next = edge.target;
            if self.settled.contains(&next) {
                continue;
            }

            let next_cost = base + edge.distance;
            if next_cost < *self.distances.get(&next).unwrap_or(&f64::INFINITY) {
                self.distances.insert(next, next_cost);
                self.parents.insert(next, Some(node));
                self.queue.push(QueueEntry::new(next, next_cost));
            }
        }
    }
}

impl Iterator for DijkstraSearch<'_> {
    type Item = (NodeId, f64);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(node) = self.pending.take() {
            self.relax(node);
        }

        while let Some(entry) = self.queue.pop() {
            if !self.settled.insert(entry.node) {
                // Stale entry for a node that was already settled.
                continue;
            }
            self.pending = Some(entry.node);
            return Some((entry.node, entry.cost.0));
        }

        None
    }
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct QueueEntry {
    node: NodeId,
    cost: FloatOrd,
}

impl QueueEntry {
    fn new(node: NodeId, cost: f64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
        }
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by cost.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::RoadConnection;
    use crate::geo::Coordinate;
    use crate::graph::{build_graph, Node, NodeKind};

    fn node(id: NodeId) -> Node {
        Node {
            id,
            kind: NodeKind::Waypoint,
            name: None,
            description: None,
            image_path: None,
            coordinate: Coordinate {
                latitude: 0.0,
                longitude: id as f64 * 0.001,
            },
            campus: "main".to_string(),
        }
    }

    fn road(id: i64, from: NodeId, to: NodeId, distance: f64) -> RoadConnection {
        RoadConnection {
            id,
            from,
            to,
            name: None,
            width: 5,
            color: "#0066cc".to_string(),
            distance: Some(distance),
            campus: "main".to_string(),
        }
    }

    /// 1 -(4)- 2 -(1)- 3, 1 -(2)- 4 -(2)- 3, 3 -(7)- 5, 6 isolated.
    fn diamond() -> Graph {
        build_graph(
            "main",
            (1..=6).map(node).collect(),
            vec![
                road(1, 1, 2, 4.0),
                road(2, 2, 3, 1.0),
                road(3, 1, 4, 2.0),
                road(4, 4, 3, 2.0),
                road(5, 3, 5, 7.0),
            ],
        )
    }

    #[test]
    fn prefers_lower_total_weight_over_fewer_hops() {
        let graph = build_graph(
            "main",
            (1..=3).map(node).collect(),
            vec![road(1, 1, 3, 10.0), road(2, 1, 2, 3.0), road(3, 2, 3, 3.0)],
        );
        let path = find_route_dijkstra(&graph, 1, 3).unwrap();
        assert_eq!(path.nodes, vec![1, 2, 3]);
        assert_eq!(path.distance, 6.0);
    }

    #[test]
    fn finds_shortest_distance_in_diamond() {
        let graph = diamond();
        let path = find_route_dijkstra(&graph, 1, 5).unwrap();
        assert_eq!(path.distance, 11.0);
        assert_eq!(path.nodes.first(), Some(&1));
        assert_eq!(path.nodes.last(), Some(&5));
        assert!(path.nodes.contains(&3));
    }

    #[test]
    fn route_is_reversible() {
        let graph = diamond();
        let forward = find_route_dijkstra(&graph, 1, 5).unwrap();
        let backward = find_route_dijkstra(&graph, 5, 1).unwrap();
        assert_eq!(forward.distance, backward.distance);
    }

    #[test]
    fn same_node_needs_no_edges() {
        let graph = build_graph("main", vec![node(1)], Vec::new());
        let path = find_route_dijkstra(&graph, 1, 1).unwrap();
        assert_eq!(path.nodes, vec![1]);
        assert_eq!(path.distance, 0.0);
    }

    #[test]
    fn unreachable_goal_returns_none() {
        let graph = diamond();
        assert!(find_route_dijkstra(&graph, 1, 6).is_none());
        assert!(find_route_dijkstra(&graph, 6, 1).is_none());
    }

    #[test]
    fn missing_endpoints_return_none() {
        let graph = diamond();
        assert!(find_route_dijkstra(&graph, 1, 42).is_none());
        assert!(find_route_dijkstra(&graph, 42, 42).is_none());
    }

    #[test]
    fn settled_distances_never_change() {
        let graph = diamond();
        let mut search = DijkstraSearch::new(&graph, 1);
        let mut finalized: Vec<(NodeId, f64)> = Vec::new();

        while let Some((node, distance)) = search.next() {
            if let Some(&(_, previous)) = finalized.last() {
                assert!(distance >= previous, "settle order must be non-decreasing");
            }
            finalized.push((node, distance));
            for &(seen, value) in &finalized {
                assert!(search.is_settled(seen));
                assert_eq!(search.distance(seen), Some(value));
            }
        }

        let order: Vec<NodeId> = finalized.iter().map(|(node, _)| *node).collect();
        assert_eq!(order.len(), 5, "isolated node 6 is never reached");
        assert_eq!(order[0], 1);
        assert_eq!(search.distance(3), Some(4.0));
        assert_eq!(search.distance(6), None);
    }

    #[test]
    fn search_from_missing_start_yields_nothing() {
        let graph = diamond();
        let mut search = DijkstraSearch::new(&graph, 99);
        assert!(search.next().is_none());
        assert!(search.path_to(99).is_none());
    }

    #[test]
    fn zero_weight_edges_are_supported() {
        let graph = build_graph(
            "main",
            (1..=3).map(node).collect(),
            vec![road(1, 1, 2, 0.0), road(2, 2, 3, 0.0)],
        );
        let path = find_route_dijkstra(&graph, 1, 3).unwrap();
        assert_eq!(path.nodes, vec![1, 2, 3]);
        assert_eq!(path.distance, 0.0);
    }
}
