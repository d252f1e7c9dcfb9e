use super::collections::{DijkstraBuffers, VertexDistanceQueue};
use crate::graphs::{Distance, Graph, Vertex};

/// Single-source Dijkstra over non-negative weights, filling distances
/// and predecessors for every reachable vertex.
///
/// Ties between equally short paths are broken toward the lowest
/// predecessor id. Since relaxation only ever runs from vertices at
/// their final distance, each predecessor ends up as the lowest-id
/// optimal one, independent of queue pop order. That makes distances
/// and reconstructed paths reproducible across runs and queue
/// implementations.
pub fn dijkstra_single_source(
    graph: &dyn Graph,
    buffers: &mut DijkstraBuffers,
    queue: &mut dyn VertexDistanceQueue,
    source: Vertex,
) {
    buffers.set_distance(source, 0);
    queue.insert(source, 0);

    while let Some(tail) = queue.pop() {
        if buffers.expand(tail) {
            continue;
        }

        let distance_tail = buffers.distance(tail);

        for edge in graph.out_edges(tail) {
            let current_distance_head = buffers.distance(edge.head);
            let alternative_distance_head = distance_tail.saturating_add(edge.weight);

            if alternative_distance_head < current_distance_head {
                buffers.set_distance(edge.head, alternative_distance_head);
                buffers.set_predecessor(edge.head, tail);
                queue.insert(edge.head, alternative_distance_head);
            } else if alternative_distance_head == current_distance_head
                && current_distance_head != Distance::MAX
                && tail < buffers.predecessor(edge.head).unwrap_or(Vertex::MAX)
            {
                // Same length, lower-id predecessor wins.
                buffers.set_predecessor(edge.head, tail);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        graphs::{vec_vec_graph::VecVecGraph, WeightedEdge},
        search::collections::{VertexDistanceQueueBinaryHeap, VertexDistanceQueueRadix},
    };

    fn diamond() -> VecVecGraph {
        // Two equal-length routes from 0 to 3: via 1 and via 2.
        let edges = vec![
            WeightedEdge::new(0, 1, 1).unwrap(),
            WeightedEdge::new(0, 2, 1).unwrap(),
            WeightedEdge::new(1, 3, 1).unwrap(),
            WeightedEdge::new(2, 3, 1).unwrap(),
        ];
        VecVecGraph::from_edges(4, &edges, Vec::new())
    }

    #[test]
    fn equal_paths_pick_lowest_predecessor() {
        let graph = diamond();
        let mut buffers = DijkstraBuffers::new(4);
        let mut queue = VertexDistanceQueueBinaryHeap::new();

        dijkstra_single_source(&graph, &mut buffers, &mut queue, 0);

        assert_eq!(buffers.distance(3), 2);
        assert_eq!(buffers.predecessor(3), Some(1));
    }

    #[test]
    fn queue_implementations_agree() {
        let graph = diamond();

        let mut heap_buffers = DijkstraBuffers::new(4);
        let mut heap_queue = VertexDistanceQueueBinaryHeap::new();
        dijkstra_single_source(&graph, &mut heap_buffers, &mut heap_queue, 0);

        let mut radix_buffers = DijkstraBuffers::new(4);
        let mut radix_queue = VertexDistanceQueueRadix::new();
        dijkstra_single_source(&graph, &mut radix_buffers, &mut radix_queue, 0);

        for vertex in 0..4 {
            assert_eq!(heap_buffers.distance(vertex), radix_buffers.distance(vertex));
            assert_eq!(
                heap_buffers.predecessor(vertex),
                radix_buffers.predecessor(vertex)
            );
        }
    }
}
