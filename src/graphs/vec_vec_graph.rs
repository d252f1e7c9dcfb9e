use serde::{Deserialize, Serialize};

use super::{Distance, Edge, Graph, Point, TaillessEdge, Vertex, WeightedEdge};

/// Adjacency-list graph with per-tail edge vectors kept sorted by head,
/// so weight lookups are binary searches. Undirected: every edge is
/// stored in both directions.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct VecVecGraph {
    edges: Vec<Vec<TaillessEdge>>,
    positions: Vec<Point>,
}

impl VecVecGraph {
    pub fn new(number_of_vertices: u32) -> VecVecGraph {
        VecVecGraph {
            edges: vec![Vec::new(); number_of_vertices as usize],
            positions: vec![Point::default(); number_of_vertices as usize],
        }
    }

    /// Builds an undirected graph. Parallel edges collapse to the
    /// minimum-weight one.
    pub fn from_edges(
        number_of_vertices: u32,
        edges: &[WeightedEdge],
        positions: Vec<Point>,
    ) -> VecVecGraph {
        let mut graph = VecVecGraph::new(number_of_vertices);
        graph.positions = positions;
        graph.positions.resize(number_of_vertices as usize, Point::default());

        for edge in edges {
            graph.add_edge_bidirectional(edge);
        }

        graph
    }

    /// Inserts the edge in both directions, keeping the minimum weight
    /// if the edge already exists.
    pub fn add_edge_bidirectional(&mut self, edge: &WeightedEdge) {
        self.set_edge_min(edge);
        self.set_edge_min(&edge.reversed());
    }

    fn set_edge_min(&mut self, edge: &WeightedEdge) {
        let edges_sharing_tail = &mut self.edges[edge.tail as usize];

        match edges_sharing_tail.binary_search_by_key(&edge.head, |other| other.head) {
            Ok(index) => {
                let existing = &mut edges_sharing_tail[index];
                existing.weight = existing.weight.min(edge.weight);
            }
            Err(index) => {
                let new_edge = TaillessEdge {
                    head: edge.head,
                    weight: edge.weight,
                };
                edges_sharing_tail.insert(index, new_edge);
            }
        }
    }

    pub fn position(&self, vertex: Vertex) -> Point {
        self.positions[vertex as usize]
    }

    pub fn all_edges(&self) -> Vec<WeightedEdge> {
        (0..self.number_of_vertices())
            .flat_map(|vertex| self.out_edges(vertex).collect::<Vec<_>>())
            .collect()
    }
}

impl Graph for VecVecGraph {
    fn number_of_vertices(&self) -> u32 {
        self.edges.len() as u32
    }

    fn out_edges(
        &self,
        source: Vertex,
    ) -> Box<dyn ExactSizeIterator<Item = WeightedEdge> + Send + '_> {
        Box::new(
            self.edges[source as usize]
                .iter()
                .map(move |edge| edge.with_tail(source)),
        )
    }

    fn get_weight(&self, edge: &Edge) -> Option<Distance> {
        let edges_sharing_tail = self.edges.get(edge.tail as usize)?;

        let edge_index = edges_sharing_tail
            .binary_search_by_key(&edge.head, |other| other.head)
            .ok()?;

        Some(edges_sharing_tail[edge_index].weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parallel_edges_collapse_to_minimum() {
        let edges = vec![
            WeightedEdge::new(0, 1, 7).unwrap(),
            WeightedEdge::new(1, 0, 3).unwrap(),
            WeightedEdge::new(1, 2, 4).unwrap(),
        ];
        let graph = VecVecGraph::from_edges(3, &edges, Vec::new());

        assert_eq!(graph.get_weight(&Edge { tail: 0, head: 1 }), Some(3));
        assert_eq!(graph.get_weight(&Edge { tail: 1, head: 0 }), Some(3));
        assert_eq!(graph.get_weight(&Edge { tail: 2, head: 1 }), Some(4));
        assert_eq!(graph.get_weight(&Edge { tail: 0, head: 2 }), None);
        assert_eq!(graph.number_of_undirected_edges(), 2);
    }

    #[test]
    fn self_loops_are_rejected_on_construction() {
        assert!(WeightedEdge::new(4, 4, 1).is_none());
    }
}
