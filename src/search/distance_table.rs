use rayon::prelude::*;

use super::{
    collections::{DijkstraBuffers, Path, VertexDistanceQueue, VertexDistanceQueueRadix},
    dijkstra::dijkstra_single_source,
};
use crate::{
    error::ResolveError,
    graphs::{Distance, Graph, Vertex},
};

/// All-pairs shortest-path table: one distance row and one predecessor
/// row per source vertex. Built once per resolution run, read-only
/// afterwards. The table is the only thing the center search touches,
/// so a single eccentricity evaluation never re-runs Dijkstra.
pub struct DistanceTable {
    distances: Vec<Vec<Distance>>,
    predecessors: Vec<Vec<Vertex>>,
}

impl DistanceTable {
    /// Runs Dijkstra from every source in parallel. Expects a connected
    /// graph; an unreachable pair or an asymmetric entry is reported as
    /// an internal error since callers validate connectivity up front.
    pub fn new(graph: &dyn Graph) -> Result<DistanceTable, ResolveError> {
        let number_of_vertices = graph.number_of_vertices();

        // One queue per rayon worker, cleared between sources. The
        // buffers are per-source since their rows move into the table.
        let rows = (0..number_of_vertices)
            .into_par_iter()
            .map_init(VertexDistanceQueueRadix::new, |queue, source| {
                queue.clear();
                let mut buffers = DijkstraBuffers::new(number_of_vertices);
                dijkstra_single_source(graph, &mut buffers, queue, source);
                buffers.into_rows()
            })
            .collect::<Vec<_>>();

        let mut distances = Vec::with_capacity(rows.len());
        let mut predecessors = Vec::with_capacity(rows.len());
        for (distance_row, predecessor_row) in rows {
            distances.push(distance_row);
            predecessors.push(predecessor_row);
        }

        let table = DistanceTable {
            distances,
            predecessors,
        };
        table.verify()?;

        Ok(table)
    }

    fn verify(&self) -> Result<(), ResolveError> {
        let number_of_vertices = self.number_of_vertices();

        for source in 0..number_of_vertices {
            if self.distance(source, source) != 0 {
                return Err(ResolveError::Internal(format!(
                    "nonzero diagonal distance for vertex {}",
                    source
                )));
            }

            for target in 0..source {
                let forward = self.distance(source, target);
                let backward = self.distance(target, source);
                if forward == Distance::MAX {
                    return Err(ResolveError::Internal(format!(
                        "no path between {} and {} in a connected graph",
                        source, target
                    )));
                }
                if forward != backward {
                    return Err(ResolveError::Internal(format!(
                        "asymmetric distances between {} and {}",
                        source, target
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn number_of_vertices(&self) -> u32 {
        self.distances.len() as u32
    }

    pub fn distance(&self, source: Vertex, target: Vertex) -> Distance {
        self.distances[source as usize][target as usize]
    }

    /// Maximum over all vertices of the minimum distance to any center,
    /// plus the vertex realizing it. Ties on the maximum break toward
    /// the lowest vertex id. O(|V| * |centers|).
    pub fn eccentricity(&self, centers: &[Vertex]) -> (Distance, Vertex) {
        let mut worst_distance = 0;
        let mut worst_vertex = 0;

        for vertex in 0..self.number_of_vertices() {
            let nearest = self.distance_to_nearest(vertex, centers);
            if nearest > worst_distance {
                worst_distance = nearest;
                worst_vertex = vertex;
            }
        }

        (worst_distance, worst_vertex)
    }

    pub fn distance_to_nearest(&self, vertex: Vertex, centers: &[Vertex]) -> Distance {
        centers
            .iter()
            .map(|&center| self.distance(vertex, center))
            .min()
            .unwrap_or(Distance::MAX)
    }

    /// The center closest to `vertex`, lowest id on ties.
    pub fn nearest_center(&self, vertex: Vertex, centers: &[Vertex]) -> Option<Vertex> {
        let mut nearest: Option<(Distance, Vertex)> = None;

        for &center in centers {
            let distance = self.distance(vertex, center);
            let closer = match nearest {
                Some((best_distance, _)) => distance < best_distance,
                None => true,
            };
            if closer {
                nearest = Some((distance, center));
            }
        }

        nearest.map(|(_, center)| center)
    }

    /// Reconstructs the shortest path from `source` to `target` by
    /// backtracking predecessors of the source's Dijkstra tree.
    pub fn path(&self, source: Vertex, target: Vertex) -> Option<Path> {
        let distance = self.distance(source, target);
        if distance == Distance::MAX {
            return None;
        }

        let predecessor_row = &self.predecessors[source as usize];

        let mut vertices = vec![target];
        let mut current = target;
        while current != source {
            let predecessor = predecessor_row[current as usize];
            if predecessor == Vertex::MAX {
                return None;
            }
            current = predecessor;
            vertices.push(current);
        }
        vertices.reverse();

        Some(Path { vertices, distance })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphs::{vec_vec_graph::VecVecGraph, WeightedEdge};

    fn triangle_with_tail() -> VecVecGraph {
        let edges = vec![
            WeightedEdge::new(0, 1, 2).unwrap(),
            WeightedEdge::new(1, 2, 2).unwrap(),
            WeightedEdge::new(0, 2, 5).unwrap(),
            WeightedEdge::new(2, 3, 1).unwrap(),
        ];
        VecVecGraph::from_edges(4, &edges, Vec::new())
    }

    #[test]
    fn distances_are_symmetric_with_zero_diagonal() {
        let table = DistanceTable::new(&triangle_with_tail()).unwrap();

        assert_eq!(table.distance(0, 2), 4);
        assert_eq!(table.distance(2, 0), 4);
        assert_eq!(table.distance(0, 3), 5);
        for vertex in 0..4 {
            assert_eq!(table.distance(vertex, vertex), 0);
        }
    }

    #[test]
    fn eccentricity_breaks_ties_toward_lowest_vertex() {
        // Unit-weight path 0-1-2: centers {1} put both ends at distance
        // 1, so vertex 0 must be reported.
        let edges = vec![
            WeightedEdge::new(0, 1, 1).unwrap(),
            WeightedEdge::new(1, 2, 1).unwrap(),
        ];
        let graph = VecVecGraph::from_edges(3, &edges, Vec::new());
        let table = DistanceTable::new(&graph).unwrap();

        assert_eq!(table.eccentricity(&[1]), (1, 0));
    }

    #[test]
    fn path_follows_the_cheaper_detour() {
        let table = DistanceTable::new(&triangle_with_tail()).unwrap();

        let path = table.path(0, 3).unwrap();
        assert_eq!(path.vertices, vec![0, 1, 2, 3]);
        assert_eq!(path.distance, 5);
    }

    #[test]
    fn single_vertex_path_is_just_the_vertex() {
        let table = DistanceTable::new(&triangle_with_tail()).unwrap();

        let path = table.path(2, 2).unwrap();
        assert_eq!(path.vertices, vec![2]);
        assert_eq!(path.distance, 0);
    }
}
