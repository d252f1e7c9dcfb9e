use std::time::Duration;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::{center_search::SearchOutcome, collections::Path, distance_table::DistanceTable};
use crate::{
    error::ResolveError,
    graphs::{Edge, Graph, Vertex, WeightedEdge},
};

/// The single long-lived output of a successful resolution run: the
/// winning center set plus the realized worst-case ("longest") shortest
/// path in vertex and edge form, and some run diagnostics. Immutable
/// once delivered.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResultSet {
    pub centers: Vec<Vertex>,
    pub cost: u32,
    pub worst_vertex: Vertex,
    pub nearest_center: Vertex,
    pub longest_path: Path,
    pub longest_path_edges: Vec<WeightedEdge>,
    pub vertex_count: u32,
    pub edge_count: u32,
    pub candidates_evaluated: u64,
    pub elapsed: Duration,
}

impl ResultSet {
    /// Turns the winning candidate into the reportable outcome: worst
    /// vertex, its nearest center, the path between them, and the edge
    /// sequence whose weights must sum to the cost exactly.
    pub fn aggregate(
        outcome: &SearchOutcome,
        table: &DistanceTable,
        graph: &dyn Graph,
        elapsed: Duration,
    ) -> Result<ResultSet, ResolveError> {
        let (cost, worst_vertex) = table.eccentricity(&outcome.centers);
        if cost != outcome.cost {
            return Err(ResolveError::Internal(format!(
                "search cost {} does not match eccentricity {}",
                outcome.cost, cost
            )));
        }

        let nearest_center = table
            .nearest_center(worst_vertex, &outcome.centers)
            .ok_or_else(|| ResolveError::Internal("empty center set".to_string()))?;

        let longest_path = table.path(worst_vertex, nearest_center).ok_or_else(|| {
            ResolveError::Internal(format!(
                "no path from {} to its center {}",
                worst_vertex, nearest_center
            ))
        })?;

        let longest_path_edges = edges_along(graph, &longest_path)?;

        let edge_weight_sum = longest_path_edges.iter().map(|edge| edge.weight).sum::<u32>();
        if edge_weight_sum != cost {
            return Err(ResolveError::Internal(format!(
                "path edge weights sum to {} but the cost is {}",
                edge_weight_sum, cost
            )));
        }

        Ok(ResultSet {
            centers: outcome.centers.clone(),
            cost,
            worst_vertex,
            nearest_center,
            longest_path,
            longest_path_edges,
            vertex_count: graph.number_of_vertices(),
            edge_count: graph.number_of_undirected_edges(),
            candidates_evaluated: outcome.candidates_evaluated,
            elapsed,
        })
    }

    /// Plain-text summary for external reporting, derived from the
    /// result alone.
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Vertices count: {}", self.vertex_count));
        lines.push(format!("Edges count: {}", self.edge_count));
        lines.push(format!("Centers count: {}", self.centers.len()));
        lines.push(format!(
            "Centers in vertices: {}",
            self.centers.iter().join(", ")
        ));
        lines.push(format!(
            "Longest path vertices: {}",
            self.longest_path.vertices.iter().join(" -> ")
        ));
        lines.push(format!(
            "Longest path edges: {}",
            self.longest_path_edges
                .iter()
                .map(|edge| format!("({}-{} w={})", edge.tail, edge.head, edge.weight))
                .join(", ")
        ));
        lines.push(format!("Longest path weight: {}", self.cost));
        lines.push(format!(
            "Candidates evaluated: {}",
            self.candidates_evaluated
        ));
        lines.push(format!("Calculation time: {:.3?}", self.elapsed));

        lines.join("\n")
    }
}

/// Maps consecutive path vertices onto graph edges, oriented along the
/// path.
fn edges_along(graph: &dyn Graph, path: &Path) -> Result<Vec<WeightedEdge>, ResolveError> {
    let mut edges = Vec::new();

    for window in path.vertices.windows(2) {
        let (tail, head) = (window[0], window[1]);
        let weight = graph.get_weight(&Edge { tail, head }).ok_or_else(|| {
            ResolveError::Internal(format!("no edge between {} and {}", tail, head))
        })?;
        edges.push(WeightedEdge { tail, head, weight });
    }

    Ok(edges)
}
