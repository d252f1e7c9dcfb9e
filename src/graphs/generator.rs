use ahash::{HashSet, HashSetExt};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use super::{vec_vec_graph::VecVecGraph, Point, Vertex, WeightedEdge};
use crate::error::ResolveError;

/// Parameters for random graph generation. `mean_degree` is the target
/// average number of incident edges per vertex; the spanning tree that
/// guarantees connectivity may push the real value slightly above 2.
#[derive(Clone, Copy, Debug)]
pub struct GenerationConfig {
    pub number_of_vertices: u32,
    pub mean_degree: u32,
    pub max_coordinate: u32,
    pub seed: u64,
}

/// Generates a connected graph with random vertex positions on a
/// `max_coordinate` square. Edge weights are the rounded Euclidean
/// distances between the endpoints, never zero. Deterministic for a
/// fixed config.
pub fn generate_graph(config: &GenerationConfig) -> Result<VecVecGraph, ResolveError> {
    if config.number_of_vertices == 0 {
        return Err(ResolveError::InvalidParameter(
            "number of vertices must be positive".to_string(),
        ));
    }
    if config.mean_degree == 0 {
        return Err(ResolveError::InvalidParameter(
            "mean degree must be positive".to_string(),
        ));
    }
    if config.max_coordinate == 0 {
        return Err(ResolveError::InvalidParameter(
            "max coordinate must be positive".to_string(),
        ));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let number_of_vertices = config.number_of_vertices;

    let positions = (0..number_of_vertices)
        .map(|_| Point {
            x: rng.gen_range(0..=config.max_coordinate),
            y: rng.gen_range(0..=config.max_coordinate),
        })
        .collect::<Vec<_>>();

    let mut edges = Vec::new();
    let mut present = HashSet::new();

    let add_edge = |edges: &mut Vec<WeightedEdge>,
                        present: &mut HashSet<(Vertex, Vertex)>,
                        tail: Vertex,
                        head: Vertex| {
        let key = (tail.min(head), tail.max(head));
        if tail == head || !present.insert(key) {
            return false;
        }

        let weight = euclidean_weight(&positions[tail as usize], &positions[head as usize]);
        edges.push(WeightedEdge { tail, head, weight });
        true
    };

    // Random spanning tree: attach every vertex (in shuffled order) to a
    // random, already attached vertex.
    let mut order = (0..number_of_vertices).collect::<Vec<_>>();
    order.shuffle(&mut rng);
    for index in 1..order.len() {
        let tail = order[index];
        let head = order[rng.gen_range(0..index)];
        add_edge(&mut edges, &mut present, tail, head);
    }

    let target_edges = (number_of_vertices as u64 * config.mean_degree as u64 / 2)
        .max(number_of_vertices as u64 - 1);
    let complete_edges = number_of_vertices as u64 * (number_of_vertices as u64 - 1) / 2;
    let target_edges = target_edges.min(complete_edges);

    let mut attempts = 0_u64;
    while (edges.len() as u64) < target_edges && attempts < complete_edges * 16 {
        let tail = rng.gen_range(0..number_of_vertices);
        let head = rng.gen_range(0..number_of_vertices);
        add_edge(&mut edges, &mut present, tail, head);
        attempts += 1;
    }

    Ok(VecVecGraph::from_edges(number_of_vertices, &edges, positions))
}

fn euclidean_weight(a: &Point, b: &Point) -> u32 {
    let dx = a.x as f64 - b.x as f64;
    let dy = a.y as f64 - b.y as f64;
    ((dx * dx + dy * dy).sqrt().round() as u32).max(1)
}
