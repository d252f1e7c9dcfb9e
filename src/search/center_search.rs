use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

use rayon::prelude::*;

use super::{distance_table::DistanceTable, progress::ProgressEmitter};
use crate::{
    error::ResolveError,
    graphs::{Distance, Vertex},
};

/// Candidates credited between cancellation checks and shared-counter
/// flushes. Bounds cancellation latency to one batch per worker.
const PROGRESS_BATCH: u64 = 1024;

/// The winning center set of a search, its minimax cost and how many
/// candidates the enumeration covered.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub centers: Vec<Vertex>,
    pub cost: Distance,
    pub candidates_evaluated: u64,
}

/// Finds the K-subset of vertices minimizing the maximum
/// nearest-center distance.
///
/// Candidates are enumerated in lexicographic (strictly increasing id)
/// order, partitioned across a rayon pool by their smallest member.
/// Each partition runs a sequential branch-and-bound; a subtree is
/// skipped only when its lower bound is strictly worse than the shared
/// best cost, so the lexicographically first optimum is always visited
/// and parallel runs return bit-for-bit the same winner as a serial
/// scan. Pruning changes running time, never the result.
pub fn search_centers(
    table: &DistanceTable,
    k: u32,
    emitter: &ProgressEmitter,
    cancelled: &AtomicBool,
) -> Result<SearchOutcome, ResolveError> {
    let number_of_vertices = table.number_of_vertices();

    if k == 0 {
        return Err(ResolveError::InvalidParameter(
            "center count must be positive".to_string(),
        ));
    }
    if k > number_of_vertices {
        return Err(ResolveError::InvalidParameter(format!(
            "center count {} exceeds vertex count {}",
            k, number_of_vertices
        )));
    }

    if cancelled.load(Ordering::Relaxed) {
        return Err(ResolveError::Cancelled);
    }

    // Every vertex its own center, nothing to enumerate.
    if k == number_of_vertices {
        emitter.finish();
        return Ok(SearchOutcome {
            centers: (0..number_of_vertices).collect(),
            cost: 0,
            candidates_evaluated: 1,
        });
    }

    let cover = SuffixCover::new(table);
    let total_candidates = binomial(number_of_vertices as u64, k as u64) as f64;
    let shared_best = AtomicU32::new(Distance::MAX);
    let covered = AtomicU64::new(0);

    let partition_bests = (0..=(number_of_vertices - k))
        .into_par_iter()
        .map(|first| {
            let mut worker = PartitionWorker {
                table,
                cover: &cover,
                k,
                shared_best: &shared_best,
                covered: &covered,
                emitter,
                cancelled,
                total_candidates,
                pending: 0,
                best: None,
            };
            worker.run(first)?;

            Ok(worker.best)
        })
        .collect::<Result<Vec<_>, ResolveError>>()?;

    // Partitions arrive ordered by their smallest center; keeping only
    // strict improvements reproduces the serial first-wins tie-break.
    let mut best: Option<(Distance, Vec<Vertex>)> = None;
    for candidate in partition_bests.into_iter().flatten() {
        let improves = match &best {
            Some((best_cost, _)) => candidate.0 < *best_cost,
            None => true,
        };
        if improves {
            best = Some(candidate);
        }
    }

    let (cost, centers) = best.ok_or_else(|| {
        ResolveError::Internal("search finished without any candidate".to_string())
    })?;

    emitter.finish();

    Ok(SearchOutcome {
        centers,
        cost,
        candidates_evaluated: covered.load(Ordering::Relaxed),
    })
}

/// One enumeration partition: all candidates whose smallest center is
/// `first`. Owns a private best-so-far; only the prune bound is shared.
struct PartitionWorker<'a> {
    table: &'a DistanceTable,
    cover: &'a SuffixCover,
    k: u32,
    shared_best: &'a AtomicU32,
    covered: &'a AtomicU64,
    emitter: &'a ProgressEmitter<'a>,
    cancelled: &'a AtomicBool,
    total_candidates: f64,
    pending: u64,
    best: Option<(Distance, Vec<Vertex>)>,
}

impl PartitionWorker<'_> {
    fn run(&mut self, first: Vertex) -> Result<(), ResolveError> {
        let number_of_vertices = self.table.number_of_vertices();

        let nearest = (0..number_of_vertices)
            .map(|vertex| self.table.distance(vertex, first))
            .collect::<Vec<_>>();
        let mut prefix = vec![first];

        if self.k == 1 {
            let cost = nearest.iter().copied().max().unwrap_or(0);
            self.record(cost, &prefix);
            self.credit(1)?;
        } else {
            let remaining = (self.k - 1) as u64;
            let bound = self.cover.lower_bound(&nearest, first + 1);
            if bound > self.shared_best.load(Ordering::Relaxed) {
                self.credit(binomial((number_of_vertices - 1 - first) as u64, remaining))?;
            } else {
                self.descend(&mut prefix, &nearest, first + 1)?;
            }
        }

        self.flush()
    }

    fn descend(
        &mut self,
        prefix: &mut Vec<Vertex>,
        nearest: &[Distance],
        from: Vertex,
    ) -> Result<(), ResolveError> {
        let number_of_vertices = self.table.number_of_vertices();
        let remaining = self.k as usize - prefix.len();
        let last_start = number_of_vertices - remaining as u32;

        for vertex in from..=last_start {
            let mut next_nearest = nearest.to_vec();
            for (other, slot) in next_nearest.iter_mut().enumerate() {
                *slot = (*slot).min(self.table.distance(other as Vertex, vertex));
            }
            prefix.push(vertex);

            if remaining == 1 {
                let cost = next_nearest.iter().copied().max().unwrap_or(0);
                self.record(cost, prefix);
                self.credit(1)?;
            } else {
                let bound = self.cover.lower_bound(&next_nearest, vertex + 1);
                if bound > self.shared_best.load(Ordering::Relaxed) {
                    // Whole subtree provably cannot strictly beat the
                    // best known cost.
                    let skipped = binomial(
                        (number_of_vertices - 1 - vertex) as u64,
                        (remaining - 1) as u64,
                    );
                    self.credit(skipped)?;
                } else {
                    self.descend(prefix, &next_nearest, vertex + 1)?;
                }
            }

            prefix.pop();
        }

        Ok(())
    }

    fn record(&mut self, cost: Distance, candidate: &[Vertex]) {
        self.shared_best.fetch_min(cost, Ordering::Relaxed);

        let improves = match &self.best {
            Some((best_cost, _)) => cost < *best_cost,
            None => true,
        };
        if improves {
            self.best = Some((cost, candidate.to_vec()));
        }
    }

    fn credit(&mut self, candidates: u128) -> Result<(), ResolveError> {
        self.pending = self
            .pending
            .saturating_add(candidates.min(u64::MAX as u128) as u64);

        if self.pending >= PROGRESS_BATCH {
            self.flush()?;
        }

        Ok(())
    }

    fn flush(&mut self) -> Result<(), ResolveError> {
        if self.cancelled.load(Ordering::Relaxed) {
            return Err(ResolveError::Cancelled);
        }

        if self.pending > 0 {
            let covered = self
                .covered
                .fetch_add(self.pending, Ordering::Relaxed)
                .saturating_add(self.pending);
            self.pending = 0;
            self.emitter.emit(covered as f64 / self.total_candidates);
        }

        Ok(())
    }
}

/// Per-vertex minimum distance to any vertex with id >= `from`,
/// precomputed for every suffix. `lower_bound` combines it with the
/// distances already fixed by a prefix: no completion of the prefix can
/// cost less, because every still-selectable center lies in the suffix.
struct SuffixCover {
    rows: Vec<Vec<Distance>>,
}

impl SuffixCover {
    fn new(table: &DistanceTable) -> SuffixCover {
        let n = table.number_of_vertices() as usize;

        let mut rows = Vec::with_capacity(n + 1);
        let mut running = vec![Distance::MAX; n];
        rows.push(running.clone());

        for from in (0..n).rev() {
            for (vertex, slot) in running.iter_mut().enumerate() {
                *slot = (*slot).min(table.distance(vertex as Vertex, from as Vertex));
            }
            rows.push(running.clone());
        }
        rows.reverse();

        SuffixCover { rows }
    }

    fn lower_bound(&self, nearest: &[Distance], from: Vertex) -> Distance {
        nearest
            .iter()
            .zip(&self.rows[from as usize])
            .map(|(&fixed, &selectable)| fixed.min(selectable))
            .max()
            .unwrap_or(0)
    }
}

/// Exact for any total candidate count that fits in a u128; saturates
/// beyond, which only skews the progress denominator.
pub fn binomial(n: u64, k: u64) -> u128 {
    if k > n {
        return 0;
    }

    let k = k.min(n - k);
    let mut result: u128 = 1;
    for i in 0..k {
        result = result.saturating_mul((n - i) as u128) / (i + 1) as u128;
    }

    result
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;
    use crate::{
        graphs::{generator::{generate_graph, GenerationConfig}, vec_vec_graph::VecVecGraph, WeightedEdge},
        search::progress::ProgressCallback,
    };

    struct NullCallback;

    impl ProgressCallback for NullCallback {
        fn on_progress(&self, _fraction: f64) {}
        fn on_success(&self, _result: crate::search::result::ResultSet) {}
        fn on_error(&self, _error: &ResolveError) {}
    }

    fn run_search(table: &DistanceTable, k: u32) -> SearchOutcome {
        let callback = NullCallback;
        let emitter = ProgressEmitter::new(&callback);
        let cancelled = AtomicBool::new(false);
        search_centers(table, k, &emitter, &cancelled).unwrap()
    }

    /// Plain lexicographic scan over all K-subsets, no pruning, no
    /// parallelism. The search must agree with this exactly.
    fn exhaustive_best(table: &DistanceTable, k: u32) -> (Distance, Vec<Vertex>) {
        let mut best: Option<(Distance, Vec<Vertex>)> = None;

        for candidate in (0..table.number_of_vertices()).combinations(k as usize) {
            let (cost, _worst) = table.eccentricity(&candidate);
            let improves = match &best {
                Some((best_cost, _)) => cost < *best_cost,
                None => true,
            };
            if improves {
                best = Some((cost, candidate));
            }
        }

        best.unwrap()
    }

    #[test]
    fn binomial_values() {
        assert_eq!(binomial(5, 2), 10);
        assert_eq!(binomial(12, 3), 220);
        assert_eq!(binomial(7, 0), 1);
        assert_eq!(binomial(7, 7), 1);
        assert_eq!(binomial(3, 5), 0);
    }

    #[test]
    fn weighted_path_with_two_centers() {
        // 0-1-2-3-4 with weights 1, 2, 3, 4. Optimum is {2, 4} at cost 3.
        let edges = vec![
            WeightedEdge::new(0, 1, 1).unwrap(),
            WeightedEdge::new(1, 2, 2).unwrap(),
            WeightedEdge::new(2, 3, 3).unwrap(),
            WeightedEdge::new(3, 4, 4).unwrap(),
        ];
        let graph = VecVecGraph::from_edges(5, &edges, Vec::new());
        let table = DistanceTable::new(&graph).unwrap();

        let outcome = run_search(&table, 2);

        assert_eq!(outcome.cost, 3);
        assert_eq!(outcome.centers, vec![2, 4]);
        assert_eq!(outcome.candidates_evaluated, 10);
        assert_eq!((outcome.cost, outcome.centers), exhaustive_best(&table, 2));
    }

    #[test]
    fn pruned_search_matches_exhaustive_scan() {
        for seed in 0..3 {
            let graph = generate_graph(&GenerationConfig {
                number_of_vertices: 11,
                mean_degree: 3,
                max_coordinate: 200,
                seed,
            })
            .unwrap();
            let table = DistanceTable::new(&graph).unwrap();

            for k in [1, 2, 3] {
                let outcome = run_search(&table, k);
                let (expected_cost, expected_centers) = exhaustive_best(&table, k);

                assert_eq!(outcome.cost, expected_cost, "seed {} k {}", seed, k);
                assert_eq!(outcome.centers, expected_centers, "seed {} k {}", seed, k);
            }
        }
    }

    #[test]
    fn all_vertices_as_centers_cost_nothing() {
        let edges = vec![
            WeightedEdge::new(0, 1, 9).unwrap(),
            WeightedEdge::new(1, 2, 9).unwrap(),
        ];
        let graph = VecVecGraph::from_edges(3, &edges, Vec::new());
        let table = DistanceTable::new(&graph).unwrap();

        let outcome = run_search(&table, 3);

        assert_eq!(outcome.cost, 0);
        assert_eq!(outcome.centers, vec![0, 1, 2]);
    }

    #[test]
    fn invalid_center_counts_are_rejected() {
        let edges = vec![WeightedEdge::new(0, 1, 1).unwrap()];
        let graph = VecVecGraph::from_edges(2, &edges, Vec::new());
        let table = DistanceTable::new(&graph).unwrap();

        let callback = NullCallback;
        let emitter = ProgressEmitter::new(&callback);
        let cancelled = AtomicBool::new(false);

        assert!(matches!(
            search_centers(&table, 0, &emitter, &cancelled),
            Err(ResolveError::InvalidParameter(_))
        ));
        assert!(matches!(
            search_centers(&table, 3, &emitter, &cancelled),
            Err(ResolveError::InvalidParameter(_))
        ));
    }

    #[test]
    fn pre_set_cancellation_stops_before_any_work() {
        let edges = vec![WeightedEdge::new(0, 1, 1).unwrap()];
        let graph = VecVecGraph::from_edges(2, &edges, Vec::new());
        let table = DistanceTable::new(&graph).unwrap();

        let callback = NullCallback;
        let emitter = ProgressEmitter::new(&callback);
        let cancelled = AtomicBool::new(true);

        assert!(matches!(
            search_centers(&table, 1, &emitter, &cancelled),
            Err(ResolveError::Cancelled)
        ));
    }
}
