use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Instant,
};

use super::{
    center_search::search_centers,
    distance_table::DistanceTable,
    progress::{ProgressCallback, ProgressEmitter},
    result::ResultSet,
};
use crate::{
    error::ResolveError,
    graphs::{ensure_connected, Graph},
};

/// Front door of the engine: owns the graph for the duration of its
/// runs and enforces that at most one resolution is active at a time.
///
/// Parameter validation is synchronous; everything after `resolve`
/// returns flows through the progress callback on a dedicated worker
/// thread, which delivers exactly one terminal signal per run.
pub struct GraphResolver {
    graph: Arc<dyn Graph>,
    active: Arc<AtomicBool>,
}

impl GraphResolver {
    /// Fails fast with `Disconnected` if the graph has more than one
    /// component, before any run can start.
    pub fn new(graph: impl Graph + 'static) -> Result<GraphResolver, ResolveError> {
        ensure_connected(&graph)?;

        Ok(GraphResolver {
            graph: Arc::new(graph),
            active: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Starts resolving the K-center problem on a worker thread.
    ///
    /// `InvalidParameter` and `Busy` are returned synchronously and no
    /// callback signal is ever emitted for them. The returned handle is
    /// the only way to cancel or await the run.
    pub fn resolve(
        &self,
        k: u32,
        callback: Arc<dyn ProgressCallback>,
    ) -> Result<RunHandle, ResolveError> {
        let number_of_vertices = self.graph.number_of_vertices();
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

        self.active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ResolveError::Busy)?;

        let graph = Arc::clone(&self.graph);
        let active = Arc::clone(&self.active);
        let cancelled = Arc::new(AtomicBool::new(false));
        let worker_cancelled = Arc::clone(&cancelled);
        let done = Arc::new(AtomicBool::new(false));
        let worker_done = Arc::clone(&done);

        let worker = thread::spawn(move || {
            let _guard = ActiveGuard {
                active,
                done: worker_done,
            };
            let start = Instant::now();

            let emitter = ProgressEmitter::new(&*callback);
            let outcome = run(&*graph, k, &emitter, &worker_cancelled, start);

            match outcome {
                Ok(result) => callback.on_success(result),
                Err(error) => callback.on_error(&error),
            }
        });

        Ok(RunHandle {
            cancelled,
            done,
            worker: Some(worker),
        })
    }
}

fn run(
    graph: &dyn Graph,
    k: u32,
    emitter: &ProgressEmitter,
    cancelled: &AtomicBool,
    start: Instant,
) -> Result<ResultSet, ResolveError> {
    if cancelled.load(Ordering::Relaxed) {
        return Err(ResolveError::Cancelled);
    }

    let table = DistanceTable::new(graph)?;
    let outcome = search_centers(&table, k, emitter, cancelled)?;

    ResultSet::aggregate(&outcome, &table, graph, start.elapsed())
}

/// Marks the run finished and frees the resolver for the next one when
/// the worker exits, success, error or panic alike.
struct ActiveGuard {
    active: Arc<AtomicBool>,
    done: Arc<AtomicBool>,
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.done.store(true, Ordering::Release);
        self.active.store(false, Ordering::Release);
    }
}

/// Caller-owned handle to an in-flight run. Dropping it detaches the
/// run without cancelling it.
pub struct RunHandle {
    cancelled: Arc<AtomicBool>,
    done: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl RunHandle {
    /// Requests cooperative cancellation. The worker notices at the
    /// next candidate-batch boundary and terminates with `Cancelled`.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_active(&self) -> bool {
        !self.done.load(Ordering::Acquire)
    }

    /// Blocks until the worker has delivered its terminal signal.
    pub fn join(mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
