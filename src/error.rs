use thiserror::Error;

/// All the ways a resolution run can fail. Every fallible operation in
/// this crate reports one of these, and a run delivers exactly one of
/// them through [`ProgressCallback::on_error`](crate::ProgressCallback)
/// when it does not succeed.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The graph input could not be parsed into a valid graph.
    #[error("malformed graph: {0}")]
    MalformedGraph(String),

    /// The graph is not connected, so some vertex has no finite
    /// distance to any center.
    #[error("graph is not connected")]
    Disconnected,

    /// A caller-supplied parameter is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A resolution run is already active on this resolver.
    #[error("a resolution is already running")]
    Busy,

    /// The run was cancelled before it finished.
    #[error("resolution cancelled")]
    Cancelled,

    /// An internal invariant was violated. This indicates a bug.
    #[error("internal error: {0}")]
    Internal(String),

    /// Reading or writing a graph file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
