//! Exact solver for the discrete weighted K-center problem on
//! undirected, connected graphs: pick K vertices minimizing the maximum
//! shortest-path distance from any vertex to its nearest pick.
//!
//! The engine precomputes an all-pairs distance table, enumerates
//! K-subsets lexicographically with branch-and-bound pruning spread
//! over a rayon pool, and reports through a progress/cancellation
//! callback owned by the caller. See [`search::resolver::GraphResolver`]
//! for the entry point.

pub mod error;
pub mod graphs;
pub mod search;
pub mod utility;

pub use error::ResolveError;
pub use search::{
    progress::{ChannelCallback, ProgressCallback, RunEvent},
    resolver::{GraphResolver, RunHandle},
    result::ResultSet,
};
