use std::{cmp::Reverse, collections::BinaryHeap};

use radix_heap::RadixHeapMap;
use serde::{Deserialize, Serialize};

use crate::graphs::{Distance, Vertex};

/// A shortest path as an ordered vertex sequence plus its total weight.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    pub vertices: Vec<Vertex>,
    pub distance: Distance,
}

/// Distance, predecessor and expansion state for one Dijkstra sweep.
/// The all-pairs build moves the finished rows straight into the
/// distance table via [`into_rows`](DijkstraBuffers::into_rows).
pub struct DijkstraBuffers {
    distances: Vec<Distance>,
    predecessors: Vec<Vertex>,
    expanded: Vec<bool>,
}

impl DijkstraBuffers {
    pub fn new(number_of_vertices: u32) -> DijkstraBuffers {
        DijkstraBuffers {
            distances: vec![Distance::MAX; number_of_vertices as usize],
            predecessors: vec![Vertex::MAX; number_of_vertices as usize],
            expanded: vec![false; number_of_vertices as usize],
        }
    }

    pub fn distance(&self, vertex: Vertex) -> Distance {
        self.distances[vertex as usize]
    }

    pub fn set_distance(&mut self, vertex: Vertex, distance: Distance) {
        self.distances[vertex as usize] = distance;
    }

    pub fn predecessor(&self, vertex: Vertex) -> Option<Vertex> {
        let predecessor = self.predecessors[vertex as usize];

        if predecessor == Vertex::MAX {
            return None;
        }

        Some(predecessor)
    }

    pub fn set_predecessor(&mut self, vertex: Vertex, predecessor: Vertex) {
        self.predecessors[vertex as usize] = predecessor;
    }

    /// Marks the vertex expanded. Returns true if it already was, which
    /// tells the search loop to skip the stale queue entry.
    pub fn expand(&mut self, vertex: Vertex) -> bool {
        std::mem::replace(&mut self.expanded[vertex as usize], true)
    }

    /// Consumes the buffers into (distances, predecessors) rows.
    pub fn into_rows(self) -> (Vec<Distance>, Vec<Vertex>) {
        (self.distances, self.predecessors)
    }
}

/// Priority queue over (vertex, distance) pairs for Dijkstra's
/// algorithm. Implementations may or may not support decrease-key;
/// stale entries are filtered by the expansion check instead. A queue
/// must be `clear`ed before reuse for another source, the radix heap
/// keeps a monotonicity watermark even after it is drained.
pub trait VertexDistanceQueue {
    fn clear(&mut self);

    fn insert(&mut self, vertex: Vertex, distance: Distance);

    fn pop(&mut self) -> Option<Vertex>;
}

/// Binary-heap queue. Equal distances pop in ascending vertex order.
pub struct VertexDistanceQueueBinaryHeap {
    heap: BinaryHeap<Reverse<(Distance, Vertex)>>,
}

impl VertexDistanceQueueBinaryHeap {
    pub fn new() -> Self {
        VertexDistanceQueueBinaryHeap {
            heap: BinaryHeap::new(),
        }
    }
}

impl Default for VertexDistanceQueueBinaryHeap {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexDistanceQueue for VertexDistanceQueueBinaryHeap {
    fn clear(&mut self) {
        self.heap.clear();
    }

    fn insert(&mut self, vertex: Vertex, distance: Distance) {
        self.heap.push(Reverse((distance, vertex)));
    }

    fn pop(&mut self) -> Option<Vertex> {
        let Reverse((_distance, vertex)) = self.heap.pop()?;

        Some(vertex)
    }
}

/// Radix-heap queue. Valid for Dijkstra because inserted keys are
/// monotonically non-decreasing; keys are negated as `RadixHeapMap` is
/// a max-heap.
pub struct VertexDistanceQueueRadix {
    heap: RadixHeapMap<i64, Vertex>,
}

impl VertexDistanceQueueRadix {
    pub fn new() -> Self {
        VertexDistanceQueueRadix {
            heap: RadixHeapMap::new(),
        }
    }
}

impl Default for VertexDistanceQueueRadix {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexDistanceQueue for VertexDistanceQueueRadix {
    fn clear(&mut self) {
        self.heap.clear();
    }

    fn insert(&mut self, vertex: Vertex, distance: Distance) {
        self.heap.push(-(distance as i64), vertex);
    }

    fn pop(&mut self) -> Option<Vertex> {
        let (_negated_distance, vertex) = self.heap.pop()?;

        Some(vertex)
    }
}
