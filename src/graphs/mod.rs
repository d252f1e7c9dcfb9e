use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use ahash::{HashSet, HashSetExt};
use serde::{Deserialize, Serialize};

use crate::error::ResolveError;

pub mod generator;
pub mod vec_vec_graph;

pub type Vertex = u32;
pub type Distance = u32;

/// 2-D position of a vertex. Opaque payload as far as the solver is
/// concerned, but carried for external rendering and used by the
/// generator to derive edge weights.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    pub tail: Vertex,
    pub head: Vertex,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedEdge {
    pub tail: Vertex,
    pub head: Vertex,
    pub weight: Distance,
}

impl WeightedEdge {
    /// Returns `None` for self-loops, which are never legal input.
    pub fn new(tail: Vertex, head: Vertex, weight: Distance) -> Option<WeightedEdge> {
        if tail == head {
            return None;
        }

        Some(WeightedEdge { tail, head, weight })
    }

    pub fn reversed(&self) -> WeightedEdge {
        WeightedEdge {
            tail: self.head,
            head: self.tail,
            weight: self.weight,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TaillessEdge {
    pub head: Vertex,
    pub weight: Distance,
}

impl TaillessEdge {
    pub fn with_tail(&self, tail: Vertex) -> WeightedEdge {
        WeightedEdge {
            tail,
            head: self.head,
            weight: self.weight,
        }
    }
}

pub trait Graph: Send + Sync {
    fn number_of_vertices(&self) -> u32;

    /// Number of directed edge entries. Undirected edges are stored in
    /// both directions, so the undirected count is half of this.
    fn number_of_edges(&self) -> u32 {
        (0..self.number_of_vertices())
            .map(|vertex| self.out_edges(vertex).len() as u32)
            .sum::<u32>()
    }

    fn number_of_undirected_edges(&self) -> u32 {
        self.number_of_edges() / 2
    }

    fn out_edges(
        &self,
        source: Vertex,
    ) -> Box<dyn ExactSizeIterator<Item = WeightedEdge> + Send + '_>;

    fn get_weight(&self, edge: &Edge) -> Option<Distance>;
}

/// All vertices reachable from `start`, including `start` itself.
pub fn reachable_vertices(graph: &dyn Graph, start: Vertex) -> HashSet<Vertex> {
    let mut reached = HashSet::new();
    reached.insert(start);

    let mut stack = vec![start];
    while let Some(tail) = stack.pop() {
        for edge in graph.out_edges(tail) {
            if reached.insert(edge.head) {
                stack.push(edge.head);
            }
        }
    }

    reached
}

pub fn is_connected(graph: &dyn Graph) -> bool {
    let number_of_vertices = graph.number_of_vertices();
    if number_of_vertices == 0 {
        return true;
    }

    reachable_vertices(graph, 0).len() as u32 == number_of_vertices
}

pub fn ensure_connected(graph: &dyn Graph) -> Result<(), ResolveError> {
    if !is_connected(graph) {
        return Err(ResolveError::Disconnected);
    }

    Ok(())
}

/// Reads a graph from a `.gph` text file.
///
/// Layout: `#` comment lines, a line with the vertex count, a line with
/// the edge count, then one `x y` line per vertex and one
/// `tail head weight` line per edge. Edges are undirected.
pub fn read_graph_from_gph_file(
    path: &Path,
) -> Result<vec_vec_graph::VecVecGraph, ResolveError> {
    let reader = BufReader::new(File::open(path)?);
    read_graph_from_gph(reader)
}

pub fn read_graph_from_gph(
    reader: impl BufRead,
) -> Result<vec_vec_graph::VecVecGraph, ResolveError> {
    let mut lines = reader.lines().filter(|line| match line {
        Ok(line) => !line.starts_with('#') && !line.trim().is_empty(),
        Err(_) => true,
    });

    let mut next_line = |what: &str| -> Result<String, ResolveError> {
        match lines.next() {
            Some(line) => Ok(line?),
            None => Err(ResolveError::MalformedGraph(format!(
                "file ended before {}",
                what
            ))),
        }
    };

    let number_of_vertices: u32 = parse_field(&next_line("vertex count")?, "vertex count")?;
    let number_of_edges: u32 = parse_field(&next_line("edge count")?, "edge count")?;

    let mut positions = Vec::with_capacity(number_of_vertices as usize);
    for _ in 0..number_of_vertices {
        let line = next_line("vertex line")?;
        let mut values = line.split_whitespace();
        let x = parse_next(&mut values, &line, "x")?;
        let y = parse_next(&mut values, &line, "y")?;
        positions.push(Point { x, y });
    }

    let mut edges = Vec::with_capacity(number_of_edges as usize);
    for _ in 0..number_of_edges {
        let line = next_line("edge line")?;
        let mut values = line.split_whitespace();
        let tail = parse_next(&mut values, &line, "tail")?;
        let head = parse_next(&mut values, &line, "head")?;
        let weight = parse_next(&mut values, &line, "weight")?;

        if tail >= number_of_vertices || head >= number_of_vertices {
            return Err(ResolveError::MalformedGraph(format!(
                "edge endpoint out of range in line '{}'",
                line
            )));
        }

        let edge = WeightedEdge::new(tail, head, weight).ok_or_else(|| {
            ResolveError::MalformedGraph(format!("self-loop in line '{}'", line))
        })?;
        edges.push(edge);
    }

    let graph = vec_vec_graph::VecVecGraph::from_edges(number_of_vertices, &edges, positions);
    ensure_connected(&graph)?;

    Ok(graph)
}

fn parse_field(line: &str, what: &str) -> Result<u32, ResolveError> {
    line.trim().parse().map_err(|_| {
        ResolveError::MalformedGraph(format!("unable to parse {} in line '{}'", what, line))
    })
}

fn parse_next<'a>(
    values: &mut impl Iterator<Item = &'a str>,
    line: &str,
    what: &str,
) -> Result<u32, ResolveError> {
    let value = values.next().ok_or_else(|| {
        ResolveError::MalformedGraph(format!("no {} found in line '{}'", what, line))
    })?;

    value.parse().map_err(|_| {
        ResolveError::MalformedGraph(format!("unable to parse {} in line '{}'", what, line))
    })
}

/// Writes a graph in the `.gph` layout `read_graph_from_gph_file` reads.
pub fn write_graph_to_gph_file(
    graph: &vec_vec_graph::VecVecGraph,
    path: &Path,
) -> Result<(), ResolveError> {
    let mut writer = BufWriter::new(File::create(path)?);

    let undirected_edges = graph
        .all_edges()
        .into_iter()
        .filter(|edge| edge.tail < edge.head)
        .collect::<Vec<_>>();

    writeln!(writer, "{}", graph.number_of_vertices())?;
    writeln!(writer, "{}", undirected_edges.len())?;

    for vertex in 0..graph.number_of_vertices() {
        let position = graph.position(vertex);
        writeln!(writer, "{} {}", position.x, position.y)?;
    }

    for edge in undirected_edges {
        writeln!(writer, "{} {} {}", edge.tail, edge.head, edge.weight)?;
    }

    Ok(())
}
