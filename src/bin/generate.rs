use std::path::PathBuf;

use center_solver::graphs::{
    generator::{generate_graph, GenerationConfig},
    write_graph_to_gph_file, Graph,
};
use clap::Parser;

/// Generate a random connected graph and write it as a .gph file.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Output .gph file
    #[arg(short, long)]
    out: PathBuf,

    /// Number of vertices
    #[arg(short = 'n', long)]
    vertices: u32,

    /// Target mean degree
    #[arg(short, long, default_value_t = 3)]
    degree: u32,

    /// Coordinates are drawn from 0..=max_coordinate
    #[arg(short, long, default_value_t = 1_000)]
    max_coordinate: u32,

    /// Generation seed
    #[arg(short, long, default_value_t = 0)]
    seed: u64,
}

fn main() {
    let args = Args::parse();

    let graph = generate_graph(&GenerationConfig {
        number_of_vertices: args.vertices,
        mean_degree: args.degree,
        max_coordinate: args.max_coordinate,
        seed: args.seed,
    })
    .unwrap();

    write_graph_to_gph_file(&graph, &args.out).unwrap();

    println!(
        "wrote {} with {} vertices and {} edges",
        args.out.display(),
        graph.number_of_vertices(),
        graph.number_of_undirected_edges()
    );
}
