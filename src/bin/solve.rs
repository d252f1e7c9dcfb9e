use std::{path::PathBuf, sync::Arc};

use center_solver::{
    graphs::read_graph_from_gph_file,
    utility::{get_progressbar, PROGRESS_BAR_TICKS},
    ChannelCallback, GraphResolver, RunEvent,
};
use clap::Parser;

/// Solve the K-center problem for a .gph graph file.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Graph in .gph format
    #[arg(short, long)]
    graph: PathBuf,

    /// Number of centers to place
    #[arg(short = 'k', long)]
    centers: u32,

    /// Print the result as JSON instead of the plain summary
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    let graph = read_graph_from_gph_file(&args.graph).unwrap();
    let resolver = GraphResolver::new(graph).unwrap();

    let (callback, receiver) = ChannelCallback::new();
    let handle = resolver.resolve(args.centers, Arc::new(callback)).unwrap();

    let bar = get_progressbar("Searching centers", PROGRESS_BAR_TICKS);
    let mut failed = false;

    for event in receiver {
        match event {
            RunEvent::Progress(fraction) => {
                bar.set_position((fraction * PROGRESS_BAR_TICKS as f64) as u64);
            }
            RunEvent::Success(result) => {
                bar.finish_and_clear();
                if args.json {
                    println!("{}", serde_json::to_string_pretty(&result).unwrap());
                } else {
                    println!("{}", result.summary());
                }
            }
            RunEvent::Error(message) => {
                bar.finish_and_clear();
                eprintln!("{}", message);
                failed = true;
            }
        }
    }

    handle.join();

    if failed {
        std::process::exit(1);
    }
}
