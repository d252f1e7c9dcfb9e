pub mod center_search;
pub mod collections;
pub mod dijkstra;
pub mod distance_table;
pub mod progress;
pub mod resolver;
pub mod result;
