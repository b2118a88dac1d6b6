pub mod ingest;
pub mod retrieve;
pub mod stats;
