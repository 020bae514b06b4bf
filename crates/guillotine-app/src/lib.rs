// Library root: config loading, snapshot ingestion and the CLI, exposed so
// integration tests can drive them without spawning the binary.

pub mod cli;
pub mod config;
pub mod ingest;
