pub mod chunking;
pub mod config;
pub mod domain;
pub mod error;
pub mod ingest;
pub mod parse;
