//! Orchestrator module for coordinating crawl, ingestion and reporting

pub mod runner;

pub use runner::{Orchestrator, RunSummary};
