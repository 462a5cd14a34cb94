pub mod agents;
pub mod arxiv;
pub mod cli;
pub mod config;
pub mod extractors;
pub mod pdf;
pub mod pipeline;
pub mod prompts;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod utils;
pub mod web;
