use std::{net::SocketAddr, path::PathBuf};

use crate::{agents::ModelSettings, pdf::DEFAULT_FONT_PATH, pipeline::DEFAULT_MAX_DOCS};

pub const DEFAULT_BIND: &str = "127.0.0.1:8501";

/// Runtime configuration of the report server.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind: SocketAddr,
    pub model: ModelSettings,
    /// Papers fetched per search.
    pub max_docs: usize,
    /// TrueType font embedded into generated PDFs.
    pub font_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8501)),
            model: ModelSettings::default(),
            max_docs: DEFAULT_MAX_DOCS,
            font_path: PathBuf::from(DEFAULT_FONT_PATH),
        }
    }
}
