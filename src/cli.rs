use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;

use crate::{
    agents::{ModelSettings, Provider, DEFAULT_MODEL, DEFAULT_OPENAI_BASE, DEFAULT_TEMPERATURE},
    config::{Config, DEFAULT_BIND},
    pdf::DEFAULT_FONT_PATH,
    pipeline::DEFAULT_MAX_DOCS,
};

/// Research assistant that turns a topic into an arXiv-backed report and PDF.
#[derive(Parser, Debug)]
#[command(name = "arxiv-report", version, about)]
pub struct Args {
    /// Address the web UI listens on
    #[arg(long, env = "REPORT_BIND", default_value = DEFAULT_BIND)]
    pub bind: SocketAddr,

    /// Generation model provider
    #[arg(long, env = "REPORT_PROVIDER", value_enum, default_value_t = Provider::Gemini)]
    pub provider: Provider,

    /// Model identifier
    #[arg(long, env = "REPORT_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Base URL of the OpenAI-compatible endpoint (openai provider only)
    #[arg(long, env = "REPORT_API_BASE", default_value = DEFAULT_OPENAI_BASE)]
    pub api_base: String,

    /// Sampling temperature
    #[arg(long, env = "REPORT_TEMPERATURE", default_value_t = DEFAULT_TEMPERATURE)]
    pub temperature: f64,

    /// Papers fetched per arXiv search
    #[arg(long, env = "REPORT_MAX_DOCS", default_value_t = DEFAULT_MAX_DOCS)]
    pub max_docs: usize,

    /// Unicode TrueType font for the PDF; ASCII-only Helvetica is used if it cannot be loaded
    #[arg(long, env = "REPORT_FONT", default_value = DEFAULT_FONT_PATH)]
    pub font: PathBuf,
}

impl Args {
    pub fn into_config(self) -> Config {
        Config {
            bind: self.bind,
            model: ModelSettings {
                provider: self.provider,
                model: self.model,
                temperature: self.temperature,
                api_base: self.api_base,
            },
            max_docs: self.max_docs.max(1),
            font_path: self.font,
        }
    }
}
