//! The research pipeline: topic → search queries → per-paper summaries →
//! reference list → long-form report.
//!
//! Every step is a plain async function over the [`LanguageModel`] and
//! [`PaperRetriever`] capabilities; [`ResearchPipeline`] runs them in order.
//! All model and retrieval calls are sequential.

use crate::{
    agents::{LanguageModel, ModelError},
    arxiv::{ArxivError, Paper, PaperRetriever},
    extractors::extract_queries,
    prompts,
    utils::flatten,
};

pub const DEFAULT_MAX_DOCS: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum ResearchError {
    #[error("model call failed: {0}")]
    Model(#[from] ModelError),
    #[error("paper search failed: {0}")]
    Retrieval(#[from] ArxivError),
}

/// Everything one invocation produced, kept for display and debugging.
#[derive(Debug, Clone, Default)]
pub struct ResearchReport {
    pub topic: String,
    pub queries: Vec<String>,
    pub research_summary: String,
    pub url_list: String,
    pub report: String,
    /// Non-fatal problems the user should see, e.g. unparsable query output.
    pub notices: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedQueries {
    pub queries: Vec<String>,
    pub notice: Option<String>,
}

/// Asks the model for three search queries. Unusable output yields no
/// queries and a notice instead of an error.
pub async fn generate_queries(
    model: &dyn LanguageModel,
    topic: &str,
) -> Result<GeneratedQueries, ResearchError> {
    let raw = model.complete(None, &prompts::search_queries(topic)).await?;
    match extract_queries(&raw) {
        Ok(queries) => {
            tracing::info!(count = queries.len(), ?queries, "generated search queries");
            Ok(GeneratedQueries { queries, notice: None })
        }
        Err(err) => {
            tracing::warn!(error = %err, "query generation returned unusable output");
            Ok(GeneratedQueries {
                queries: Vec::new(),
                notice: Some(err.to_string()),
            })
        }
    }
}

/// Formats one summary record.
pub fn summary_record(paper: &Paper, summary: &str) -> String {
    format!("Title: {}\n\nSUMMARY: {}", paper.title, summary)
}

/// Fetches up to `max_docs` papers for `query` and summarizes each against `topic`.
pub async fn summarize_query(
    model: &dyn LanguageModel,
    retriever: &dyn PaperRetriever,
    topic: &str,
    query: &str,
    max_docs: usize,
) -> Result<Vec<String>, ResearchError> {
    let mut papers = retriever.search(query, max_docs).await?;
    papers.truncate(max_docs);
    tracing::info!(query, documents = papers.len(), "summarizing papers");

    let mut records = Vec::with_capacity(papers.len());
    for paper in &papers {
        let prompt = prompts::summarize_document(&paper.as_context(), topic);
        let summary = model.complete(None, &prompt).await?;
        records.push(summary_record(paper, &summary));
    }
    Ok(records)
}

/// Summarizes every query in turn and flattens all records into one text.
pub async fn aggregate_research(
    model: &dyn LanguageModel,
    retriever: &dyn PaperRetriever,
    topic: &str,
    queries: &[String],
    max_docs: usize,
) -> Result<String, ResearchError> {
    let mut groups = Vec::with_capacity(queries.len());
    for query in queries {
        groups.push(summarize_query(model, retriever, topic, query, max_docs).await?);
    }
    Ok(flatten(&groups))
}

/// Builds the Markdown reference list from a separate search on the topic itself.
pub async fn reference_list(
    retriever: &dyn PaperRetriever,
    topic: &str,
    max_docs: usize,
) -> Result<String, ResearchError> {
    let papers = retriever.search(topic, max_docs).await?;
    Ok(papers
        .iter()
        .take(max_docs)
        .map(Paper::reference_link)
        .collect::<Vec<_>>()
        .join("\n"))
}

pub async fn write_report(
    model: &dyn LanguageModel,
    topic: &str,
    research_summary: &str,
    url_list: &str,
) -> Result<String, ResearchError> {
    let prompt = prompts::write_report(topic, research_summary, url_list);
    Ok(model.complete(Some(prompts::WRITER_SYSTEM), &prompt).await?)
}

pub struct ResearchPipeline<'a> {
    model: &'a dyn LanguageModel,
    retriever: &'a dyn PaperRetriever,
    max_docs: usize,
}

impl<'a> ResearchPipeline<'a> {
    pub fn new(model: &'a dyn LanguageModel, retriever: &'a dyn PaperRetriever) -> Self {
        Self {
            model,
            retriever,
            max_docs: DEFAULT_MAX_DOCS,
        }
    }

    pub fn max_docs(mut self, max_docs: usize) -> Self {
        self.max_docs = max_docs;
        self
    }

    /// Runs the whole pipeline. Any model or retrieval fault aborts the run.
    pub async fn run(&self, topic: &str) -> Result<ResearchReport, ResearchError> {
        tracing::info!(topic, "starting research pipeline");

        let GeneratedQueries { queries, notice } = generate_queries(self.model, topic).await?;
        let research_summary =
            aggregate_research(self.model, self.retriever, topic, &queries, self.max_docs).await?;
        let url_list = reference_list(self.retriever, topic, self.max_docs).await?;
        tracing::debug!(
            summary_len = research_summary.len(),
            references = url_list.lines().count(),
            "research collected"
        );

        let report = write_report(self.model, topic, &research_summary, &url_list).await?;
        tracing::info!(topic, report_len = report.len(), "report generated");

        Ok(ResearchReport {
            topic: topic.to_string(),
            queries,
            research_summary,
            url_list,
            report,
            notices: notice.into_iter().collect(),
        })
    }
}
