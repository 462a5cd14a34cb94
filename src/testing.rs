//! Canned model and retriever used by the unit and router tests.

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;

use crate::{
    agents::{LanguageModel, ModelError, ModelFactory},
    arxiv::{ArxivError, Paper, PaperRetriever},
    prompts,
};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPrompt {
    pub system: Option<String>,
    pub prompt: String,
}

/// Replies by prompt kind: the query prompt, the report prompt (the only one
/// with a system message) and everything else, which is treated as a summary.
pub struct ScriptedModel {
    pub queries_reply: String,
    pub summary_reply: String,
    pub report_reply: String,
    pub fail: bool,
    prompts: Mutex<Vec<RecordedPrompt>>,
}

impl ScriptedModel {
    pub fn new(queries_reply: &str) -> Self {
        Self {
            queries_reply: queries_reply.to_string(),
            summary_reply: "A concise finding with 3 numbers.".to_string(),
            report_reply: "# Report\n\nA long paper.".to_string(),
            fail: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_report(mut self, report: &str) -> Self {
        self.report_reply = report.to_string();
        self
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new("[]")
        }
    }

    pub fn prompts(&self) -> Vec<RecordedPrompt> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// The final report prompt, if the pipeline got that far.
    pub fn report_prompt(&self) -> Option<String> {
        self.prompts()
            .into_iter()
            .find(|p| p.system.is_some())
            .map(|p| p.prompt)
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, system: Option<&str>, prompt: &str) -> Result<String, ModelError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(RecordedPrompt {
                system: system.map(str::to_string),
                prompt: prompt.to_string(),
            });
        }
        if self.fail {
            return Err(ModelError::EmptyResponse);
        }
        Ok(if system.is_some() {
            self.report_reply.clone()
        } else if prompt.contains(prompts::QUERY_FORMAT) {
            self.queries_reply.clone()
        } else {
            self.summary_reply.clone()
        })
    }
}

/// Hands out a fresh [`ScriptedModel`] per request.
pub struct ScriptedFactory {
    pub queries_reply: String,
    pub report_reply: String,
    pub fail: bool,
}

impl ModelFactory for ScriptedFactory {
    fn connect(&self, _api_key: &str) -> Result<Box<dyn LanguageModel>, ModelError> {
        let model = ScriptedModel {
            fail: self.fail,
            ..ScriptedModel::new(&self.queries_reply).with_report(&self.report_reply)
        };
        Ok(Box::new(model))
    }
}

/// Answers searches from a fixed table; unknown queries find nothing.
#[derive(Default)]
pub struct StaticRetriever {
    pub results: HashMap<String, Vec<Paper>>,
    pub fail: bool,
    searches: Mutex<Vec<String>>,
}

impl StaticRetriever {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, query: &str, papers: Vec<Paper>) -> Self {
        self.results.insert(query.to_string(), papers);
        self
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn searches(&self) -> Vec<String> {
        self.searches.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PaperRetriever for StaticRetriever {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Paper>, ArxivError> {
        if let Ok(mut searches) = self.searches.lock() {
            searches.push(query.to_string());
        }
        if self.fail {
            return Err(ArxivError::Status(503));
        }
        Ok(self
            .results
            .get(query)
            .map(|papers| papers.iter().take(max_results).cloned().collect())
            .unwrap_or_default())
    }
}

/// A paper with a title and an arXiv-style entry id.
pub fn paper(title: &str, id: &str) -> Paper {
    Paper {
        title: title.to_string(),
        abstract_text: format!("Abstract of {title}."),
        entry_id: format!("http://arxiv.org/abs/{id}"),
        ..Default::default()
    }
}
