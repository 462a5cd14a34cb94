use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static THINK_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<think>.*?</think>\n*").expect("valid regex"));

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^```[A-Za-z0-9_-]*\s*\n(.*?)\n?```$").expect("valid regex"));

/// Result of a lenient JSON decode: on failure `value` is an empty list and
/// `error` holds a user-facing message that includes the raw text.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedJson {
    pub value: Value,
    pub error: Option<String>,
}

pub fn parse_json(raw: &str) -> ParsedJson {
    match serde_json::from_str(raw) {
        Ok(value) => ParsedJson { value, error: None },
        Err(err) => {
            tracing::warn!(error = %err, "model output is not valid JSON");
            ParsedJson {
                value: Value::Array(Vec::new()),
                error: Some(format!("Error decoding JSON. Raw output: {raw}")),
            }
        }
    }
}

/// Joins every inner group and then the groups themselves with blank lines.
pub fn flatten<S: AsRef<str>>(groups: &[Vec<S>]) -> String {
    groups
        .iter()
        .map(|group| {
            group
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<_>>()
                .join("\n\n")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Removes `<think>` blocks and a surrounding Markdown code fence from model output.
pub fn clean_model_output(raw: &str) -> String {
    let without_thinking = THINK_BLOCK.replace_all(raw, "");
    let trimmed = without_thinking.trim();
    match CODE_FENCE.captures(trimmed) {
        Some(caps) => caps[1].trim().to_string(),
        None => trimmed.to_string(),
    }
}
