use serde_json::Value;

use crate::utils::{clean_model_output, parse_json};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ExtractError {
    /// Carries the user-facing message, raw output included.
    #[error("{0}")]
    Malformed(String),
    #[error("expected a JSON list of strings, got {found}. Raw output: {raw}")]
    Shape { found: &'static str, raw: String },
}

/// Extracts the search-query list the model was asked to produce.
///
/// The output must decode to a JSON array whose elements are all strings.
/// Blank entries are dropped; the number of queries is not enforced.
pub fn extract_queries(raw: &str) -> Result<Vec<String>, ExtractError> {
    let cleaned = clean_model_output(raw);
    let parsed = parse_json(&cleaned);
    if let Some(message) = parsed.error {
        return Err(ExtractError::Malformed(message));
    }

    let Value::Array(items) = parsed.value else {
        return Err(ExtractError::Shape {
            found: json_kind(&parsed.value),
            raw: raw.to_string(),
        });
    };

    items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(query) if query.trim().is_empty() => None,
            Value::String(query) => Some(Ok(query.trim().to_string())),
            other => Some(Err(ExtractError::Shape {
                found: json_kind(&other),
                raw: raw.to_string(),
            })),
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_plain_json_list() {
        let queries = extract_queries(
            r#"["quantum error correction codes", "surface code QEC", "QEC threshold theorem"]"#,
        )
        .unwrap();
        assert_eq!(
            queries,
            vec!["quantum error correction codes", "surface code QEC", "QEC threshold theorem"]
        );
    }

    #[test]
    fn extracts_fenced_list_and_trims_entries() {
        let queries = extract_queries("```json\n[\" a \", \"\", \"b\"]\n```").unwrap();
        assert_eq!(queries, vec!["a", "b"]);
    }

    #[test]
    fn count_is_not_enforced() {
        assert_eq!(extract_queries("[]").unwrap(), Vec::<String>::new());
        assert_eq!(extract_queries(r#"["a","b","c","d"]"#).unwrap().len(), 4);
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = extract_queries("Sure! Here are some queries").unwrap_err();
        match err {
            ExtractError::Malformed(message) => {
                assert!(message.contains("Raw output: Sure! Here are some queries"))
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn wrong_shapes_are_rejected() {
        assert!(matches!(
            extract_queries(r#"{"queries": ["a"]}"#),
            Err(ExtractError::Shape { found: "an object", .. })
        ));
        assert!(matches!(
            extract_queries(r#"["a", 2]"#),
            Err(ExtractError::Shape { found: "a number", .. })
        ));
        assert!(matches!(
            extract_queries(r#"[["nested"]]"#),
            Err(ExtractError::Shape { found: "a list", .. })
        ));
    }
}
