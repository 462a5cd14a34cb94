//! Prompt templates for each pipeline step.

pub const WRITER_SYSTEM: &str =
    "You are an expert academic writer. Generate a high-quality research paper based on input.";

/// Output instruction closing the query prompt; no other prompt contains it.
pub const QUERY_FORMAT: &str =
    "Respond strictly as a JSON list: [\"query 1\", \"query 2\", \"query 3\"]";

pub fn search_queries(topic: &str) -> String {
    format!(
        "Generate 3 Google search queries to find objective information on: {topic}\n{QUERY_FORMAT}"
    )
}

pub fn summarize_document(document: &str, topic: &str) -> String {
    format!(
        "{document}\n\n-----------\n\
         Using the above text, answer in short:\n\n> {topic}\n\
         -----------\n\
         If the question cannot be answered, summarize all factual information, numbers, and statistics."
    )
}

pub fn write_report(topic: &str, research_summary: &str, url_list: &str) -> String {
    format!(
        "Information:\n--------\n{research_summary}\n--------\n\n\
         Write a detailed research paper on: \"{topic}\".\n\n\
         - Include an in-depth literature review, findings, statistics, and APA citations.\n\
         - Ensure at least 1,200 words.\n\
         - List references with clickable links from {url_list}."
    )
}
