use async_trait::async_trait;
use quick_xml::{events::{BytesEnd, BytesStart, BytesText, Event}, Reader};

/// One arXiv entry as returned by the Atom search API.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paper {
    pub title: String,
    pub authors: Vec<String>,
    pub abstract_text: String,
    /// Entry id, e.g. `http://arxiv.org/abs/2101.00001v1`.
    pub entry_id: String,
    pub pdf_url: String,
    pub published: String,
    pub categories: Vec<String>,
}

impl Paper {
    /// Markdown link used in the reference list.
    pub fn reference_link(&self) -> String {
        format!("[{}]({})", self.title, self.entry_id)
    }

    /// Text handed to the model when it summarizes this paper.
    pub fn as_context(&self) -> String {
        let mut context = format!("Title: {}\n", self.title);
        if !self.authors.is_empty() {
            context.push_str(&format!("Authors: {}\n", self.authors.join(", ")));
        }
        if !self.published.is_empty() {
            context.push_str(&format!("Published: {}\n", self.published));
        }
        context.push('\n');
        context.push_str(&self.abstract_text);
        context
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ArxivError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("XML parsing error: {0}")]
    XmlParsing(#[from] quick_xml::Error),
    #[error("arXiv answered with HTTP status {0}")]
    Status(u16),
}

const ARXIV_URL: &str = "http://export.arxiv.org/api/query";

/// Search capability the research pipeline depends on.
#[async_trait]
pub trait PaperRetriever: Send + Sync {
    /// Returns at most `max_results` papers, in the order the index ranked them.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Paper>, ArxivError>;
}

#[derive(Clone)]
pub struct ArxivRetriever {
    client: reqwest::Client,
    endpoint: String,
}

impl ArxivRetriever {
    pub fn new() -> Self {
        Self::with_endpoint(ARXIV_URL)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

impl Default for ArxivRetriever {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaperRetriever for ArxivRetriever {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Paper>, ArxivError> {
        tracing::debug!(query, max_results, "querying arXiv");
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("search_query", format!("all:{}", query)),
                ("start", 0.to_string()),
                ("max_results", max_results.to_string()),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ArxivError::Status(response.status().as_u16()));
        }
        let response = response.text().await?;

        let mut papers = ArxivParser::new().parse_response(&response)?;
        papers.truncate(max_results);
        tracing::debug!(query, found = papers.len(), "arXiv search finished");
        Ok(papers)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Field {
    Id,
    Title,
    Author,
    Abstract,
    Published,
}

#[derive(Default)]
struct ArxivParser {
    papers: Vec<Paper>,
    current_paper: Option<Paper>,
    current_field: Option<Field>,
}

impl ArxivParser {
    fn new() -> Self {
        Self::default()
    }

    fn parse_start_event(&mut self, event: &BytesStart) {
        match event.name().as_ref() {
            // a new <entry> starts a fresh paper; feed-level fields are ignored
            b"entry" => self.current_paper = Some(Paper::default()),
            _ if self.current_paper.is_none() => (),
            b"id" => self.current_field = Some(Field::Id),
            b"title" => self.current_field = Some(Field::Title),
            b"name" => self.current_field = Some(Field::Author),
            b"summary" => self.current_field = Some(Field::Abstract),
            b"published" => self.current_field = Some(Field::Published),
            _ => (),
        }
    }

    fn parse_text_event(&mut self, event: &BytesText) -> Result<(), ArxivError> {
        let (Some(paper), Some(field)) = (self.current_paper.as_mut(), self.current_field) else {
            return Ok(());
        };
        let text = event.unescape()?;
        let target = match field {
            Field::Id => &mut paper.entry_id,
            Field::Title => &mut paper.title,
            Field::Abstract => &mut paper.abstract_text,
            Field::Published => &mut paper.published,
            Field::Author => {
                paper.authors.push(text.into_owned());
                return Ok(());
            }
        };
        if !target.is_empty() {
            target.push(' ');
        }
        target.push_str(&text);
        Ok(())
    }

    fn parse_empty_event(&mut self, event: &BytesStart) -> Result<(), ArxivError> {
        let Some(paper) = self.current_paper.as_mut() else {
            return Ok(());
        };
        match event.name().as_ref() {
            b"link" => {
                let mut href = None;
                let mut is_pdf = false;
                for attr in event.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"href" => href = Some(attr.unescape_value()?.into_owned()),
                        b"title" => is_pdf = attr.value.as_ref() == b"pdf",
                        _ => (),
                    }
                }
                if let (true, Some(href)) = (is_pdf, href) {
                    paper.pdf_url = href.replace("http://", "https://");
                }
            }
            b"category" => {
                for attr in event.attributes().flatten() {
                    if attr.key.as_ref() == b"term" {
                        paper.categories.push(attr.unescape_value()?.into_owned());
                    }
                }
            }
            _ => (),
        }
        Ok(())
    }

    fn parse_end_event(&mut self, event: &BytesEnd) {
        match event.name().as_ref() {
            b"entry" => {
                if let Some(mut paper) = self.current_paper.take() {
                    paper.title = collapse_whitespace(&paper.title);
                    paper.abstract_text = collapse_whitespace(&paper.abstract_text);
                    paper.entry_id = paper.entry_id.trim().to_owned();
                    self.papers.push(paper);
                }
                self.current_field = None;
            }
            b"id" | b"title" | b"name" | b"summary" | b"published" => {
                self.current_field = None;
            }
            _ => (),
        }
    }

    fn parse_response(mut self, input: &str) -> Result<Vec<Paper>, ArxivError> {
        let mut reader = Reader::from_str(input);
        reader.trim_text(true);

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => self.parse_start_event(e),
                Event::Text(ref e) => self.parse_text_event(e)?,
                Event::Empty(ref e) => self.parse_empty_event(e)?,
                Event::End(ref e) => self.parse_end_event(e),
                Event::Eof => break,
                _ => (),
            }
            buf.clear();
        }

        Ok(self.papers)
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="html">ArXiv Query: search_query=all:surface code</title>
  <id>http://arxiv.org/api/abcdef</id>
  <entry>
    <id>http://arxiv.org/abs/1208.0928v2</id>
    <published>2012-08-04T13:46:38Z</published>
    <title>Surface codes: Towards practical
      large-scale quantum computation</title>
    <summary>  This article provides an introduction to surface code
      quantum computing &amp; error thresholds.
    </summary>
    <author><name>Austin G. Fowler</name></author>
    <author><name>Matteo Mariantoni</name></author>
    <link href="http://arxiv.org/abs/1208.0928v2" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/1208.0928v2" rel="related" type="application/pdf"/>
    <category term="quant-ph" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/quant-ph/9705052v1</id>
    <published>1997-05-28T00:00:00Z</published>
    <title>Stabilizer Codes and Quantum Error Correction</title>
    <summary>Thesis.</summary>
    <author><name>Daniel Gottesman</name></author>
    <category term="quant-ph" scheme="http://arxiv.org/schemas/atom"/>
    <category term="cs.IT" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
</feed>"#;

    #[test]
    fn parses_entries_and_ignores_feed_metadata() {
        let papers = ArxivParser::new().parse_response(FEED).unwrap();
        assert_eq!(papers.len(), 2);

        let first = &papers[0];
        assert_eq!(
            first.title,
            "Surface codes: Towards practical large-scale quantum computation"
        );
        assert_eq!(first.entry_id, "http://arxiv.org/abs/1208.0928v2");
        assert_eq!(first.pdf_url, "https://arxiv.org/pdf/1208.0928v2");
        assert_eq!(first.authors, vec!["Austin G. Fowler", "Matteo Mariantoni"]);
        assert_eq!(first.published, "2012-08-04T13:46:38Z");
        assert!(first.abstract_text.starts_with("This article provides"));
        assert!(first.abstract_text.contains("computing & error"));

        assert_eq!(papers[1].categories, vec!["quant-ph", "cs.IT"]);
        assert!(papers[1].pdf_url.is_empty());
    }

    #[test]
    fn empty_feed_yields_no_papers() {
        let feed = r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>empty</title></feed>"#;
        let papers = ArxivParser::new().parse_response(feed).unwrap();
        assert!(papers.is_empty());
    }

    #[test]
    fn malformed_xml_is_an_error() {
        let result = ArxivParser::new().parse_response("<feed><entry></feed>");
        assert!(matches!(result, Err(ArxivError::XmlParsing(_))));
    }

    #[test]
    fn reference_link_uses_entry_id() {
        let paper = Paper {
            title: "Surface codes".into(),
            entry_id: "http://arxiv.org/abs/1208.0928v2".into(),
            ..Default::default()
        };
        assert_eq!(
            paper.reference_link(),
            "[Surface codes](http://arxiv.org/abs/1208.0928v2)"
        );
    }

    #[test]
    fn context_includes_abstract_and_authors() {
        let paper = Paper {
            title: "T".into(),
            authors: vec!["A".into(), "B".into()],
            abstract_text: "Body".into(),
            ..Default::default()
        };
        assert_eq!(paper.as_context(), "Title: T\nAuthors: A, B\n\nBody");
    }
}
