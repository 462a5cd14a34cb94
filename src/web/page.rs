//! HTML for the single form page.

/// What the page shows: the form is always present, the rest is conditional.
#[derive(Debug, Default)]
pub struct PageView<'a> {
    pub topic: &'a str,
    pub error: Option<String>,
    pub notices: &'a [String],
    pub report: Option<&'a str>,
}

impl PageView<'_> {
    pub fn render(&self) -> String {
        let error_html = self
            .error
            .as_deref()
            .map(|error| format!(r#"<div class="alert error">{}</div>"#, escape_html(error)))
            .unwrap_or_default();

        let notices_html: String = self
            .notices
            .iter()
            .map(|notice| format!(r#"<div class="alert warning"><pre>{}</pre></div>"#, escape_html(notice)))
            .collect();

        let report_html = self.report.map(render_report).unwrap_or_default();

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>AI Research Assistant</title>
    <style>{STYLE}</style>
</head>
<body>
<main>
    <h1>&#128218; AI Research Assistant</h1>
    <section class="welcome">
        <h3>Welcome!</h3>
        <p>This tool generates comprehensive research papers by aggregating arXiv research articles.</p>
        <ol>
            <li>Enter your API key.</li>
            <li>Provide a research topic.</li>
            <li>Click <em>Generate Report</em>.</li>
            <li>Download the generated report as a PDF.</li>
        </ol>
    </section>

    <form method="POST" action="/generate" onsubmit="document.getElementById('spinner').hidden = false;">
        <label for="api_key">Enter API Key</label>
        <input type="password" id="api_key" name="api_key" autocomplete="off">

        <label for="topic">Enter Research Topic:</label>
        <input type="text" id="topic" name="topic" value="{topic}">

        <button type="submit">Generate Report</button>
        <div id="spinner" class="spinner" hidden>Generating report...</div>
    </form>
    {error_html}
    {notices_html}
    {report_html}
</main>
</body>
</html>"#,
            topic = escape_html(self.topic),
        )
    }
}

fn render_report(report: &str) -> String {
    format!(
        r#"<div class="alert success">Report generated!</div>
    <article class="report">{preview}</article>
    <form method="POST" action="/download">
        <textarea name="report" hidden>{raw}</textarea>
        <button type="submit">Download PDF</button>
    </form>"#,
        preview = markdown::to_html(report),
        raw = escape_html(report),
    )
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const STYLE: &str = "
body { font-family: system-ui, sans-serif; margin: 0; background: #fafafa; color: #222; }
main { max-width: 860px; margin: 0 auto; padding: 2rem 1rem; }
label { display: block; margin-top: 1rem; font-weight: 600; }
input { width: 100%; padding: .5rem; box-sizing: border-box; }
button { margin-top: 1rem; padding: .5rem 1.25rem; cursor: pointer; }
.alert { margin-top: 1rem; padding: .75rem 1rem; border-radius: 4px; }
.alert pre { margin: 0; white-space: pre-wrap; }
.error { background: #fde8e8; color: #9b1c1c; }
.warning { background: #fdf6e3; color: #8a6d3b; }
.success { background: #e6f4ea; color: #1e6b34; }
.spinner { margin-top: 1rem; font-style: italic; }
.report { margin-top: 1.5rem; line-height: 1.6; }
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_page_has_the_form_only() {
        let html = PageView::default().render();
        assert!(html.contains(r#"type="password""#));
        assert!(html.contains(r#"name="topic""#));
        assert!(html.contains("Generate Report"));
        assert!(!html.contains("Download PDF"));
    }

    #[test]
    fn report_is_previewed_as_markdown_and_offered_for_download() {
        let notices = vec!["Error decoding JSON. Raw output: nope".to_string()];
        let view = PageView {
            topic: "QEC",
            notices: &notices,
            report: Some("# Findings\n\nSurface codes <win>."),
            ..Default::default()
        };
        let html = view.render();
        assert!(html.contains("<h1>Findings</h1>"));
        assert!(html.contains("Report generated!"));
        assert!(html.contains("Download PDF"));
        assert!(html.contains("Surface codes &lt;win&gt;."));
        assert!(html.contains("Raw output: nope"));
        assert!(html.contains(r#"value="QEC""#));
    }

    #[test]
    fn user_text_is_escaped() {
        let view = PageView {
            topic: r#""><script>"#,
            error: Some("<b>bad</b>".to_string()),
            ..Default::default()
        };
        let html = view.render();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;b&gt;bad&lt;/b&gt;"));
    }
}
