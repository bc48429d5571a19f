//! Server-side rendering of the chat page.
use super::{ChatState, Role, StatusKind, Turn};

const STYLE: &str = r#"
body { background-color: #121212; color: #FFFFFF; font-family: 'Inter', sans-serif; max-width: 860px; margin: 0 auto; padding: 24px; }
h2 { margin-bottom: 5px; text-align: center; color: #4CAF50; font-weight: 600; }
h5 { text-align: center; margin-top: 5px; margin-bottom: 15px; }
.upload { border: 2px dashed #00E676; border-radius: 10px; padding: 10px; background-color: #1E1E1E; }
.status { padding: 10px 12px; border-radius: 6px; margin: 12px 0; }
.status.success { background-color: #1B3A24; border: 1px solid #00E676; }
.status.error { background-color: #3A1B1B; border: 1px solid #FF5252; }
.turn { padding: 12px; border-radius: 8px; margin: 8px 0; white-space: pre-wrap; }
.turn.user { background-color: #2E2E2E; }
.turn.assistant { background-color: #1E1E1E; }
.turn.error { background-color: #3A1B1B; }
.turn .meta { font-size: 0.8em; color: #9E9E9E; margin-top: 6px; }
input[type=text] { width: 78%; background-color: #1E1E1E; color: #FFFFFF; border: 1px solid #00E676; border-radius: 5px; padding: 8px; }
button { background-color: #00E676; color: #000; border: none; border-radius: 5px; font-weight: bold; padding: 8px 14px; cursor: pointer; }
"#;

const HOW_TO: &str = r#"
<h3>How to Use</h3>
<ul>
  <li><b>Upload PDF:</b> Click on the file uploader and select a PDF document.</li>
  <li><b>Process Document:</b> Wait for the document to be processed.</li>
  <li><b>Ask Questions:</b> Type your query in the chat input.</li>
  <li><b>Get Insights:</b> Receive AI-generated answers based on the document context.</li>
</ul>
<hr>
"#;

/// `onsubmit` handler that disables the form's button while the request runs.
fn busy_on_submit(label: &str) -> String {
    format!(
        "onsubmit=\"const b = this.querySelector('button'); b.disabled = true; b.textContent = '{label}';\""
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_turn(turn: &Turn) -> String {
    let (class, label) = match turn.role {
        Role::User => ("user", "You"),
        Role::Assistant => ("assistant", "Assistant"),
        Role::Error => ("error", "Error"),
    };
    let mut meta = turn.at.format("%H:%M:%S").to_string();
    if !turn.pages.is_empty() {
        let pages: Vec<String> = turn.pages.iter().map(|p| format!("p.{p}")).collect();
        meta.push_str(&format!(" · context from {}", pages.join(", ")));
    }
    format!(
        "<div class=\"turn {class}\"><b>{label}</b>\n{}<div class=\"meta\">{meta}</div></div>\n",
        escape_html(&turn.text)
    )
}

/// Render the whole page for the current chat state.
pub fn render(chat: &ChatState) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Insights AI</title>\n<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n");
    html.push_str("<h2>📜Insights AI</h2>\n<h5>AI-Powered Document Analysis</h5>\n");

    html.push_str("<h3>Upload a Document</h3>\n");
    html.push_str(&format!(
        "<form class=\"upload\" action=\"/upload\" method=\"post\" enctype=\"multipart/form-data\" {}>\n\
         <label>Drop a PDF file here or click to upload (max {} MB)</label><br>\n\
         <input type=\"file\" name=\"document\" accept=\".pdf,application/pdf\" required>\n\
         <button type=\"submit\">Process</button>\n</form>\n",
        busy_on_submit("Processing document..."),
        chat.config().max_upload_mb
    ));

    if let Some(status) = chat.status() {
        let class = match status.kind {
            StatusKind::Success => "success",
            StatusKind::Error => "error",
        };
        let icon = match status.kind {
            StatusKind::Success => "✅",
            StatusKind::Error => "⚠️",
        };
        html.push_str(&format!(
            "<div class=\"status {class}\">{icon} <b>{}</b> {}</div>\n",
            escape_html(&status.title),
            escape_html(&status.message)
        ));
    }

    let documents = chat.session().documents();
    if !documents.is_empty() {
        html.push_str("<p>Indexed: ");
        let names: Vec<String> = documents
            .iter()
            .map(|d| format!("{} ({} chunks)", escape_html(&d.name), d.chunks))
            .collect();
        html.push_str(&names.join(", "));
        html.push_str("</p>\n");
    }

    html.push_str("<div id=\"conversation\">\n");
    for turn in chat.turns() {
        html.push_str(&render_turn(turn));
    }
    html.push_str("</div>\n");

    if !documents.is_empty() {
        html.push_str(&format!(
            "<form action=\"/ask\" method=\"post\" {}>\n\
             <input type=\"text\" name=\"query\" placeholder=\"Enter your question about the document...\" autofocus required>\n\
             <button type=\"submit\">Ask</button>\n</form>\n",
            busy_on_submit("Analyzing document...")
        ));
    }

    html.push_str(
        "<form action=\"/reset\" method=\"post\" style=\"margin-top: 12px\">\
         <button type=\"submit\">New session</button></form>\n",
    );
    html.push_str(HOW_TO);
    html.push_str("</body>\n</html>\n");
    html
}
