//! Server-rendered HTML for the form and the result view.

use crate::api::ProviderKind;
use crate::config::Config;
use crate::error::DigestError;
use crate::models::{PipelineState, Timeframe};
use crate::outputs::download::DigestArtifact;
use crate::outputs::html::{escape, render_markdown};
use std::fmt::Write;

const STYLE: &str = "body{font-family:system-ui,sans-serif;margin:0;display:flex;min-height:100vh}\
form{display:flex;flex:1}\
aside{width:18rem;padding:1.5rem;background:#f3f4f6}\
main{flex:1;padding:1.5rem 2.5rem;max-width:60rem}\
label{display:block;margin:.75rem 0 .25rem;font-weight:600}\
input[type=text],input[type=password],select{width:100%;padding:.4rem;box-sizing:border-box}\
.error{background:#fee2e2;color:#991b1b;padding:.75rem 1rem;border-radius:.4rem}\
.success{background:#dcfce7;color:#166534;padding:.75rem 1rem;border-radius:.4rem}\
.download{display:inline-block;margin:1rem 0;padding:.5rem 1rem;background:#2563eb;color:#fff;border-radius:.4rem;text-decoration:none}";

fn layout(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>AI News Summarizer</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}\n</body>\n</html>\n"
    )
}

const GROQ_KEYS_URL: &str = "https://console.groq.com";
const TAVILY_KEYS_URL: &str = "https://tavily.com";
const AZURE_PORTAL_URL: &str = "https://portal.azure.com";

/// Values a user already chose, restored when the form is shown again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    pub timeframe: Option<Timeframe>,
    pub groq_model: String,
}

fn credential_fields(config: &Config, values: &FormValues) -> String {
    let mut out = String::new();
    match config.model.provider {
        ProviderKind::Groq => {
            let chosen = if values.groq_model.is_empty() {
                config.model.groq.default_model().unwrap_or_default()
            } else {
                values.groq_model.as_str()
            };
            out.push_str("<h2>Groq</h2>\n<label for=\"groq_model\">Groq model</label>\n<select id=\"groq_model\" name=\"groq_model\">\n");
            for model in &config.model.groq.models {
                let m = escape(model);
                let selected = if model == chosen { " selected" } else { "" };
                let _ = writeln!(out, "<option value=\"{m}\"{selected}>{m}</option>");
            }
            out.push_str("</select>\n");
            out.push_str("<label for=\"groq_api_key\">Groq API key</label>\n<input type=\"password\" id=\"groq_api_key\" name=\"groq_api_key\" autocomplete=\"off\">\n");
            let _ = writeln!(out, "<p><a href=\"{GROQ_KEYS_URL}\" target=\"_blank\" rel=\"noopener\">Get free GROQ API Key</a></p>");
        }
        ProviderKind::Azure => {
            let azure = &config.model.azure;
            out.push_str("<h2>Azure OpenAI</h2>\n");
            let _ = writeln!(out, "<p><a href=\"{AZURE_PORTAL_URL}\" target=\"_blank\" rel=\"noopener\">Create Azure OpenAI Resource</a></p>");
            out.push_str("<label for=\"azure_api_key\">API key of the Azure resource</label>\n<input type=\"password\" id=\"azure_api_key\" name=\"azure_api_key\" autocomplete=\"off\">\n");
            for (name, label, value) in [
                ("azure_endpoint", "Endpoint URI", &azure.endpoint),
                ("azure_api_version", "API version", &azure.api_version),
                ("azure_deployment", "Deployment name", &azure.deployment),
            ] {
                let _ = writeln!(
                    out,
                    "<label for=\"{name}\">{label}</label>\n<input type=\"text\" id=\"{name}\" name=\"{name}\" placeholder=\"{}\">",
                    escape(value)
                );
            }
        }
    }
    out.push_str("<h2>Tavily</h2>\n<label for=\"tavily_api_key\">Tavily API key</label>\n<input type=\"password\" id=\"tavily_api_key\" name=\"tavily_api_key\" autocomplete=\"off\">\n");
    let _ = writeln!(out, "<p><a href=\"{TAVILY_KEYS_URL}\" target=\"_blank\" rel=\"noopener\">Get free TAVILY API Key</a></p>");
    out.push_str("<p><small>Blank fields use the server's configured credentials.</small></p>\n");
    out
}

fn timeframe_choices(config: &Config, selected: Timeframe) -> String {
    let mut out = String::new();
    for tf in &config.digest.timeframes {
        let checked = if *tf == selected { " checked" } else { "" };
        let _ = writeln!(
            out,
            "<label><input type=\"radio\" name=\"timeframe\" value=\"{tf}\"{checked}> {tf}</label>"
        );
    }
    out
}

/// The run form. `values` restores the user's choices after a failed run.
pub fn form_page(config: &Config, values: &FormValues, error: Option<&DigestError>) -> String {
    let selected = values.timeframe.unwrap_or(config.digest.default_timeframe);
    let mut body = String::new();
    let _ = write!(
        body,
        "<form method=\"post\" action=\"/digest\">\n<aside>\n{}</aside>\n<main>\n\
         <h1>📰 Agentic AI News Summarizer</h1>\n\
         <p>Pick the timeframe of AI news you want to explore.</p>\n",
        credential_fields(config, values)
    );
    if let Some(e) = error {
        let _ = writeln!(body, "<p class=\"error\">{}</p>", escape(&e.to_string()));
    }
    let _ = write!(
        body,
        "<fieldset>\n<legend>Select timeframe</legend>\n{}</fieldset>\n\
         <p><button type=\"submit\">Get the news</button></p>\n</main>\n</form>",
        timeframe_choices(config, selected)
    );
    layout(&body)
}

/// The rendered digest with its download link.
pub fn result_page(config: &Config, state: &PipelineState, artifact: &DigestArtifact) -> String {
    let mut body = String::new();
    let _ = write!(
        body,
        "<main>\n<h1>📰 Agentic AI News Summarizer</h1>\n\
         <p>You selected: <strong>{tf}</strong> · {count} articles · {provider}</p>\n\
         <h2>🔍 Summary</h2>\n<article>\n{digest}</article>\n\
         <a class=\"download\" download=\"{filename}\" href=\"{href}\">Download these news as Markdown</a>\n\
         <p class=\"success\">✅ Use the button above to download the file.</p>\n\
         <p><a href=\"/\">Run again</a></p>\n</main>",
        tf = state.timeframe,
        count = state.raw_articles.len(),
        provider = config.model.provider,
        digest = render_markdown(&state.summary),
        filename = escape(&artifact.filename()),
        href = artifact.data_url(),
    );
    layout(&body)
}
