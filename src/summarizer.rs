//! Prompt construction and the summarize step.
//!
//! Articles are serialized into fixed three-line blocks:
//!
//! ```text
//! Content: {content}
//! URL: {url}
//! Date: {published_date}
//! ```
//!
//! joined by a blank line, and sent as the user message after a system
//! instruction that fixes the digest layout. The model's reply is returned
//! verbatim; date grouping and ordering are left to the model.

use crate::api::{ChatMessage, ChatModel};
use crate::error::DigestError;
use crate::models::ArticleRecord;
use crate::utils::truncate_for_log;
use itertools::Itertools;
use tracing::{debug, info, instrument};

/// System instruction. `{timezone}` is replaced with the configured zone.
const SYSTEM_TEMPLATE: &str = "Summarize AI news articles into markdown format. For each item include:
- Date in **YYYY-MM-DD** format in {timezone} timezone
- Concise sentences summary from latest news
- Sort news by date wise (latest first)
- Source URL as link
Use format:
### [Date]
- [Summary](URL)";

pub fn system_instruction(timezone: &str) -> String {
    SYSTEM_TEMPLATE.replace("{timezone}", timezone)
}

/// Serialize one article into its three-line block.
pub fn article_block(article: &ArticleRecord) -> String {
    format!(
        "Content: {}\nURL: {}\nDate: {}",
        article.content, article.url, article.published_date
    )
}

/// Serialize all articles, in order, separated by blank lines.
pub fn serialize_articles(articles: &[ArticleRecord]) -> String {
    articles.iter().map(article_block).join("\n\n")
}

/// Build the two-message prompt for a set of articles.
pub fn build_messages(articles: &[ArticleRecord], timezone: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(system_instruction(timezone)),
        ChatMessage::user(format!("Articles:\n{}", serialize_articles(articles))),
    ]
}

/// Ask the model for a digest of `articles`.
///
/// An empty article list still produces exactly one model call.
#[instrument(level = "info", skip_all, fields(articles = articles.len(), model = model.name()))]
pub async fn summarize<M: ChatModel>(
    model: &M,
    articles: &[ArticleRecord],
    timezone: &str,
) -> Result<String, DigestError> {
    let messages = build_messages(articles, timezone);
    debug!(
        prompt = %truncate_for_log(&messages[1].content, 500),
        "Built summarization prompt"
    );
    let summary = model.complete(&messages).await?;
    info!(bytes = summary.len(), "Received digest");
    Ok(summary)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::Role;
    use crate::search::tests::record;
    use std::sync::Mutex;

    /// Model double that records prompts and replies with a fixed text.
    #[derive(Debug, Default)]
    pub(crate) struct FakeModel {
        pub reply: String,
        pub fail: bool,
        pub calls: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl FakeModel {
        pub(crate) fn replying(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                ..Self::default()
            }
        }

        pub(crate) fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl ChatModel for FakeModel {
        fn name(&self) -> &str {
            "fake"
        }

        async fn complete(&self, messages: &[ChatMessage]) -> Result<String, DigestError> {
            self.calls.lock().unwrap().push(messages.to_vec());
            if self.fail {
                return Err(DigestError::Model("insufficient quota".into()));
            }
            Ok(self.reply.clone())
        }
    }

    fn scenario_articles() -> Vec<ArticleRecord> {
        vec![
            record("Chipmaker unveils AI accelerator", "https://news.example/1", "2025-01-10"),
            record("India launches AI mission phase two", "https://news.example/2", "2025-01-08"),
            record("Open model tops benchmark", "https://news.example/3", "2025-01-10"),
        ]
    }

    #[test]
    fn test_article_block_layout() {
        let block = article_block(&record("body", "https://u", "2025-01-10"));
        assert_eq!(block, "Content: body\nURL: https://u\nDate: 2025-01-10");
    }

    #[test]
    fn test_serialize_keeps_order_and_three_lines_each() {
        let articles = scenario_articles();
        let block = serialize_articles(&articles);

        let chunks: Vec<&str> = block.split("\n\n").collect();
        assert_eq!(chunks.len(), 3);
        for (chunk, article) in chunks.iter().zip(&articles) {
            let lines: Vec<&str> = chunk.lines().collect();
            assert_eq!(lines.len(), 3);
            assert_eq!(lines[0], format!("Content: {}", article.content));
            assert_eq!(lines[1], format!("URL: {}", article.url));
            assert_eq!(lines[2], format!("Date: {}", article.published_date));
        }
    }

    #[test]
    fn test_serialize_empty_is_empty() {
        assert_eq!(serialize_articles(&[]), "");
    }

    #[test]
    fn test_messages_contain_every_url() {
        let articles = scenario_articles();
        let messages = build_messages(&articles, "IST");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].role, Role::User);
        assert!(messages[1].content.starts_with("Articles:\n"));
        for a in &articles {
            assert!(messages[1].content.contains(&a.url), "missing {}", a.url);
        }
    }

    #[test]
    fn test_system_instruction_contract() {
        let sys = system_instruction("IST");
        assert!(sys.contains("**YYYY-MM-DD**"));
        assert!(sys.contains("IST timezone"));
        assert!(sys.contains("### [Date]"));
        assert!(sys.contains("- [Summary](URL)"));
        assert!(sys.contains("latest first"));
        assert!(!system_instruction("UTC").contains("IST"));
    }

    #[tokio::test]
    async fn test_summarize_returns_model_text_verbatim() {
        let reply = "### 2025-01-10\n- [Chip](https://news.example/1)\n\n  trailing  ";
        let model = FakeModel::replying(reply);
        let out = summarize(&model, &scenario_articles(), "IST").await.unwrap();
        assert_eq!(out, reply);
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn test_summarize_empty_still_calls_model() {
        let model = FakeModel::replying("No news found.");
        let out = summarize(&model, &[], "IST").await.unwrap();
        assert_eq!(out, "No news found.");
        assert_eq!(model.call_count(), 1);
        let calls = model.calls.lock().unwrap();
        assert_eq!(calls[0][1].content, "Articles:\n");
    }

    #[tokio::test]
    async fn test_summarize_propagates_model_failure() {
        let model = FakeModel::failing();
        let err = summarize(&model, &scenario_articles(), "IST").await.unwrap_err();
        assert!(matches!(err, DigestError::Model(_)));
    }
}
