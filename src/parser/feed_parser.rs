// Newline-delimited product feed parsing
use crate::model::ProductDocument;
use scraper::Html;
use tracing::{info, warn};

pub trait Parser {
    fn parse(&self, raw: &str) -> ParsedBatch;
}

/// Documents recovered from one batch, plus how many lines were unusable.
#[derive(Debug, Default)]
pub struct ParsedBatch {
    pub documents: Vec<ProductDocument>,
    pub malformed: usize,
}

pub struct FeedParser;

impl FeedParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FeedParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for FeedParser {
    /// Parses one product per non-blank line. A line that does not decode is
    /// logged and skipped; the rest of the batch still goes through.
    fn parse(&self, raw: &str) -> ParsedBatch {
        let mut batch = ParsedBatch::default();

        for (i, line) in raw.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<ProductDocument>(line) {
                Ok(doc) => batch.documents.push(doc),
                Err(e) => {
                    let preview: String = line.chars().take(120).collect();
                    warn!("❌ JSON decode error on line {}: {} | line content: {}", i + 1, e, preview);
                    batch.malformed += 1;
                }
            }
        }

        info!(
            "Parsed {} documents ({} malformed lines skipped)",
            batch.documents.len(),
            batch.malformed
        );
        batch
    }
}

/// Visible text of an HTML fragment, one space between text nodes.
pub fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    fragment
        .root_element()
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExternalId;

    #[test]
    fn skips_blank_and_malformed_lines() {
        let raw = concat!(
            "{\"id\": 1, \"title\": \"Tee\", \"variants\": []}\n",
            "\n",
            "{not json\n",
            "   \n",
            "{\"id\": 2, \"title\": \"Jean\", \"variants\": []}\n",
            "[1, 2, 3]\n",
        );
        let batch = FeedParser::new().parse(raw);
        assert_eq!(batch.documents.len(), 2);
        assert_eq!(batch.malformed, 2);
        assert_eq!(batch.documents[1].title.as_deref(), Some("Jean"));
    }

    #[test]
    fn loosely_typed_fields_do_not_drop_the_line() {
        let raw = concat!(
            "{\"id\": 7001.0, \"title\": \"Chino\", \"tags\": \"pants, spring\", \"variants\": []}\n",
            "{\"id\": \"sku-9\", \"title\": 42, \"tags\": [\"sale\", 2025, null], \"store\": false}\n",
        );
        let batch = FeedParser::new().parse(raw);
        assert_eq!(batch.malformed, 0);
        assert_eq!(batch.documents.len(), 2);

        let chino = &batch.documents[0];
        assert_eq!(chino.id, Some(ExternalId::Number(7001)));
        assert_eq!(chino.tags, Some(vec!["pants".to_string(), "spring".to_string()]));

        let other = &batch.documents[1];
        assert_eq!(other.id, Some(ExternalId::Text("sku-9".into())));
        assert_eq!(other.title.as_deref(), Some("42"));
        assert_eq!(other.tags, Some(vec!["sale".to_string(), "2025".to_string()]));
        assert_eq!(other.store.as_deref(), Some("false"));
    }

    #[test]
    fn html_to_text_joins_text_nodes() {
        assert_eq!(
            html_to_text("<p>Soft <b>cotton</b> tee.</p><ul><li>Machine wash</li></ul>"),
            "Soft cotton tee. Machine wash"
        );
        assert_eq!(html_to_text("  plain text  "), "plain text");
        assert_eq!(html_to_text(""), "");
    }
}
