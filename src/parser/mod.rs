pub mod feed_parser;

pub use feed_parser::{html_to_text, FeedParser, ParsedBatch, Parser};
