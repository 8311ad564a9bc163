//! Markdown chunking into contextualised passages
//!
//! Splits a markdown file on level 1–3 headings, windows each section at a
//! token budget with a fixed overlap, and prefixes every passage with a
//! provenance line so short passages keep their global context in vector
//! space.

mod markdown;

pub use markdown::{MarkdownChunker, DEFAULT_MAX_TOKENS, WINDOW_OVERLAP};
