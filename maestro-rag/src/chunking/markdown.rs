//! Heading-aware markdown chunker with overlapping token windows

use crate::error::Result;
use crate::types::Chunk;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::trace;

/// Default window size in whitespace-separated tokens
pub const DEFAULT_MAX_TOKENS: usize = 400;

/// Overlap between consecutive windows of a long section, in tokens
pub const WINDOW_OVERLAP: usize = 50;

/// Markdown headings of levels 1-3 at line start
static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#{1,3} .+$").expect("valid heading pattern"));

/// Markdown chunker producing contextualised passages
///
/// Splits a file on level 1-3 headings, then windows each section at
/// `max_tokens` whitespace tokens with a fixed 50-token overlap between
/// consecutive windows. Every passage carries a provenance prefix (skill,
/// file, and a one-line file description) in its `contextual_text`, so a
/// short passage still embeds with its global context.
#[derive(Debug, Clone, Copy)]
pub struct MarkdownChunker {
    max_tokens: usize,
}

impl MarkdownChunker {
    /// Create a chunker with the given token window size
    #[must_use]
    pub const fn new(max_tokens: usize) -> Self {
        Self { max_tokens }
    }

    /// Chunk a markdown file into passages
    ///
    /// Reads the file as UTF-8 with invalid sequences replaced. Empty
    /// windows are dropped, so an empty or whitespace-only file yields no
    /// chunks.
    ///
    /// # Errors
    ///
    /// Returns `RagError::Io` if the file cannot be read. Callers indexing
    /// a corpus collect the error and continue with the next file.
    pub fn chunk_file(&self, path: &Path, skill: &str, domains: &[String]) -> Result<Vec<Chunk>> {
        let bytes = std::fs::read(path)?;
        let text = String::from_utf8_lossy(&bytes);

        let file_name = path
            .file_name()
            .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
        let file_context = Self::extract_context(&text, &file_name, skill);

        let mut chunks = Vec::new();
        for (section_title, section_body) in Self::split_sections(&text) {
            for window in self.split_windows(section_body) {
                let id = Chunk::derive_id(skill, &file_name, section_title, &window);
                let contextual_text = format!("[{skill} | {file_name}]\n{file_context}\n\n{window}");
                chunks.push(Chunk {
                    id,
                    text: window,
                    contextual_text,
                    skill: skill.to_string(),
                    file: file_name.clone(),
                    file_path: path.to_string_lossy().into_owned(),
                    section: section_title.to_string(),
                    domains: domains.to_vec(),
                });
            }
        }
        trace!("chunked {} into {} passages", path.display(), chunks.len());
        Ok(chunks)
    }

    /// Split text into `(title, body)` sections on level 1-3 headings
    ///
    /// Text before the first heading becomes an `intro` section; a file
    /// with no headings yields a single `main` section. Sections with
    /// empty bodies are skipped.
    fn split_sections(text: &str) -> Vec<(&str, &str)> {
        let matches: Vec<_> = HEADING.find_iter(text).collect();
        if matches.is_empty() {
            return vec![("main", text)];
        }

        let mut sections = Vec::new();
        let preamble = text[..matches[0].start()].trim();
        if !preamble.is_empty() {
            sections.push(("intro", preamble));
        }
        for (i, m) in matches.iter().enumerate() {
            let title = m.as_str().trim_start_matches('#').trim();
            let body_end = matches.get(i + 1).map_or(text.len(), |next| next.start());
            let body = text[m.end()..body_end].trim();
            if !body.is_empty() {
                sections.push((title, body));
            }
        }
        if sections.is_empty() {
            return vec![("main", text)];
        }
        sections
    }

    /// Window a section body at `max_tokens` with a 50-token tail overlap
    fn split_windows(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.len() <= self.max_tokens {
            if text.trim().is_empty() {
                return Vec::new();
            }
            return vec![text.to_string()];
        }

        let mut windows = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        for word in words {
            current.push(word);
            if current.len() >= self.max_tokens {
                windows.push(current.join(" "));
                current = current[current.len().saturating_sub(WINDOW_OVERLAP)..].to_vec();
            }
        }
        if !current.is_empty() {
            windows.push(current.join(" "));
        }
        windows
    }

    /// Extract the per-file context line
    ///
    /// Scans the first eight lines for a `description:` prefix and takes
    /// the remainder stripped of surrounding quotes; otherwise falls back
    /// to `"<skill> — <filename>"`.
    fn extract_context(text: &str, filename: &str, skill: &str) -> String {
        for line in text.lines().take(8) {
            if let Some(rest) = line.strip_prefix("description:") {
                return rest.trim().trim_matches(|c| c == '\'' || c == '"').to_string();
            }
        }
        format!("{skill} — {filename}")
    }
}

impl Default for MarkdownChunker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TOKENS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_md(content: &str) -> NamedTempFile {
        let mut f = tempfile::Builder::new().suffix(".md").tempfile().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_sections_and_intro() {
        let f = write_md("Opening paragraph.\n\n## First\n\nAlpha body.\n\n### Second\n\nBeta body.\n");
        let chunker = MarkdownChunker::default();
        let chunks = chunker.chunk_file(f.path(), "swift", &[]).unwrap();

        let sections: Vec<&str> = chunks.iter().map(|c| c.section.as_str()).collect();
        assert_eq!(sections, vec!["intro", "First", "Second"]);
        assert_eq!(chunks[1].text, "Alpha body.");
    }

    #[test]
    fn test_no_headings_yields_main() {
        let f = write_md("Just a body with no headings at all.");
        let chunks = MarkdownChunker::default()
            .chunk_file(f.path(), "swift", &[])
            .unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].section, "main");
    }

    #[test]
    fn test_empty_file_yields_nothing() {
        let f = write_md("   \n\n  ");
        let chunks = MarkdownChunker::default()
            .chunk_file(f.path(), "swift", &[])
            .unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_exact_window_is_one_chunk() {
        let f = write_md(&words(400));
        let chunks = MarkdownChunker::default()
            .chunk_file(f.path(), "swift", &[])
            .unwrap();
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn test_window_plus_one_overlaps_fifty() {
        let f = write_md(&words(401));
        let chunks = MarkdownChunker::default()
            .chunk_file(f.path(), "swift", &[])
            .unwrap();
        assert_eq!(chunks.len(), 2);

        let first: Vec<&str> = chunks[0].text.split_whitespace().collect();
        let second: Vec<&str> = chunks[1].text.split_whitespace().collect();
        assert_eq!(first.len(), 400);
        assert_eq!(second.len(), 51);
        // Overlap is exactly the last 50 tokens of the first window
        assert_eq!(&first[350..], &second[..50]);
        // Union covers the input
        assert_eq!(second[50], "w400");
    }

    #[test]
    fn test_thousand_tokens_three_windows() {
        let f = write_md(&words(1000));
        let chunks = MarkdownChunker::default()
            .chunk_file(f.path(), "swift", &[])
            .unwrap();
        assert_eq!(chunks.len(), 3);

        let sizes: Vec<usize> = chunks
            .iter()
            .map(|c| c.text.split_whitespace().count())
            .collect();
        assert_eq!(sizes[0], 400);
        assert_eq!(sizes[1], 400);
        assert!(sizes[2] <= 400);

        // De-overlapped concatenation reconstructs the original section
        let mut reconstructed: Vec<String> = chunks[0]
            .text
            .split_whitespace()
            .map(ToString::to_string)
            .collect();
        for chunk in &chunks[1..] {
            reconstructed.extend(
                chunk
                    .text
                    .split_whitespace()
                    .skip(WINDOW_OVERLAP)
                    .map(ToString::to_string),
            );
        }
        assert_eq!(reconstructed.join(" "), words(1000));
    }

    #[test]
    fn test_context_from_description_line() {
        let f = write_md("---\ndescription: \"Actor isolation rules\"\n---\n\n## Rules\n\nBody.\n");
        let chunks = MarkdownChunker::default()
            .chunk_file(f.path(), "swift", &[])
            .unwrap();
        let rules = chunks.iter().find(|c| c.section == "Rules").unwrap();
        assert!(rules.contextual_text.contains("Actor isolation rules"));
        assert!(!rules.text.contains("Actor isolation rules"));
    }

    #[test]
    fn test_context_fallback() {
        let f = write_md("## Rules\n\nBody.\n");
        let chunks = MarkdownChunker::default()
            .chunk_file(f.path(), "swift", &[])
            .unwrap();
        assert!(chunks[0].contextual_text.starts_with("[swift | "));
        assert!(chunks[0].contextual_text.contains("swift — "));
    }

    #[test]
    fn test_ids_stable_across_runs() {
        let content = "## Section\n\nStable body text.\n";
        let f1 = write_md(content);
        let f2 = write_md(content);
        let chunker = MarkdownChunker::default();
        let a = chunker.chunk_file(f1.path(), "swift", &[]).unwrap();
        let b = chunker.chunk_file(f2.path(), "swift", &[]).unwrap();
        // Same skill/section/body, different file names -> ids differ;
        // identical inputs -> identical ids
        let a2 = chunker.chunk_file(f1.path(), "swift", &[]).unwrap();
        assert_eq!(a[0].id, a2[0].id);
        assert_ne!(a[0].id, b[0].id);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = MarkdownChunker::default()
            .chunk_file(Path::new("/nonexistent/skill.md"), "swift", &[])
            .unwrap_err();
        assert!(matches!(err, crate::error::RagError::Io(_)));
    }
}
