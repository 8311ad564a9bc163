//! Skill discovery and SKILL.md manifests
//!
//! A skill is a directory of markdown documents; the directory name is the
//! skill identifier. An optional `SKILL.md` carries YAML front matter with
//! `description` and `domains`. Absent front matter, the skill name is used
//! as the sole domain and the first non-empty non-heading line as the
//! description.

use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;
use walkdir::WalkDir;

/// YAML front matter block at the start of a file
static FRONT_MATTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\A---\n(.+?)\n---").expect("valid front matter pattern"));

/// Maximum length of an extracted description
const DESCRIPTION_MAX: usize = 200;

#[derive(Debug, Default, Deserialize)]
struct FrontMatter {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    domains: Option<Vec<String>>,
}

/// Parsed per-skill metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillManifest {
    /// Skill identifier (the directory name)
    pub name: String,
    /// One-line description of the skill
    pub description: String,
    /// Domain tags applied to every chunk of the skill
    pub domains: Vec<String>,
}

impl SkillManifest {
    /// Load the manifest for a skill directory
    ///
    /// Reads `SKILL.md` front matter when present; a missing file or
    /// malformed front matter falls back silently to the directory name.
    #[must_use]
    pub fn load(dir: &Path) -> Self {
        let name = dir
            .file_name()
            .map_or_else(String::new, |n| n.to_string_lossy().into_owned());

        let skill_md = dir.join("SKILL.md");
        let text = std::fs::read(&skill_md)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .unwrap_or_default();

        // The fallback prose scan must not pick lines out of an unparseable
        // front matter block, so the block is stripped either way.
        let body = FRONT_MATTER.replace(&text, "");
        let front = parse_front_matter(&text);
        let domains = front
            .domains
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| vec![name.clone()]);
        let description = front
            .description
            .map(|d| truncate(&d))
            .or_else(|| first_prose_line(&body))
            .unwrap_or_else(|| name.clone());

        Self {
            name,
            description,
            domains,
        }
    }
}

fn parse_front_matter(text: &str) -> FrontMatter {
    FRONT_MATTER
        .captures(text)
        .and_then(|caps| serde_yaml::from_str(&caps[1]).ok())
        .unwrap_or_default()
}

/// First non-empty line that is neither a heading nor a front matter delimiter
fn first_prose_line(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with("---"))
        .map(truncate)
}

fn truncate(s: &str) -> String {
    s.chars().take(DESCRIPTION_MAX).collect()
}

/// Discover skill directories under the given roots
///
/// Returns the immediate children of every existing root, skipping hidden
/// directories. Roots that do not exist are ignored.
#[must_use]
pub fn discover_skills(roots: &[PathBuf]) -> Vec<PathBuf> {
    let mut skills = Vec::new();
    for root in roots {
        let Ok(entries) = std::fs::read_dir(root) else {
            continue;
        };
        let mut children: Vec<PathBuf> = entries
            .filter_map(std::result::Result::ok)
            .map(|e| e.path())
            .filter(|p| {
                p.is_dir()
                    && !p
                        .file_name()
                        .is_some_and(|n| n.to_string_lossy().starts_with('.'))
            })
            .collect();
        children.sort();
        skills.extend(children);
    }
    debug!("discovered {} skill directories", skills.len());
    skills
}

/// Recursively list the markdown files of a skill directory, excluding dotfiles
#[must_use]
pub fn markdown_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| {
            !entry.file_type().is_dir()
                && entry.path().extension().is_some_and(|ext| ext == "md")
                && !entry.file_name().to_string_lossy().starts_with('.')
        })
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}
