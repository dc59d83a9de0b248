//! Minimal entity store over a directory of Markdown notes
//!
//! Every `.md` file is a Notebook named by its first level-1 heading (or its
//! file stem); every other heading in it is a Note. A heading ending in an
//! uppercase tag such as `Graph Theory (GT)` also gets an abbreviation.

use anyhow::{Context, Result};
use autolink_core::Entity;
use pulldown_cmark::{Event, HeadingLevel, Parser as CmarkParser, Tag as CmarkTag, TagEnd};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Instant;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

static ABBREVIATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*?)\s*\(([A-Z0-9]{2,8})\)\s*$").expect("abbreviation regex")
});

/// Entities found in a vault
#[derive(Debug, Clone)]
pub struct Vault {
    files: usize,
    entities: Vec<Entity>,
}

impl Vault {
    /// Scan `root` for Markdown notes
    pub fn load(root: &Path) -> Result<Self> {
        let start = Instant::now();
        if !root.is_dir() {
            anyhow::bail!("Vault path is not a directory: {}", root.display());
        }

        let mut files = 0;
        let mut entities = Vec::new();
        for entry in WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_excluded_dir(e.path()))
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || !is_markdown_file(path) {
                continue;
            }

            let markdown = match std::fs::read_to_string(path) {
                Ok(markdown) => markdown,
                Err(e) => {
                    warn!("Skipping unreadable note {}: {}", path.display(), e);
                    continue;
                }
            };
            let key = relative_key(root, path);
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(key.as_str());
            entities.extend(entities_from_note(&key, stem, &markdown));
            files += 1;
        }

        info!(
            "Scanned {} notes, {} entities in {:?}",
            files,
            entities.len(),
            start.elapsed()
        );
        Ok(Self { files, entities })
    }

    pub fn file_count(&self) -> usize {
        self.files
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn into_entities(self) -> Vec<Entity> {
        self.entities
    }
}

/// Read a note from disk
pub fn read_note(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read note: {}", path.display()))
}

/// Entities declared by one note: the Notebook itself, then one Note per
/// heading
pub fn entities_from_note(key: &str, stem: &str, markdown: &str) -> Vec<Entity> {
    let headings = headings(markdown);
    let title = headings
        .iter()
        .position(|(level, _)| *level == HeadingLevel::H1);

    let notebook_heading = title.map(|i| headings[i].1.as_str()).unwrap_or(stem);
    let mut entities = vec![named_entity(Entity::notebook(key, ""), notebook_heading)];

    for (i, (_, text)) in headings.iter().enumerate() {
        if Some(i) == title || text.is_empty() {
            continue;
        }
        let note_key = format!("{}#{}", key, slugify(text));
        entities.push(named_entity(Entity::note(note_key, ""), text));
    }

    debug!("{} declares {} entities", key, entities.len());
    entities
}

fn named_entity(mut entity: Entity, heading: &str) -> Entity {
    let (name, abbreviation) = split_abbreviation(heading);
    entity.name = name;
    match abbreviation {
        Some(abbreviation) => entity.with_abbreviation(abbreviation),
        None => entity,
    }
}

/// Split `Name (ABBR)` into its parts
pub fn split_abbreviation(heading: &str) -> (String, Option<String>) {
    match ABBREVIATION_REGEX.captures(heading) {
        Some(caps) if !caps[1].is_empty() => (caps[1].to_string(), Some(caps[2].to_string())),
        _ => (heading.trim().to_string(), None),
    }
}

fn headings(markdown: &str) -> Vec<(HeadingLevel, String)> {
    let mut out = Vec::new();
    let mut current: Option<(HeadingLevel, String)> = None;

    for event in CmarkParser::new(markdown) {
        match event {
            Event::Start(CmarkTag::Heading { level, .. }) => {
                current = Some((level, String::new()));
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, text)) = current.take() {
                    out.push((level, text.trim().to_string()));
                }
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, buffer)) = current.as_mut() {
                    buffer.push_str(&text);
                }
            }
            _ => {}
        }
    }
    out
}

/// Anchor slug of a heading: lowercase alphanumerics joined by dashes
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if (c.is_whitespace() || c == '-' || c == '_') && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

fn relative_key(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Check if a directory should be excluded from scanning
fn is_excluded_dir(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| {
            name == ".git" || name == ".obsidian" || name == "node_modules" || name == ".trash"
        })
        .unwrap_or(false)
}

/// Check if a path is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("md")
}
