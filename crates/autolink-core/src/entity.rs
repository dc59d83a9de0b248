//! Entities that can be linked to
//!
//! The knowledge store owns Notebooks, Notes and Tags; the autolinker only
//! reads their names, abbreviations and keys. [`EntityCatalog`] is the
//! read-only snapshot the service indexes and resolves link targets against.

use serde::{Deserialize, Serialize};

/// Type of a knowledge store entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Notebook,
    Note,
    Tag,
}

impl EntityKind {
    /// Tags are carried in the catalog but never become link targets
    pub fn is_autolinkable(&self) -> bool {
        matches!(self, EntityKind::Notebook | EntityKind::Note)
    }
}

/// A named entity with a unique key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub key: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<String>,
    pub kind: EntityKind,
}

impl Entity {
    pub fn new(key: impl Into<String>, name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            abbreviation: None,
            kind,
        }
    }

    pub fn notebook(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(key, name, EntityKind::Notebook)
    }

    pub fn note(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(key, name, EntityKind::Note)
    }

    pub fn tag(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(key, name, EntityKind::Tag)
    }

    /// Set the abbreviation; empty strings clear it
    pub fn with_abbreviation(mut self, abbreviation: impl Into<String>) -> Self {
        let abbreviation = abbreviation.into();
        self.abbreviation = (!abbreviation.is_empty()).then_some(abbreviation);
        self
    }

    /// Non-empty abbreviation, if any
    pub fn abbreviation(&self) -> Option<&str> {
        self.abbreviation.as_deref().filter(|a| !a.is_empty())
    }

    /// Whether `word` refers to this entity by name, lowercase-first name or
    /// abbreviation
    pub fn answers_to(&self, word: &str) -> bool {
        if word.is_empty() {
            return false;
        }
        self.name == word
            || (!self.name.is_empty() && lowercase_first(&self.name) == word)
            || self.abbreviation() == Some(word)
    }
}

/// Fold the first character of `s` to lowercase, leaving the rest untouched.
///
/// Unicode aware: a first character may lowercase to several characters.
pub fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Snapshot of the entity collection
#[derive(Debug, Clone, Default)]
pub struct EntityCatalog {
    entities: Vec<Entity>,
}

impl EntityCatalog {
    pub fn new(entities: Vec<Entity>) -> Self {
        Self { entities }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn get(&self, key: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.key == key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.key == key)
    }

    /// Notebooks first, then Notes, each in catalog order
    pub fn autolinkable(&self) -> impl Iterator<Item = &Entity> {
        let notebooks = self
            .entities
            .iter()
            .filter(|e| e.kind == EntityKind::Notebook);
        let notes = self.entities.iter().filter(|e| e.kind == EntityKind::Note);
        notebooks.chain(notes)
    }

    /// Every linkable entity answering to `name`.
    ///
    /// Several entities may share a name; callers decide which one to open.
    pub fn resolve(&self, name: &str) -> Vec<&Entity> {
        self.autolinkable().filter(|e| e.answers_to(name)).collect()
    }

    /// Resolve a link URL produced by the document autolinker
    pub fn resolve_link<'a>(&'a self, url: &str, prefix: &str) -> Option<Vec<&'a Entity>> {
        url.strip_prefix(prefix).map(|name| self.resolve(name))
    }
}

impl FromIterator<Entity> for EntityCatalog {
    fn from_iter<I: IntoIterator<Item = Entity>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> EntityCatalog {
        EntityCatalog::new(vec![
            Entity::note("n1", "Graph Theory").with_abbreviation("GT"),
            Entity::tag("t1", "Graph Theory"),
            Entity::notebook("b1", "Mathematics"),
            Entity::note("n2", "Mathematics"),
        ])
    }

    #[test]
    fn test_lowercase_first() {
        assert_eq!(lowercase_first("Rust"), "rust");
        assert_eq!(lowercase_first("RUST"), "rUST");
        assert_eq!(lowercase_first("émile"), "émile");
        assert_eq!(lowercase_first("Ĳssel"), "ĳssel");
        assert_eq!(lowercase_first(""), "");
        assert_eq!(lowercase_first("1st"), "1st");
    }

    #[test]
    fn test_empty_abbreviation_is_none() {
        let entity = Entity::note("k", "Name").with_abbreviation("");
        assert_eq!(entity.abbreviation(), None);
    }

    #[test]
    fn test_answers_to() {
        let entity = Entity::note("k", "Graph Theory").with_abbreviation("GT");
        assert!(entity.answers_to("Graph Theory"));
        assert!(entity.answers_to("graph Theory"));
        assert!(entity.answers_to("GT"));
        assert!(!entity.answers_to("graph theory"));
        assert!(!entity.answers_to(""));
    }

    #[test]
    fn test_autolinkable_order_skips_tags() {
        let catalog = catalog();
        let keys: Vec<_> = catalog.autolinkable().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["b1", "n1", "n2"]);
    }

    #[test]
    fn test_resolve_cross_road() {
        let catalog = catalog();
        let hits: Vec<_> = catalog
            .resolve("Mathematics")
            .iter()
            .map(|e| e.key.as_str())
            .collect();
        assert_eq!(hits, vec!["b1", "n2"]);
    }

    #[test]
    fn test_resolve_link() {
        let catalog = catalog();
        let hits = catalog
            .resolve_link("autolink://entity/GT", "autolink://entity/")
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].key, "n1");

        assert!(catalog
            .resolve_link("https://example.com", "autolink://entity/")
            .is_none());
    }

    #[test]
    fn test_entity_json() {
        let entity = Entity::notebook("b", "Inbox");
        let json = serde_json::to_string(&entity).unwrap();
        assert_eq!(json, r#"{"key":"b","name":"Inbox","kind":"notebook"}"#);
    }
}
