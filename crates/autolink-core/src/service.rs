//! Autolinking service
//!
//! Owns the entity catalog and everything derived from it: the name index,
//! the candidate list and the configured autolinker. Index mutation takes
//! `&mut self` and autolinking takes `&self`, so a caller sharing the service
//! across threads has to put it behind a lock that serializes the two.

use autolink_config::{AutolinkConfig, EngineKind};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::autolinker::{AutolinkContext, AutolinkOptions, Autolinked, Autolinker, Deadline};
use crate::candidates::CandidateList;
use crate::document_autolinker::DocumentAutolinker;
use crate::entity::{Entity, EntityCatalog};
use crate::error::{AutolinkError, AutolinkResult};
use crate::line_autolinker::LineAutolinker;
use crate::name_index::NameIndex;

/// Counters describing the current index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexStats {
    pub entities: usize,
    pub linkable: usize,
    pub indexed_words: usize,
    pub candidates: usize,
    pub generation: u64,
}

/// Entry point for autolinking note bodies
pub struct AutolinkService {
    config: AutolinkConfig,
    options: AutolinkOptions,
    catalog: EntityCatalog,
    index: NameIndex,
    candidates: CandidateList,
    engine: Box<dyn Autolinker + Send + Sync>,
}

impl std::fmt::Debug for AutolinkService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutolinkService")
            .field("engine", &self.engine.name())
            .field("entities", &self.catalog.len())
            .field("generation", &self.index.generation())
            .finish()
    }
}

impl AutolinkService {
    /// Create a service with an empty catalog
    pub fn new(config: AutolinkConfig) -> AutolinkResult<Self> {
        config.validate()?;

        let engine: Box<dyn Autolinker + Send + Sync> = match config.engine {
            EngineKind::Document => Box::new(DocumentAutolinker::new()),
            EngineKind::Line => Box::new(LineAutolinker::new()),
        };
        let options = AutolinkOptions {
            case_insensitive: config.case_insensitive,
            link_prefix: config.link_prefix.clone(),
        };

        Ok(Self {
            index: NameIndex::new(config.denylist.iter().cloned()),
            options,
            catalog: EntityCatalog::default(),
            candidates: CandidateList::default(),
            engine,
            config,
        })
    }

    pub fn config(&self) -> &AutolinkConfig {
        &self.config
    }

    pub fn catalog(&self) -> &EntityCatalog {
        &self.catalog
    }

    pub fn index(&self) -> &NameIndex {
        &self.index
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    /// Replace the catalog and rebuild every derived structure
    pub fn rebuild(&mut self, entities: Vec<Entity>) {
        self.catalog = EntityCatalog::new(entities);
        self.reindex();
    }

    fn reindex(&mut self) {
        let start = Instant::now();
        self.index.rebuild(self.catalog.autolinkable());
        self.candidates = self.build_candidates();
        info!(
            "Autolink index generation {}: {} entities, {} words, {} candidates in {:?}",
            self.index.generation(),
            self.catalog.len(),
            self.index.word_count(),
            self.candidates.len(),
            start.elapsed()
        );
    }

    fn build_candidates(&self) -> CandidateList {
        CandidateList::build(self.catalog.autolinkable(), |alias| {
            self.config.is_denied(alias)
        })
    }

    /// Apply a rename notification to the name index only
    pub fn on_rename(&mut self, old_name: &str, new_name: &str) {
        self.index.update_on_rename(old_name, new_name);
    }

    /// Rename an entity in the catalog and propagate to derived structures.
    ///
    /// Returns false when no entity has `key`.
    pub fn rename_entity(&mut self, key: &str, new_name: &str) -> bool {
        let Some(entity) = self.catalog.get_mut(key) else {
            debug!("Rename of unknown entity {}", key);
            return false;
        };
        let old_name = std::mem::replace(&mut entity.name, new_name.to_string());
        let linkable = entity.kind.is_autolinkable();

        if linkable {
            self.on_rename(&old_name, new_name);
            self.candidates = self.build_candidates();
        }
        true
    }

    /// Autolink `body`, returning it unchanged when autolinking is disabled
    /// or fails
    pub fn autolink(&self, body: &str) -> String {
        if !self.config.enabled || body.is_empty() {
            return body.to_string();
        }
        match self.autolink_detailed(body) {
            Ok(result) => result.text,
            Err(e) => {
                warn!("Autolinking failed, keeping note body as is: {}", e);
                body.to_string()
            }
        }
    }

    /// Autolink `body` and report what happened
    pub fn autolink_detailed(&self, body: &str) -> AutolinkResult<Autolinked> {
        if !self.config.enabled || body.is_empty() {
            return Ok(Autolinked::unchanged(body));
        }

        let ctx = AutolinkContext {
            index: &self.index,
            candidates: &self.candidates,
            options: &self.options,
            deadline: Deadline::from_budget(self.config.deadline()),
        };
        let result = self.engine.process(body, &ctx)?;
        debug!(
            "{} autolinker produced {} links{}",
            self.engine.name(),
            result.links,
            if result.truncated { " (truncated)" } else { "" }
        );
        Ok(result)
    }

    /// Entities a link produced by this service points at.
    ///
    /// Document-path URLs carry the configured prefix and an entity name;
    /// line-path links carry the entity key directly.
    pub fn resolve_link(&self, url: &str) -> AutolinkResult<Vec<&Entity>> {
        if let Some(entities) = self.catalog.resolve_link(url, &self.config.link_prefix) {
            return Ok(entities);
        }
        match self.catalog.get(url) {
            Some(entity) => Ok(vec![entity]),
            None => Err(AutolinkError::invalid_link_target(url)),
        }
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            entities: self.catalog.len(),
            linkable: self.catalog.autolinkable().count(),
            indexed_words: self.index.word_count(),
            candidates: self.candidates.len(),
            generation: self.index.generation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(config: AutolinkConfig) -> AutolinkService {
        let mut service = AutolinkService::new(config).unwrap();
        service.rebuild(vec![
            Entity::notebook("rust.md", "Rust").with_abbreviation("RS"),
            Entity::note("rust.md#ownership", "Ownership"),
            Entity::tag("t", "Draft"),
        ]);
        service
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = AutolinkConfig {
            link_prefix: String::new(),
            ..Default::default()
        };
        assert!(matches!(
            AutolinkService::new(config),
            Err(AutolinkError::Config(_))
        ));
    }

    #[test]
    fn test_document_engine_by_default() {
        let service = service(AutolinkConfig::default());
        assert_eq!(service.engine_name(), "document");
        assert_eq!(
            service.autolink("Learning Rust.\n"),
            "Learning [Rust](autolink://entity/Rust).\n"
        );
    }

    #[test]
    fn test_line_engine() {
        let service = service(AutolinkConfig {
            engine: EngineKind::Line,
            ..Default::default()
        });
        assert_eq!(service.engine_name(), "line");
        assert_eq!(
            service.autolink("Ownership in RS"),
            "[Ownership](rust.md#ownership) in [RS](rust.md)"
        );
    }

    #[test]
    fn test_line_engine_honors_configured_denylist() {
        let service = service(AutolinkConfig {
            engine: EngineKind::Line,
            denylist: vec!["RS".to_string()],
            ..Default::default()
        });
        assert_eq!(service.stats().candidates, 2);
        assert_eq!(
            service.autolink("Rust is RS"),
            "[Rust](rust.md) is RS"
        );
    }

    #[test]
    fn test_disabled_returns_input() {
        let service = service(AutolinkConfig {
            enabled: false,
            ..Default::default()
        });
        assert_eq!(service.autolink("Rust"), "Rust");
        let result = service.autolink_detailed("Rust").unwrap();
        assert_eq!(result.links, 0);
    }

    #[test]
    fn test_empty_body() {
        let service = service(AutolinkConfig::default());
        assert_eq!(service.autolink(""), "");
    }

    #[test]
    fn test_rename_entity() {
        let mut service = service(AutolinkConfig::default());
        assert!(service.rename_entity("rust.md#ownership", "Borrowing"));
        assert_eq!(service.autolink("Ownership\n"), "Ownership\n");
        assert_eq!(
            service.autolink("Borrowing\n"),
            "[Borrowing](autolink://entity/Borrowing)\n"
        );
        assert!(!service.rename_entity("missing", "x"));
    }

    #[test]
    fn test_rename_entity_updates_candidates() {
        let mut service = service(AutolinkConfig {
            engine: EngineKind::Line,
            ..Default::default()
        });
        service.rename_entity("rust.md#ownership", "Borrowing");
        assert_eq!(service.autolink("Borrowing"), "[Borrowing](rust.md#ownership)");
    }

    #[test]
    fn test_resolve_link() {
        let service = service(AutolinkConfig::default());
        let hits = service.resolve_link("autolink://entity/rust").unwrap();
        assert_eq!(hits[0].key, "rust.md");

        let hits = service.resolve_link("rust.md#ownership").unwrap();
        assert_eq!(hits[0].name, "Ownership");

        assert!(matches!(
            service.resolve_link("https://example.com"),
            Err(AutolinkError::InvalidLinkTarget(_))
        ));
    }

    #[test]
    fn test_stats() {
        let service = service(AutolinkConfig::default());
        let stats = service.stats();
        assert_eq!(stats.entities, 3);
        assert_eq!(stats.linkable, 2);
        // Rust, rust, RS, Ownership, ownership
        assert_eq!(stats.indexed_words, 5);
        assert_eq!(stats.candidates, 3);
        assert_eq!(stats.generation, 1);
    }
}
