//! Catalog
//!
//! A registry of named relations. Relations are handed out as shared
//! handles so a relation aliased between two variables observes the
//! same rows; since operators never mutate their inputs, aliasing is
//! safe for reads, and the handle's lock serializes the one mutating
//! entry point (bulk load).

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::types::Signature;
use crate::relation::Relation;

/// Shared handle to a registered relation.
pub type SharedRelation = Arc<RwLock<Relation>>;

/// Registry mapping relation names to relations.
#[derive(Clone, Default)]
pub struct Catalog {
    relations: Arc<RwLock<HashMap<String, SharedRelation>>>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self {
            relations: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create and register an empty relation built from the signature
    /// list.
    ///
    /// A name collision returns the existing relation unchanged; an
    /// empty signature list registers nothing and returns `None`.
    pub fn create_relation(
        &self,
        name: &str,
        signatures: &[Signature],
    ) -> Option<SharedRelation> {
        let mut relations = self.relations.write();
        if let Some(existing) = relations.get(name) {
            return Some(existing.clone());
        }
        if signatures.is_empty() {
            return None;
        }
        let relation = Arc::new(RwLock::new(Relation::new(name, signatures)));
        relations.insert(name.to_string(), relation.clone());
        Some(relation)
    }

    /// The relation registered under `name`, if any.
    pub fn get_relation(&self, name: &str) -> Option<SharedRelation> {
        self.relations.read().get(name).cloned()
    }
}
