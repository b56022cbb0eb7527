//! Atomic publication of rule engines.
//!
//! Readers take a snapshot and keep it for the whole of a resolution; a
//! reload builds and validates a complete engine first, then swaps the
//! pointer. Nobody ever observes a half-loaded rule set.

use arc_swap::ArcSwap;
use rulemodel_types::{Context, TargetKey, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use crate::{RuleEngine, RuleResult};

/// Holds the current [`RuleEngine`] snapshot.
pub struct RuleStore {
    current: ArcSwap<RuleEngine>,
    generation: AtomicU64,
}

impl RuleStore {
    pub fn new(engine: RuleEngine) -> Self {
        Self {
            current: ArcSwap::from_pointee(engine),
            generation: AtomicU64::new(0),
        }
    }

    /// The engine currently published.
    pub fn snapshot(&self) -> Arc<RuleEngine> {
        self.current.load_full()
    }

    /// Number of successful swaps since construction.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Publishes `engine`, returning the one it replaces.
    pub fn replace(&self, engine: RuleEngine) -> Arc<RuleEngine> {
        self.swap(engine).0
    }

    /// Publishes `engine`, returning the generation this swap produced.
    pub fn publish(&self, engine: RuleEngine) -> u64 {
        self.swap(engine).1
    }

    /// Builds a new engine with `build` and publishes it only on success.
    /// On error the current snapshot stays in place.
    pub fn try_replace_with<F, E>(&self, build: F) -> Result<Arc<RuleEngine>, E>
    where
        F: FnOnce() -> Result<RuleEngine, E>,
    {
        let engine = build()?;
        Ok(self.replace(engine))
    }

    /// Like [`try_replace_with`](Self::try_replace_with), returning the
    /// generation of the published snapshot.
    pub fn try_publish_with<F, E>(&self, build: F) -> Result<u64, E>
    where
        F: FnOnce() -> Result<RuleEngine, E>,
    {
        let engine = build()?;
        Ok(self.publish(engine))
    }

    fn swap(&self, engine: RuleEngine) -> (Arc<RuleEngine>, u64) {
        let rules = engine.len();
        let previous = self.current.swap(Arc::new(engine));
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        debug!(
            "Published rule snapshot generation {} ({} rules, replaced {})",
            generation,
            rules,
            previous.len()
        );
        (previous, generation)
    }

    pub fn resolve(&self, key: &str, ctx: &Context) -> RuleResult<Option<Value>> {
        self.current.load().resolve(key, ctx)
    }

    pub fn resolve_key(&self, key: TargetKey, ctx: &Context) -> Option<Value> {
        self.current.load().resolve_key(key, ctx)
    }

    pub fn resolve_all(&self, ctx: &Context) -> BTreeMap<TargetKey, Value> {
        self.current.load().resolve_all(ctx)
    }
}

impl Default for RuleStore {
    fn default() -> Self {
        Self::new(RuleEngine::empty())
    }
}

impl std::fmt::Debug for RuleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleStore")
            .field("rules", &self.current.load().len())
            .field("generation", &self.generation())
            .finish()
    }
}
