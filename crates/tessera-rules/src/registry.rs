//! Name → rule resolution.

use std::sync::Arc;

use indexmap::IndexMap;
use tessera_core::rule::validate_rule;
use tessera_core::{Rule, RuleError, RuleProvider};

use crate::{Ant, LifeLike, WireWorld};

/// A catalogue of named rules that also understands Life-like rulestrings.
///
/// Names are matched case-insensitively. A source that is not a
/// registered name but starts with `B` or `S` is parsed as a rulestring.
pub struct RuleRegistry {
    rules: IndexMap<String, Arc<dyn Rule>>,
}

impl RuleRegistry {
    /// An empty registry that still accepts rulestrings.
    pub fn new() -> Self {
        Self {
            rules: IndexMap::new(),
        }
    }

    /// A registry holding `life`, `wireworld` and `ant`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        let builtins: [Arc<dyn Rule>; 3] = [
            Arc::new(LifeLike::conway()),
            Arc::new(WireWorld),
            Arc::new(Ant),
        ];
        for rule in builtins {
            registry.insert(rule.name().to_owned(), rule);
        }
        registry
    }

    /// Register `rule` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, rule: Arc<dyn Rule>) -> Result<(), RuleError> {
        validate_rule(rule.as_ref())?;
        self.insert(name.into(), rule);
        Ok(())
    }

    fn insert(&mut self, name: String, rule: Arc<dyn Rule>) {
        let name = name.to_ascii_lowercase();
        tracing::debug!(%name, states = rule.num_states(), "rule registered");
        self.rules.insert(name, rule);
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// Number of registered names.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True if no names are registered.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl RuleProvider for RuleRegistry {
    fn resolve(&self, source: &str) -> Result<Arc<dyn Rule>, RuleError> {
        let key = source.trim().to_ascii_lowercase();
        if let Some(rule) = self.rules.get(&key) {
            return Ok(Arc::clone(rule));
        }
        if key.starts_with('b') || key.starts_with('s') {
            let rule = LifeLike::from_rulestring(&key)?;
            return Ok(Arc::new(rule));
        }
        Err(RuleError::Unknown {
            source: source.to_owned(),
        })
    }
}
