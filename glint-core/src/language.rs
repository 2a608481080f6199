//! A `Language` pairs the declarative [`crate::config::LanguageConfig`]
//! with the Rust-built grammar that implements it, and owns its rule
//! table outright rather than resolving named rules through process-wide
//! state (see the "No global rule registry" design note).

use std::sync::Arc;

use crate::config::LanguageConfig;
use crate::matcher::{Matcher, RuleTable};

/// A fully-assembled language: a root [`Matcher`] (conventionally built
/// with [`crate::root_rule`]), the named rules it and its sub-rules refer
/// to via [`crate::reference`], and the config describing how to select
/// it. Cheap to clone: everything behind an `Arc`.
#[derive(Clone)]
pub struct Language {
    config: Arc<LanguageConfig>,
    root: Arc<Matcher>,
    rules: Arc<RuleTable>,
}

impl Language {
    pub fn new(config: LanguageConfig, root: Matcher, rules: RuleTable) -> Self {
        Self {
            config: Arc::new(config),
            root: Arc::new(root),
            rules: Arc::new(rules),
        }
    }

    pub fn config(&self) -> &LanguageConfig {
        &self.config
    }

    pub fn id(&self) -> &str {
        &self.config.language_id
    }

    pub(crate) fn root(&self) -> &Matcher {
        &self.root
    }

    pub(crate) fn rules(&self) -> &RuleTable {
        &self.rules
    }
}

impl std::fmt::Debug for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Language")
            .field("language_id", &self.config.language_id)
            .field("scope", &self.config.scope)
            .finish_non_exhaustive()
    }
}
