// src/services/rules/mod.rs

//! Rule registry and rule chains.
//!
//! A rule kind is registered under its configuration name together with a
//! constructor that validates the rule's settings and returns a ready-to-run
//! [`Rule`]. Feeds compile their configured filters into a [`RuleChain`]
//! once, before any feed is fetched, so a typo in the configuration stops the
//! run instead of silently passing every episode.

mod regex_exclude;
mod shorter_than;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{EpisodeRecord, FeedConfig, RuleConfig, RuleSpec};

pub use regex_exclude::RegexExclude;
pub use shorter_than::{ShorterThan, parse_duration};

/// Decision of one rule about one episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Keep,
    Discard,
}

impl Verdict {
    pub fn is_keep(self) -> bool {
        self == Verdict::Keep
    }
}

/// A configured predicate over episode records.
pub trait Rule: Send + Sync {
    /// Registered kind name, used in logs and reports.
    fn kind(&self) -> &str;

    /// Decide whether the episode stays in the feed.
    fn evaluate(&self, record: &EpisodeRecord) -> Verdict;
}

/// Builds a rule from its configuration.
pub type RuleConstructor = Arc<dyn Fn(&RuleConfig) -> Result<Box<dyn Rule>> + Send + Sync>;

/// Mapping from rule kind to constructor.
#[derive(Clone)]
pub struct RuleRegistry {
    constructors: BTreeMap<String, RuleConstructor>,
}

impl RuleRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }

    /// A registry with `shorter_than` and `regex_exclude`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(ShorterThan::KIND, ShorterThan::build);
        registry.register(RegexExclude::KIND, RegexExclude::build);
        registry
    }

    /// Register a rule kind, replacing any previous constructor.
    pub fn register<F>(&mut self, kind: impl Into<String>, constructor: F)
    where
        F: Fn(&RuleConfig) -> Result<Box<dyn Rule>> + Send + Sync + 'static,
    {
        self.constructors.insert(kind.into(), Arc::new(constructor));
    }

    /// Registered kind names, sorted.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    /// Build one rule for the named feed.
    pub fn build(&self, feed: &str, spec: &RuleSpec) -> Result<Box<dyn Rule>> {
        let constructor = self.constructors.get(&spec.kind).ok_or_else(|| {
            AppError::rule(
                feed,
                &spec.kind,
                format!(
                    "unknown rule kind (known: {})",
                    self.kinds().collect::<Vec<_>>().join(", ")
                ),
            )
        })?;

        constructor(&spec.config).map_err(|e| match e {
            AppError::Config(message) => AppError::rule(feed, &spec.kind, message),
            other => other,
        })
    }

    /// Compile a feed's filters, in configured order.
    pub fn build_chain(&self, feed: &FeedConfig) -> Result<RuleChain> {
        let rules = feed
            .filters
            .iter()
            .map(|spec| self.build(&feed.name, spec))
            .collect::<Result<Vec<_>>>()?;

        Ok(RuleChain {
            feed: feed.name.clone(),
            rules,
        })
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// The compiled, ordered rules of one feed.
pub struct RuleChain {
    feed: String,
    rules: Vec<Box<dyn Rule>>,
}

impl RuleChain {
    pub fn new(feed: impl Into<String>, rules: Vec<Box<dyn Rule>>) -> Self {
        Self {
            feed: feed.into(),
            rules,
        }
    }

    pub fn feed(&self) -> &str {
        &self.feed
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Kind names of the chain's rules, in order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.kind())
    }

    /// Evaluate rules in order and return the kind of the first rule that
    /// discards the episode. Later rules are not evaluated.
    pub fn first_discard(&self, record: &EpisodeRecord) -> Option<&str> {
        for rule in &self.rules {
            log::debug!(
                "[{}] Running {} on '{}'",
                self.feed,
                rule.kind(),
                record.label()
            );
            if rule.evaluate(record) == Verdict::Discard {
                return Some(rule.kind());
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct Fixed {
        verdict: Verdict,
        calls: Arc<AtomicUsize>,
    }

    impl Rule for Fixed {
        fn kind(&self) -> &str {
            "fixed"
        }

        fn evaluate(&self, _record: &EpisodeRecord) -> Verdict {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.verdict
        }
    }

    fn feed(filters: Vec<RuleSpec>) -> FeedConfig {
        FeedConfig {
            name: "Test Feed".into(),
            feed_url: "https://example.com/feed".into(),
            file_name: "out.xml".into(),
            filters,
        }
    }

    #[test]
    fn test_unknown_kind_is_rule_error() {
        let registry = RuleRegistry::with_builtins();
        let spec = RuleSpec::new("shorter_then", RuleConfig::new());
        let err = registry.build_chain(&feed(vec![spec])).err().unwrap();

        match &err {
            AppError::Rule { feed, kind, message } => {
                assert_eq!(feed, "Test Feed");
                assert_eq!(kind, "shorter_then");
                assert!(message.contains("regex_exclude"));
                assert!(message.contains("shorter_than"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.is_configuration());
    }

    #[test]
    fn test_constructor_errors_carry_feed_and_kind() {
        let registry = RuleRegistry::with_builtins();
        let spec = RuleSpec::new("regex_exclude", RuleConfig::new().with("field", "title"));
        let err = registry.build("Test Feed", &spec).err().unwrap();
        assert!(matches!(err, AppError::Rule { ref kind, .. } if kind == "regex_exclude"));
    }

    #[test]
    fn test_builtin_kinds() {
        let registry = RuleRegistry::default();
        assert_eq!(
            registry.kinds().collect::<Vec<_>>(),
            vec!["regex_exclude", "shorter_than"]
        );
    }

    #[test]
    fn test_custom_rule_registration() {
        let mut registry = RuleRegistry::new();
        registry.register("explicit_only", |config: &RuleConfig| {
            let flag = config.get("tag").map(|v| v.as_text()).unwrap_or_default();
            Ok(Box::new(RegexExclude::new("explicit", &format!("^{flag}$"), false)?) as Box<dyn Rule>)
        });

        let spec = RuleSpec::new("explicit_only", RuleConfig::new().with("tag", "yes"));
        let chain = registry.build_chain(&feed(vec![spec])).unwrap();
        let explicit: EpisodeRecord = [("explicit", "yes")].into_iter().collect();
        let clean: EpisodeRecord = [("explicit", "no")].into_iter().collect();
        assert_eq!(chain.first_discard(&explicit), Some("regex_exclude"));
        assert_eq!(chain.first_discard(&clean), None);
    }

    #[test]
    fn test_chain_short_circuits_on_first_discard() {
        let calls: Vec<Arc<AtomicUsize>> = (0..3).map(|_| Arc::new(AtomicUsize::new(0))).collect();
        let verdicts = [Verdict::Keep, Verdict::Discard, Verdict::Discard];
        let rules: Vec<Box<dyn Rule>> = verdicts
            .iter()
            .zip(&calls)
            .map(|(verdict, calls)| {
                Box::new(Fixed {
                    verdict: *verdict,
                    calls: Arc::clone(calls),
                }) as Box<dyn Rule>
            })
            .collect();
        let chain = RuleChain::new("Test Feed", rules);

        assert_eq!(chain.first_discard(&EpisodeRecord::new()), Some("fixed"));
        assert_eq!(calls[0].load(Ordering::SeqCst), 1);
        assert_eq!(calls[1].load(Ordering::SeqCst), 1);
        assert_eq!(calls[2].load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_empty_chain_keeps_everything() {
        let chain = RuleRegistry::default().build_chain(&feed(vec![])).unwrap();
        assert!(chain.is_empty());
        assert_eq!(chain.first_discard(&EpisodeRecord::new()), None);
    }

    #[test]
    fn test_chain_preserves_configured_order() {
        let registry = RuleRegistry::default();
        let chain = registry
            .build_chain(&feed(vec![
                RuleSpec::new(
                    "regex_exclude",
                    RuleConfig::new().with("field", "title").with("pattern", "Trailer"),
                ),
                RuleSpec::new("shorter_than", RuleConfig::new().with("minutes", 10)),
            ]))
            .unwrap();
        assert_eq!(
            chain.kinds().collect::<Vec<_>>(),
            vec!["regex_exclude", "shorter_than"]
        );

        let record: EpisodeRecord = [("title", "Trailer"), ("duration", "30")].into_iter().collect();
        assert_eq!(chain.first_discard(&record), Some("regex_exclude"));
    }
}
