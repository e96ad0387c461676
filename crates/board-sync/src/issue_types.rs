//! Issue type classification from conventional-commit style titles.
//!
//! Titles such as `feat(api): add endpoint` carry a prefix that maps onto
//! one of the organization's issue types. [`classify_title`] does the
//! mapping; [`TypeMapping`] additionally remembers which issue-type node id
//! belongs to each label once those ids have been discovered.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::{debug, warn};

/// Fixed prefix vocabulary, lowercase prefix to type label.
pub const PREFIX_TYPES: &[(&str, &str)] = &[
    ("feat", "Feature"),
    ("bug", "Bug"),
    ("docs", "Docs"),
    ("blog", "Blog"),
    ("interrupt", "Interrupt"),
    ("spike", "Spike"),
    ("chore", "Chore"),
];

/// Map a title to its type label.
///
/// The prefix is everything before the first `:`, cut at the first `(` so
/// that scopes like `feat(api)` are ignored. Matching is case-insensitive
/// and tolerates surrounding whitespace.
#[must_use]
pub fn classify_title(title: &str) -> Option<&'static str> {
    let (prefix, _) = title.split_once(':')?;
    let prefix = prefix.split_once('(').map_or(prefix, |(head, _)| head);
    let prefix = prefix.trim().to_lowercase();

    PREFIX_TYPES
        .iter()
        .find(|(candidate, _)| *candidate == prefix)
        .map(|(_, label)| *label)
}

/// Type labels and the issue-type ids they resolve to.
#[derive(Debug, Default)]
pub struct TypeMapping {
    type_to_id: RwLock<HashMap<String, String>>,
}

impl TypeMapping {
    /// Create a mapping with no known type ids.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify a title; see [`classify_title`].
    #[must_use]
    pub fn type_from_title(&self, title: &str) -> Option<&'static str> {
        classify_title(title)
    }

    /// Record the id for a type label. Later writes replace earlier ones.
    pub fn set_type_id(&self, type_name: impl Into<String>, type_id: impl Into<String>) {
        self.type_to_id
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(type_name.into(), type_id.into());
    }

    /// Look up the id for a type label.
    #[must_use]
    pub fn type_id(&self, type_name: &str) -> Option<String> {
        self.type_to_id
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(type_name)
            .cloned()
    }

    /// Number of labels with a known id.
    #[must_use]
    pub fn len(&self) -> usize {
        self.type_to_id
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no type ids are known yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fill in type ids from a lowercase-name to id map.
    ///
    /// Only labels from the prefix vocabulary are taken. Returns how many
    /// labels were resolved.
    pub fn load_type_ids(&self, ids_by_lowercase_name: &HashMap<String, String>) -> usize {
        let mut loaded = 0;
        for (_, label) in PREFIX_TYPES {
            match ids_by_lowercase_name.get(&label.to_lowercase()) {
                Some(id) => {
                    debug!(type_name = %label, type_id = %id, "Resolved issue type");
                    self.set_type_id(*label, id.clone());
                    loaded += 1;
                }
                None => {
                    warn!(type_name = %label, "Organization has no issue type for label");
                }
            }
        }
        loaded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_classified(cases: &[(&str, &str)]) {
        for (title, expected) in cases {
            assert_eq!(
                classify_title(title),
                Some(*expected),
                "expected {expected} for title {title:?}"
            );
        }
    }

    fn assert_unclassified(titles: &[&str]) {
        for title in titles {
            assert_eq!(classify_title(title), None, "unexpected match for {title:?}");
        }
    }

    #[test]
    fn test_basic_prefixes() {
        assert_classified(&[
            ("feat: add new feature", "Feature"),
            ("bug: fix issue", "Bug"),
            ("docs: update documentation", "Docs"),
            ("blog: write blog post", "Blog"),
            ("interrupt: urgent fix", "Interrupt"),
            ("spike: investigate solution", "Spike"),
            ("chore: maintenance task", "Chore"),
        ]);
    }

    #[test]
    fn test_scoped_prefixes() {
        assert_classified(&[
            ("feat(ske-operator): add new feature", "Feature"),
            ("bug(frontend): fix issue", "Bug"),
            ("docs(user-guide): update documentation", "Docs"),
            ("chore(deps): maintenance task", "Chore"),
            ("feat(api)(v2): add new feature", "Feature"),
            ("bug(frontend)(ui): fix issue", "Bug"),
        ]);
    }

    #[test]
    fn test_case_insensitive() {
        assert_classified(&[
            ("FEAT: add new feature", "Feature"),
            ("Feat: add new feature", "Feature"),
            ("BUG: fix issue", "Bug"),
            ("FEAT(API): add new feature", "Feature"),
            ("Feat(Api): add new feature", "Feature"),
        ]);
    }

    #[test]
    fn test_whitespace_tolerated() {
        assert_classified(&[
            (" feat: add new feature", "Feature"),
            ("feat : add new feature", "Feature"),
            (" feat : add new feature", "Feature"),
            (" feat(api): add new feature", "Feature"),
            ("feat(api) : add new feature", "Feature"),
            ("feat (api) : add new feature", "Feature"),
            ("\tspike\t:research", "Spike"),
        ]);
    }

    #[test]
    fn test_missing_colon() {
        assert_unclassified(&[
            "add new feature",
            "feat add new feature",
            "bug fix issue",
            "random change",
        ]);
    }

    #[test]
    fn test_unknown_prefixes() {
        assert_unclassified(&[
            "invalid: no match",
            "unknown(scope): no match",
            "random(scope): no match",
            "features: close but not exact",
            "(feat): scope only",
        ]);
    }

    #[test]
    fn test_empty_and_whitespace_titles() {
        assert_unclassified(&["", " ", "  ", "\t", "\n", ":", " : "]);
    }

    #[test]
    fn test_type_ids_start_empty() {
        let mapping = TypeMapping::new();
        assert!(mapping.is_empty());
        assert_eq!(mapping.type_id("Feature"), None);
    }

    #[test]
    fn test_set_and_get_type_ids() {
        let mapping = TypeMapping::new();
        mapping.set_type_id("Feature", "feature-id-123");
        mapping.set_type_id("Bug", "bug-id-456");

        assert_eq!(mapping.type_id("Feature").as_deref(), Some("feature-id-123"));
        assert_eq!(mapping.type_id("Bug").as_deref(), Some("bug-id-456"));
        assert_eq!(mapping.type_id("Unknown"), None);
        assert_eq!(mapping.len(), 2);
    }

    #[test]
    fn test_set_type_id_last_write_wins() {
        let mapping = TypeMapping::new();
        mapping.set_type_id("Feature", "feature-id-123");
        mapping.set_type_id("Feature", "feature-id-456");

        assert_eq!(mapping.type_id("Feature").as_deref(), Some("feature-id-456"));
        assert_eq!(mapping.len(), 1);
    }

    #[test]
    fn test_load_type_ids_takes_known_labels_only() {
        let mapping = TypeMapping::new();
        let discovered = HashMap::from([
            ("feature".to_string(), "IT_feature".to_string()),
            ("bug".to_string(), "IT_bug".to_string()),
            ("task".to_string(), "IT_task".to_string()),
        ]);

        let loaded = mapping.load_type_ids(&discovered);

        assert_eq!(loaded, 2);
        assert_eq!(mapping.type_id("Feature").as_deref(), Some("IT_feature"));
        assert_eq!(mapping.type_id("Bug").as_deref(), Some("IT_bug"));
        assert_eq!(mapping.type_id("Task"), None);
        assert_eq!(mapping.type_id("Docs"), None);
    }

    #[test]
    fn test_type_from_title_delegates() {
        let mapping = TypeMapping::new();
        assert_eq!(mapping.type_from_title("docs(api): x"), Some("Docs"));
        assert_eq!(mapping.type_from_title("nothing here"), None);
    }
}
