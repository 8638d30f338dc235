//! Validation errors collected on a record
//!
//! `Errors` is the per-record bag that mount validators write into. Keys are
//! attribute names, values are human-readable messages resolved through the
//! registry's message catalog. The map is ordered so rendered messages come
//! out in a stable order.

use std::collections::BTreeMap;

use affix_core::MessageCatalog;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Errors {
    errors: BTreeMap<String, Vec<String>>,
}

impl Errors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, attribute: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(attribute.into())
            .or_default()
            .push(message.into());
    }

    /// Messages recorded for one attribute.
    pub fn on(&self, attribute: &str) -> &[String] {
        self.errors
            .get(attribute)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Total number of messages across all attributes.
    pub fn count(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.errors
            .iter()
            .map(|(attribute, messages)| (attribute.as_str(), messages.as_slice()))
    }

    /// Renders each message prefixed with its attribute name.
    pub fn full_messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .flat_map(|(attribute, messages)| {
                messages
                    .iter()
                    .map(move |message| format!("{attribute} {message}"))
            })
            .collect()
    }
}

/// A validation check registered by one mount.
///
/// Checks are synchronous: they read capture flags off the record and append
/// messages, never touching storage.
pub(crate) type ValidatorFn<R> =
    Box<dyn Fn(&R, &dyn MessageCatalog, &mut Errors) + Send + Sync>;

pub(crate) struct Validator<R> {
    /// Column whose mount registered this check. Remounting the column
    /// drops every validator with a matching owner.
    pub owner: String,
    pub check: ValidatorFn<R>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_read_back() {
        let mut errors = Errors::new();
        assert!(errors.is_empty());

        errors.add("avatar", "is not an allowed type of file.");
        errors.add("avatar", "failed to be processed.");
        errors.add("banner", "is not an allowed type of file.");

        assert!(!errors.is_empty());
        assert_eq!(errors.count(), 3);
        assert_eq!(errors.on("avatar").len(), 2);
        assert_eq!(errors.on("banner").len(), 1);
        assert!(errors.on("missing").is_empty());
    }

    #[test]
    fn test_full_messages_are_prefixed_and_ordered() {
        let mut errors = Errors::new();
        errors.add("banner", "failed to be processed.");
        errors.add("avatar", "is not an allowed type of file.");

        assert_eq!(
            errors.full_messages(),
            vec![
                "avatar is not an allowed type of file.".to_string(),
                "banner failed to be processed.".to_string(),
            ]
        );
    }

    #[test]
    fn test_iter_walks_attributes_in_order() {
        let mut errors = Errors::new();
        errors.add("banner", "failed to be processed.");
        errors.add("avatar", "is not an allowed type of file.");
        errors.add("avatar", "failed to be processed.");

        let pairs: Vec<(&str, usize)> = errors
            .iter()
            .map(|(attribute, messages)| (attribute, messages.len()))
            .collect();
        assert_eq!(pairs, vec![("avatar", 2), ("banner", 1)]);

        let (attribute, messages) = errors.iter().next().unwrap();
        assert_eq!(attribute, "avatar");
        assert_eq!(messages[0], "is not an allowed type of file.");
    }

    #[test]
    fn test_clear_empties_the_bag() {
        let mut errors = Errors::new();
        errors.add("avatar", "is not an allowed type of file.");
        errors.clear();
        assert!(errors.is_empty());
        assert_eq!(errors.count(), 0);
    }

    #[test]
    fn test_serializes_as_map() {
        let mut errors = Errors::new();
        errors.add("avatar", "is not an allowed type of file.");

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json["errors"]["avatar"][0],
            "is not an allowed type of file."
        );
    }
}
