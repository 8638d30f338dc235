//! Validation message lookup.
//!
//! Messages for the two validation kinds resolve through a pluggable catalog
//! with a literal fallback per kind, so applications can localize without
//! this crate depending on any translation machinery.

use std::collections::HashMap;

/// The validation kinds a message can be looked up for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    Integrity,
    Processing,
}

impl MessageKey {
    /// Catalog lookup key.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKey::Integrity => "integrity",
            MessageKey::Processing => "processing",
        }
    }

    /// Literal used when no catalog entry and no per-mount override exist.
    pub fn default_message(&self) -> &'static str {
        match self {
            MessageKey::Integrity => "is not an allowed type of file.",
            MessageKey::Processing => "failed to be processed.",
        }
    }
}

/// Pluggable message lookup.
///
/// Implementations may consult whatever translation source the application
/// uses. Returning `None` falls through to the per-kind default literal.
pub trait MessageCatalog: Send + Sync {
    fn lookup(&self, key: MessageKey) -> Option<String>;
}

/// Map-backed catalog, sufficient for most applications and for tests.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    messages: HashMap<MessageKey, String>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message(mut self, key: MessageKey, message: impl Into<String>) -> Self {
        self.messages.insert(key, message.into());
        self
    }
}

impl MessageCatalog for StaticCatalog {
    fn lookup(&self, key: MessageKey) -> Option<String> {
        self.messages.get(&key).cloned()
    }
}

/// Resolve a validation message: per-mount override, then catalog, then the
/// default literal for the kind.
pub fn resolve_message(
    catalog: &dyn MessageCatalog,
    key: MessageKey,
    override_message: Option<&str>,
) -> String {
    if let Some(message) = override_message {
        return message.to_string();
    }
    catalog
        .lookup(key)
        .unwrap_or_else(|| key.default_message().to_string())
}
