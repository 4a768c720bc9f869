//! Ordered, field-keyed validation error collection.
//!
//! An [`ErrorSet`] is an append-only list of `(field, code, message)` entries.
//! Insertion order is preserved so reports read in the order the rules ran.
//! Cross-cutting failures (such as "an associated form is invalid") are filed
//! under the pseudo-field [`BASE_KEY`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The pseudo-field key used for errors not tied to a single attribute.
pub const BASE_KEY: &str = "base";

/// One validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    /// The attribute (or [`BASE_KEY`]) this error is attached to.
    pub field: String,
    /// A short machine-readable code (e.g. "blank").
    pub code: String,
    /// The human-readable message, without the attribute name.
    pub message: String,
}

impl ErrorEntry {
    /// Returns `true` if this entry is filed under [`BASE_KEY`].
    pub fn is_base(&self) -> bool {
        self.field == BASE_KEY
    }

    /// Returns the message prefixed with the humanized attribute name.
    ///
    /// Base errors are returned as-is.
    pub fn full_message(&self) -> String {
        if self.is_base() {
            self.message.clone()
        } else {
            format!("{} {}", humanize(&self.field), self.message)
        }
    }
}

/// An ordered multimap from field key to validation failures.
///
/// # Examples
///
/// ```
/// use formwork_core::error_set::{ErrorSet, BASE_KEY};
///
/// let mut errors = ErrorSet::new();
/// errors.add("first_name", "blank", "can't be blank");
/// errors.add_base("association_error", "associated Country form has some errors");
///
/// assert_eq!(errors.len(), 2);
/// assert!(errors.contains_key("first_name"));
/// assert_eq!(errors.messages_for(BASE_KEY), vec!["associated Country form has some errors"]);
/// assert_eq!(errors.full_messages()[0], "First name can't be blank");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorSet {
    entries: Vec<ErrorEntry>,
}

impl ErrorSet {
    /// Creates an empty error set.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends an error for `field`.
    pub fn add(
        &mut self,
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.entries.push(ErrorEntry {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        });
    }

    /// Appends a [`ValidationError`] produced by a validator for `field`.
    pub fn add_error(&mut self, field: impl Into<String>, error: ValidationError) {
        self.add(field, error.code, error.message);
    }

    /// Appends an error under [`BASE_KEY`].
    pub fn add_base(&mut self, code: impl Into<String>, message: impl Into<String>) {
        self.add(BASE_KEY, code, message);
    }

    /// Returns `true` if there are no errors.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Removes every entry filed under `field`, returning how many were dropped.
    pub fn remove(&mut self, field: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.field != field);
        before - self.entries.len()
    }

    /// Iterates over all entries in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, ErrorEntry> {
        self.entries.iter()
    }

    /// Iterates over the entries filed under `field`.
    pub fn on<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a ErrorEntry> + 'a {
        self.entries.iter().filter(move |e| e.field == field)
    }

    /// Returns the messages filed under `field`, in insertion order.
    pub fn messages_for<'a>(&'a self, field: &str) -> Vec<&'a str> {
        self.entries
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }

    /// Returns the codes filed under `field`, in insertion order.
    pub fn codes_for<'a>(&'a self, field: &str) -> Vec<&'a str> {
        self.entries
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.code.as_str())
            .collect()
    }

    /// Returns `true` if at least one error is filed under `field`.
    pub fn contains_key(&self, field: &str) -> bool {
        self.entries.iter().any(|e| e.field == field)
    }

    /// Returns the distinct field keys in first-seen order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !keys.contains(&entry.field.as_str()) {
                keys.push(&entry.field);
            }
        }
        keys
    }

    /// Returns every message prefixed with its humanized attribute name.
    pub fn full_messages(&self) -> Vec<String> {
        self.entries.iter().map(ErrorEntry::full_message).collect()
    }

    /// Appends every entry of `other` verbatim.
    pub fn merge(&mut self, other: &Self) {
        self.entries.extend(other.entries.iter().cloned());
    }

    /// Appends every entry of `other`, rewriting its field as `prefix.field`.
    ///
    /// Base entries of `other` are filed under `prefix` itself.
    pub fn merge_prefixed(&mut self, prefix: &str, other: &Self) {
        for entry in &other.entries {
            let field = if entry.is_base() {
                prefix.to_string()
            } else {
                format!("{prefix}.{}", entry.field)
            };
            self.add(field, entry.code.clone(), entry.message.clone());
        }
    }
}

impl fmt::Display for ErrorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_messages().join("; "))
    }
}

impl<'a> IntoIterator for &'a ErrorSet {
    type Item = &'a ErrorEntry;
    type IntoIter = std::slice::Iter<'a, ErrorEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Extend<ErrorEntry> for ErrorSet {
    fn extend<T: IntoIterator<Item = ErrorEntry>>(&mut self, iter: T) {
        self.entries.extend(iter);
    }
}

/// Turns `first_name` into `First name`.
fn humanize(field: &str) -> String {
    let spaced = field.trim_end_matches("_id").replace(['_', '.'], " ");
    let mut chars = spaced.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
