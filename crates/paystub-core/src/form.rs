//! Hidden-form state captured from one rendered page.
//!
//! The portal encodes all navigation as mutated hidden-form state rather
//! than addressable URLs. Each page carries a fresh snapshot that must be
//! echoed back verbatim, plus exactly one overlaid selector key, to move
//! to the next view. Submitting a snapshot from a superseded page desyncs
//! the server-side view state silently.

use serde::Serialize;

/// Ordered name→value mapping of one form's hidden fields.
///
/// Preserves first-seen field order; `serde` serializes it transparently as
/// URL-encoded pairs, so it can be handed straight to an HTTP client's form
/// encoder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormSnapshot {
    fields: Vec<(String, String)>,
}

impl FormSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing an existing value or appending at the end.
    pub fn insert(&mut self, name: &str, value: &str) {
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.fields.push((name.to_string(), value.to_string())),
        }
    }

    /// Overlay one additional selector key, consuming the snapshot.
    ///
    /// This is the only sanctioned mutation between capture and submission.
    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
