//! Context assembly: fragments in, one newline-joined string out.

use serde::{Deserialize, Serialize};

/// Concatenate fragments with newline separators, preserving order.
///
/// Empty input yields an empty string. Empty fragments are kept, so the output
/// always has exactly `fragments.len() - 1` separators.
pub fn assemble<S: AsRef<str>>(fragments: &[S]) -> String {
    let mut context = String::with_capacity(fragments.iter().map(|f| f.as_ref().len() + 1).sum());
    for (i, fragment) in fragments.iter().enumerate() {
        if i > 0 {
            context.push('\n');
        }
        context.push_str(fragment.as_ref());
    }
    context
}

/// Accumulates fragments across uploads within a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextBuilder {
    fragments: Vec<String>,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fragment. Empty fragments are valid and kept in order.
    pub fn push(&mut self, fragment: impl Into<String>) {
        self.fragments.push(fragment.into());
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn clear(&mut self) {
        self.fragments.clear();
    }

    /// Assemble the current context.
    pub fn build(&self) -> String {
        assemble(&self.fragments)
    }
}
