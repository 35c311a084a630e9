//! Insertion-ordered command table.
//!
//! Registration order is the dispatch tie-break order, so the table is a
//! plain vector with a signature index for duplicate detection.

use std::collections::HashSet;

use bevy::log::warn;

use super::{Entry, EntryMatch, Handler};

/// Maps each [`Entry`] to the handler bound to it.
pub struct CommandTable<S> {
    entries: Vec<(Entry, Handler<S>)>,
    signatures: HashSet<String>,
}

impl<S> Default for CommandTable<S> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            signatures: HashSet::new(),
        }
    }
}

impl<S> CommandTable<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entry with its handler.
    ///
    /// Returns `true` if the entry was newly registered. An entry whose
    /// signature is already present is ignored with a warning; the first
    /// registration keeps precedence.
    pub fn register(&mut self, entry: Entry, handler: Handler<S>) -> bool {
        if !self.signatures.insert(entry.signature().to_string()) {
            warn!(
                "Commander: ignoring duplicate command path '{}'",
                entry.signature()
            );
            return false;
        }
        self.entries.push((entry, handler));
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn iter(&self) -> impl Iterator<Item = (&Entry, &Handler<S>)> {
        self.entries.iter().map(|(entry, handler)| (entry, handler))
    }

    /// Iterate over entries in registration order.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().map(|(entry, _)| entry)
    }

    /// Select the entry for an input.
    ///
    /// The first exact match wins; otherwise the first trailing match;
    /// otherwise nothing.
    pub fn select(&self, input: &str) -> Option<(&Entry, &Handler<S>)> {
        let mut trailing = None;
        for (entry, handler) in self.iter() {
            match entry.match_input(input) {
                EntryMatch::Exact => return Some((entry, handler)),
                EntryMatch::Trailing => {
                    if trailing.is_none() {
                        trailing = Some((entry, handler));
                    }
                }
                EntryMatch::NoMatch => {}
            }
        }
        trailing
    }
}
