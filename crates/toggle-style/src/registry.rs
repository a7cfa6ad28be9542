//! Insert-once bookkeeping for emitted style sheets.
//!
//! Documents usually need each condition set's sheet exactly once, however
//! many components use the set. [`StyleRegistry`] remembers which sheets have
//! been handed out by their [`StyleSheet::key`].

use std::collections::HashSet;
use std::sync::OnceLock;

use parking_lot::Mutex;

use crate::logging::targets;
use crate::stylesheet::{Format, StyleSheet};

/// Process-wide registry used by [`global_registry`].
static GLOBAL_REGISTRY: OnceLock<StyleRegistry> = OnceLock::new();

/// Get the process-wide style registry, initializing it if necessary.
pub fn global_registry() -> &'static StyleRegistry {
    GLOBAL_REGISTRY.get_or_init(StyleRegistry::new)
}

/// Tracks which style sheets have already been inserted.
#[derive(Debug, Default)]
pub struct StyleRegistry {
    inserted: Mutex<HashSet<String>>,
}

impl StyleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Render a sheet the first time it is seen.
    ///
    /// Returns `None` if the sheet is empty or was inserted before.
    pub fn insert(&self, sheet: &StyleSheet, format: &Format) -> Option<String> {
        if sheet.is_empty() {
            return None;
        }
        let key = sheet.key();
        if !self.inserted.lock().insert(key.clone()) {
            tracing::trace!(target: targets::REGISTRY, key = %key, "style sheet already inserted");
            return None;
        }
        tracing::debug!(
            target: targets::REGISTRY,
            key = %key,
            rules = sheet.rules().len(),
            "inserting style sheet"
        );
        Some(sheet.render(format))
    }

    /// Check if a sheet has been inserted.
    pub fn contains(&self, sheet: &StyleSheet) -> bool {
        self.inserted.lock().contains(&sheet.key())
    }

    /// Number of distinct sheets inserted.
    pub fn len(&self) -> usize {
        self.inserted.lock().len()
    }

    /// Check if nothing has been inserted.
    pub fn is_empty(&self) -> bool {
        self.inserted.lock().is_empty()
    }

    /// Forget every inserted sheet.
    pub fn clear(&self) {
        self.inserted.lock().clear();
    }
}
