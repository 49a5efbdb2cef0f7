//! Run-wide record of source sequences that could not be found
//!
//! A missing sequence is reported once per distinct name for the whole
//! run. The set only grows; it is shared by every worker when records are
//! lifted in parallel.

use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct MissedSequences {
    names: Mutex<HashSet<String>>,
}

impl MissedSequences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name`; true the first time a name is seen
    pub fn insert(&self, name: &str) -> bool {
        let mut names = match self.names.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if names.contains(name) {
            false
        } else {
            names.insert(name.to_string())
        }
    }

    pub fn len(&self) -> usize {
        match self.names.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
