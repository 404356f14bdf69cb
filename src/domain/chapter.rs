use std::hash::{Hash, Hasher};

use super::hash::{TypeSalted, salted_hash};

/// A named interval of a track's timeline, in milliseconds.
///
/// `start <= end` is not checked: inverted intervals found in the wild are
/// carried through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    start: u64,
    end: u64,
    name: String,
}

impl Chapter {
    pub fn new(start: u64, end: u64, name: impl Into<String>) -> Self {
        Self {
            start,
            end,
            name: name.into(),
        }
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl TypeSalted for Chapter {
    const TYPE_TAG: &'static str = "tagdeck::Chapter";

    fn hash_fields<H: Hasher>(&self, state: &mut H) {
        self.start.hash(state);
        self.end.hash(state);
        self.name.hash(state);
    }
}

impl Hash for Chapter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        salted_hash(self, state);
    }
}
