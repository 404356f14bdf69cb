use std::hash::{Hash, Hasher};

use super::hash::{TypeSalted, salted_hash};

/// Ordered list of free-form labels a user attached to a file.
///
/// The list cannot be changed after construction; [`UserTags::tags`] only
/// hands out a shared slice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserTags {
    tags: Box<[String]>,
}

impl UserTags {
    /// Copies `tags` into a new instance, keeping their order.
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

impl TypeSalted for UserTags {
    const TYPE_TAG: &'static str = "tagdeck::UserTags";

    fn hash_fields<H: Hasher>(&self, state: &mut H) {
        self.tags.hash(state);
    }
}

impl Hash for UserTags {
    fn hash<H: Hasher>(&self, state: &mut H) {
        salted_hash(self, state);
    }
}
