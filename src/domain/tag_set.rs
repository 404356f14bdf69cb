use std::{
    hash::{Hash, Hasher},
    path::{Path, PathBuf},
};

use super::{
    chapter::Chapter,
    hash::{TypeSalted, salted_hash},
    tag_fields::TagFields,
    user_tags::UserTags,
};
use crate::reader::{ParseError, ParsedTags, TagReader};

/// Everything known about the tags of one audio file.
///
/// A fresh set is unparsed and empty. [`TagSet::parse`] moves it to the
/// parsed state in one step, or leaves it untouched on failure. A set
/// restored from persisted state carries whatever that state said.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSet {
    filepath: PathBuf,
    parsed: bool,
    tag_fields: Option<TagFields>,
    user_tags: Option<UserTags>,
    /// `None` when the source format has no chapter concept
    chapters: Option<Vec<Chapter>>,
}

impl TagSet {
    pub fn new(filepath: impl Into<PathBuf>) -> Self {
        Self {
            filepath: filepath.into(),
            parsed: false,
            tag_fields: None,
            user_tags: None,
            chapters: None,
        }
    }

    /// Rebuilds a set from persisted state without touching the file.
    pub fn restore(
        filepath: impl Into<PathBuf>,
        parsed: bool,
        tag_fields: Option<TagFields>,
        user_tags: Option<UserTags>,
        chapters: Option<Vec<Chapter>>,
    ) -> Self {
        Self {
            filepath: filepath.into(),
            parsed,
            tag_fields,
            user_tags,
            chapters,
        }
    }

    /// Reads the tags of the file through `reader`.
    ///
    /// Either every member gets populated and the set becomes parsed, or an
    /// error is returned and the set is left as it was.
    pub fn parse<R: TagReader + ?Sized>(&mut self, reader: &R) -> Result<(), ParseError> {
        if self.parsed {
            return Err(ParseError::AlreadyParsed(self.filepath.clone()));
        }

        let tags = reader.read_tags(&self.filepath)?;
        self.apply(tags);
        Ok(())
    }

    fn apply(&mut self, tags: ParsedTags) {
        let ParsedTags {
            tag_fields,
            user_tags,
            chapters,
        } = tags;

        self.tag_fields = Some(tag_fields);
        self.user_tags = Some(user_tags);
        self.chapters = chapters;
        self.parsed = true;
    }

    pub fn filepath(&self) -> &Path {
        &self.filepath
    }

    pub fn is_parsed(&self) -> bool {
        self.parsed
    }

    pub fn tag_fields(&self) -> Option<&TagFields> {
        self.tag_fields.as_ref()
    }

    /// Mutable access for user edits of the parsed fields.
    pub fn tag_fields_mut(&mut self) -> Option<&mut TagFields> {
        self.tag_fields.as_mut()
    }

    pub fn user_tags(&self) -> Option<&UserTags> {
        self.user_tags.as_ref()
    }

    /// Replaces the user tags as a whole; `UserTags` itself is immutable.
    pub fn set_user_tags(&mut self, user_tags: UserTags) {
        self.user_tags = Some(user_tags);
    }

    /// Read-only view of the chapters; empty when there are none or the
    /// source has no chapter concept.
    pub fn chapters(&self) -> &[Chapter] {
        self.chapters.as_deref().unwrap_or_default()
    }

    /// The chapters as stored, keeping "no chapter tag" apart from "no
    /// chapters".
    pub fn chapter_list(&self) -> Option<&[Chapter]> {
        self.chapters.as_deref()
    }
}

impl TypeSalted for TagSet {
    const TYPE_TAG: &'static str = "tagdeck::TagSet";

    fn hash_fields<H: Hasher>(&self, state: &mut H) {
        self.filepath.hash(state);
        self.parsed.hash(state);
        self.tag_fields.hash(state);
        self.user_tags.hash(state);
        self.chapters.hash(state);
    }
}

impl Hash for TagSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        salted_hash(self, state);
    }
}
