//! Boundary to the tag parser that pulls metadata out of audio files

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::{Chapter, TagFields, UserTags};

mod id3v2;
pub mod usertags_frame;

pub use id3v2::Id3Reader;

/// Extensions a tag reader can be asked about
const MUSIC_EXTENSIONS: &[&str] = &["mp3", "flac", "wav", "m4a", "ogg", "aac"];

pub fn is_music_file(path: &Path) -> bool {
    has_extension(path, MUSIC_EXTENSIONS)
}

pub(crate) fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Result of one successful parse, handed over to a `TagSet` as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTags {
    pub tag_fields: TagFields,
    pub user_tags: UserTags,
    /// `None` when the container has no chapter concept
    pub chapters: Option<Vec<Chapter>>,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("file {} could not be opened: {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("file {} is not a supported tag container", .0.display())]
    Unsupported(PathBuf),

    #[error("tags of {} could not be read: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("tags of {} were already parsed", .0.display())]
    AlreadyParsed(PathBuf),
}

/// Reads the tags of a single file.
///
/// Any error means nothing was read; implementations never return partial
/// results.
pub trait TagReader {
    fn read_tags(&self, path: &Path) -> Result<ParsedTags, ParseError>;

    /// Whether `path` looks like a file this reader can parse.
    fn supports(&self, path: &Path) -> bool {
        is_music_file(path)
    }
}
