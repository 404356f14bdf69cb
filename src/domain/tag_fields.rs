use std::hash::{Hash, Hasher};

use super::hash::{TypeSalted, salted_hash};

/// Core metadata of a track, in ID3 terms.
///
/// Every string field is optional; `None` means the source did not carry the
/// field at all. A `None` genre is also what older encodings without a genre
/// field decode to.
///
/// `==` is strict: `None` and `Some("")` differ. Use [`TagFields::lax_eq`] to
/// compare user-edited tags against freshly parsed ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFields {
    title: Option<String>,
    artist: Option<String>,
    genre: Option<String>,
    /// length in milliseconds
    length: u64,
}

impl TagFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn artist(&self) -> Option<&str> {
        self.artist.as_deref()
    }

    pub fn genre(&self) -> Option<&str> {
        self.genre.as_deref()
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn set_title(&mut self, title: Option<String>) {
        self.title = title;
    }

    pub fn set_artist(&mut self, artist: Option<String>) {
        self.artist = artist;
    }

    pub fn set_genre(&mut self, genre: Option<String>) {
        self.genre = genre;
    }

    pub fn set_length(&mut self, length: u64) {
        self.length = length;
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_length(mut self, length: u64) -> Self {
        self.length = length;
        self
    }

    /// Field-wise comparison where a missing string and an empty string are
    /// the same value. `length` is compared exactly.
    pub fn lax_eq(&self, other: &TagFields) -> bool {
        blank_eq(&self.title, &other.title)
            && blank_eq(&self.artist, &other.artist)
            && blank_eq(&self.genre, &other.genre)
            && self.length == other.length
    }
}

fn blank_eq(a: &Option<String>, b: &Option<String>) -> bool {
    a.as_deref().unwrap_or_default() == b.as_deref().unwrap_or_default()
}

impl TypeSalted for TagFields {
    const TYPE_TAG: &'static str = "tagdeck::TagFields";

    fn hash_fields<H: Hasher>(&self, state: &mut H) {
        self.title.hash(state);
        self.artist.hash(state);
        self.genre.hash(state);
        self.length.hash(state);
    }
}

impl Hash for TagFields {
    fn hash<H: Hasher>(&self, state: &mut H) {
        salted_hash(self, state);
    }
}
