//! In-memory tag model of an audio file

pub mod chapter;
pub mod hash;
pub mod tag_fields;
pub mod tag_set;
pub mod user_tags;

pub use chapter::Chapter;
pub use tag_fields::TagFields;
pub use tag_set::TagSet;
pub use user_tags::UserTags;
