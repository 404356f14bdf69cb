pub mod cli;
pub mod codec;
pub mod config;
pub mod domain;
pub mod reader;
pub mod storage;

pub use codec::{Codec, CodecConfig, CodecError};
pub use domain::{Chapter, TagFields, TagSet, UserTags};
pub use reader::{ParseError, TagReader};
