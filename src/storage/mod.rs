pub mod db;
pub mod error;
pub mod fs;
pub mod operations;
pub(crate) mod schema;

pub use error::StorageError;
pub use operations::TagStore;
