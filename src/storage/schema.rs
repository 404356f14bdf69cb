use rusqlite::Connection;

pub mod tables {
    pub const FILES: &str = "files";
    pub const ID3_TAGS: &str = "id3_tags";
    pub const USER_TAGS: &str = "user_tags";
    pub const USER_TAG_FILES: &str = "user_tag_files";

    pub const ALL_TABLES: &[&str] = &[FILES, ID3_TAGS, USER_TAGS, USER_TAG_FILES];
}

pub mod columns {
    pub const PATH: &str = "path";
    pub const PARSED: &str = "parsed";
    pub const HAS_TAG_FIELDS: &str = "has_tag_fields";
    pub const HAS_USER_TAGS: &str = "has_user_tags";
    pub const CHAPTERS_JSON: &str = "chapters_json";
    pub const FILE: &str = "file";
    pub const TYPE: &str = "type";
    pub const VALUE: &str = "value";
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const TAG: &str = "tag";
    pub const POSITION: &str = "position";
}

/// Keys of the `id3_tags` table
pub mod tag_types {
    pub const TITLE: &str = "title";
    pub const ARTIST: &str = "artist";
    pub const GENRE: &str = "genre";
    pub const LENGTH: &str = "length";
}

pub use columns::*;
pub use tables::*;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS files (
    path TEXT PRIMARY KEY NOT NULL,
    parsed INTEGER NOT NULL,
    has_tag_fields INTEGER NOT NULL,
    has_user_tags INTEGER NOT NULL,
    chapters_json TEXT
);

CREATE TABLE IF NOT EXISTS id3_tags (
    file TEXT NOT NULL REFERENCES files(path) ON DELETE CASCADE,
    type TEXT NOT NULL,
    value TEXT NOT NULL,
    PRIMARY KEY (file, type)
);

CREATE TABLE IF NOT EXISTS user_tags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS user_tag_files (
    file TEXT NOT NULL REFERENCES files(path) ON DELETE CASCADE,
    tag INTEGER NOT NULL REFERENCES user_tags(id),
    position INTEGER NOT NULL,
    PRIMARY KEY (file, position)
);
"#;

pub fn init(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.execute_batch(SCHEMA)
}
