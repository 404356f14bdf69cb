use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use anyhow::{Context, anyhow};
use rusqlite::{OptionalExtension, Transaction, params};

use crate::{
    codec::Codec,
    config,
    domain::{Chapter, TagFields, TagSet, UserTags},
    storage::{
        db,
        error::StorageError,
        schema::{columns::*, tables::*, tag_types},
    },
};

/// Persists tag sets of audio files in SQLite.
///
/// Tag fields are kept as a type → value table so files can be searched by
/// tag; empty strings and a zero length are not stored, so a loaded
/// `TagFields` is only lax-equal to the saved one. Whether the fields and
/// the user tags are present at all is kept on the file row. Chapters are
/// stored as codec-encoded JSON.
pub struct TagStore {
    pub(crate) db: rusqlite::Connection,
    codec: Codec,
}

impl TagStore {
    /// when called, opens a data base connection
    pub fn new(db_config: &config::Database, codec: Codec) -> Result<Self, StorageError> {
        let db = db::open(db_config)?;
        Ok(Self::from_existing_conn(db, codec))
    }

    pub fn from_existing_conn(db: rusqlite::Connection, codec: Codec) -> Self {
        Self { db, codec }
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    /// Inserts or replaces everything stored for the file of `set`.
    pub fn save(&mut self, set: &TagSet) -> Result<(), StorageError> {
        let path = path_key(set.filepath())?;
        let chapters_json = set
            .chapter_list()
            .map(|chapters| self.codec.encode(chapters))
            .transpose()?;

        let tx = self.db.transaction()?;

        tx.execute(
            &format!(
                "INSERT INTO {FILES}
                ({PATH}, {PARSED}, {HAS_TAG_FIELDS}, {HAS_USER_TAGS}, {CHAPTERS_JSON})
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT({PATH}) DO UPDATE SET
                {PARSED} = excluded.{PARSED},
                {HAS_TAG_FIELDS} = excluded.{HAS_TAG_FIELDS},
                {HAS_USER_TAGS} = excluded.{HAS_USER_TAGS},
                {CHAPTERS_JSON} = excluded.{CHAPTERS_JSON}"
            ),
            params![
                path,
                set.is_parsed(),
                set.tag_fields().is_some(),
                set.user_tags().is_some(),
                chapters_json
            ],
        )?;

        save_tag_fields(&tx, path, set.tag_fields())?;
        save_user_tags(&tx, path, set.user_tags())?;
        remove_orphan_user_tags(&tx)?;

        tx.commit()?;
        log::debug!("saved tags of {path}");
        Ok(())
    }

    /// Rebuilds the stored tag set of `path`.
    pub fn load(&self, path: &Path) -> Result<TagSet, StorageError> {
        let key = path_key(path)?;

        let row: Option<(bool, bool, bool, Option<String>)> = self
            .db
            .query_row(
                &format!(
                    "SELECT {PARSED}, {HAS_TAG_FIELDS}, {HAS_USER_TAGS}, {CHAPTERS_JSON}
                 FROM {FILES} WHERE {PATH} = ?1"
                ),
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;

        let Some((parsed, has_tag_fields, has_user_tags, chapters_json)) = row else {
            return Err(StorageError::NotFound(path.to_path_buf()));
        };

        let chapters = match chapters_json {
            Some(json) => self.codec.decode::<Vec<Chapter>>(&json)?,
            None => None,
        };

        let tag_fields = if has_tag_fields {
            Some(map_to_tag_fields(&self.tag_map(key)?)?)
        } else {
            None
        };

        let user_tags = if has_user_tags {
            Some(UserTags::new(self.user_tags_of(key)?))
        } else {
            None
        };

        Ok(TagSet::restore(
            path,
            parsed,
            tag_fields,
            user_tags,
            chapters,
        ))
    }

    /// Removes a file and everything stored for it.
    pub fn delete(&mut self, path: &Path) -> Result<(), StorageError> {
        let key = path_key(path)?;
        let tx = self.db.transaction()?;

        tx.execute(
            &format!("DELETE FROM {ID3_TAGS} WHERE {FILE} = ?1"),
            params![key],
        )?;
        tx.execute(
            &format!("DELETE FROM {USER_TAG_FILES} WHERE {FILE} = ?1"),
            params![key],
        )?;
        let removed = tx.execute(
            &format!("DELETE FROM {FILES} WHERE {PATH} = ?1"),
            params![key],
        )?;

        if removed == 0 {
            return Err(StorageError::NotFound(path.to_path_buf()));
        }

        remove_orphan_user_tags(&tx)?;
        tx.commit()?;
        Ok(())
    }

    pub fn list_paths(&self) -> Result<Vec<PathBuf>, StorageError> {
        let mut stmt = self
            .db
            .prepare(&format!("SELECT {PATH} FROM {FILES} ORDER BY {PATH}"))?;
        let paths = stmt
            .query_map([], |row| Ok(PathBuf::from(row.get::<_, String>(0)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(paths)
    }

    /// Files whose stored tag `tag_type` equals `value`.
    pub fn files_with_tag(
        &self,
        tag_type: &str,
        value: &str,
    ) -> Result<Vec<PathBuf>, StorageError> {
        let mut stmt = self.db.prepare(&format!(
            "SELECT {FILE} FROM {ID3_TAGS} WHERE {TYPE} = ?1 AND {VALUE} = ?2 ORDER BY {FILE}"
        ))?;
        let paths = stmt
            .query_map(params![tag_type, value], |row| {
                Ok(PathBuf::from(row.get::<_, String>(0)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(paths)
    }

    pub fn all_tag_types(&self) -> Result<Vec<String>, StorageError> {
        let mut stmt = self.db.prepare(&format!(
            "SELECT DISTINCT {TYPE} FROM {ID3_TAGS} ORDER BY {TYPE}"
        ))?;
        let types = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(types)
    }

    pub fn all_type_values(&self, tag_type: &str) -> Result<Vec<String>, StorageError> {
        let mut stmt = self.db.prepare(&format!(
            "SELECT DISTINCT {VALUE} FROM {ID3_TAGS} WHERE {TYPE} = ?1 ORDER BY {VALUE}"
        ))?;
        let values = stmt
            .query_map(params![tag_type], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(values)
    }

    /// Every user tag attached to at least one file.
    pub fn all_user_tags(&self) -> Result<Vec<String>, StorageError> {
        let mut stmt = self
            .db
            .prepare(&format!("SELECT {NAME} FROM {USER_TAGS} ORDER BY {NAME}"))?;
        let tags = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(tags)
    }

    pub fn files_with_user_tag(&self, tag: &str) -> Result<Vec<PathBuf>, StorageError> {
        let mut stmt = self.db.prepare(&format!(
            "SELECT DISTINCT r.{FILE} FROM {USER_TAG_FILES} r
             JOIN {USER_TAGS} t ON t.{ID} = r.{TAG}
             WHERE t.{NAME} = ?1
             ORDER BY r.{FILE}"
        ))?;
        let paths = stmt
            .query_map(params![tag], |row| Ok(PathBuf::from(row.get::<_, String>(0)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(paths)
    }

    fn tag_map(&self, key: &str) -> Result<HashMap<String, String>, StorageError> {
        let mut stmt = self.db.prepare(&format!(
            "SELECT {TYPE}, {VALUE} FROM {ID3_TAGS} WHERE {FILE} = ?1"
        ))?;
        let map = stmt
            .query_map(params![key], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<HashMap<String, String>, _>>()?;
        Ok(map)
    }

    fn user_tags_of(&self, key: &str) -> Result<Vec<String>, StorageError> {
        let mut stmt = self.db.prepare(&format!(
            "SELECT t.{NAME} FROM {USER_TAG_FILES} r
             JOIN {USER_TAGS} t ON t.{ID} = r.{TAG}
             WHERE r.{FILE} = ?1
             ORDER BY r.{POSITION}"
        ))?;
        let tags = stmt
            .query_map(params![key], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(tags)
    }
}

fn path_key(path: &Path) -> Result<&str, StorageError> {
    path.to_str().ok_or_else(|| {
        StorageError::Internal(anyhow!("path {} is not valid UTF-8", path.display()))
    })
}

fn save_tag_fields(
    tx: &Transaction,
    path: &str,
    fields: Option<&TagFields>,
) -> Result<(), StorageError> {
    tx.execute(
        &format!("DELETE FROM {ID3_TAGS} WHERE {FILE} = ?1"),
        params![path],
    )?;

    let Some(fields) = fields else {
        return Ok(());
    };

    for (tag_type, value) in tag_fields_to_map(fields) {
        tx.execute(
            &format!("INSERT INTO {ID3_TAGS} ({FILE}, {TYPE}, {VALUE}) VALUES (?1, ?2, ?3)"),
            params![path, tag_type, value],
        )?;
    }
    Ok(())
}

fn save_user_tags(
    tx: &Transaction,
    path: &str,
    user_tags: Option<&UserTags>,
) -> Result<(), StorageError> {
    tx.execute(
        &format!("DELETE FROM {USER_TAG_FILES} WHERE {FILE} = ?1"),
        params![path],
    )?;

    let Some(user_tags) = user_tags else {
        return Ok(());
    };

    for (position, tag) in user_tags.tags().iter().enumerate() {
        tx.execute(
            &format!("INSERT OR IGNORE INTO {USER_TAGS} ({NAME}) VALUES (?1)"),
            params![tag],
        )?;
        let tag_id: i64 = tx.query_row(
            &format!("SELECT {ID} FROM {USER_TAGS} WHERE {NAME} = ?1"),
            params![tag],
            |row| row.get(0),
        )?;
        let position = i64::try_from(position)
            .map_err(|e| StorageError::Internal(anyhow!("user tag position overflow: {e}")))?;
        tx.execute(
            &format!(
                "INSERT INTO {USER_TAG_FILES} ({FILE}, {TAG}, {POSITION}) VALUES (?1, ?2, ?3)"
            ),
            params![path, tag_id, position],
        )?;
    }
    Ok(())
}

/// removes all user tags no file refers to anymore
fn remove_orphan_user_tags(tx: &Transaction) -> Result<usize, StorageError> {
    let removed = tx.execute(
        &format!(
            "DELETE FROM {USER_TAGS} WHERE {ID} NOT IN (SELECT {TAG} FROM {USER_TAG_FILES})"
        ),
        [],
    )?;
    if removed > 0 {
        log::debug!("removed {removed} orphan user tags");
    }
    Ok(removed)
}

fn tag_fields_to_map(fields: &TagFields) -> Vec<(&'static str, String)> {
    let mut map = Vec::new();

    for (tag_type, value) in [
        (tag_types::TITLE, fields.title()),
        (tag_types::ARTIST, fields.artist()),
        (tag_types::GENRE, fields.genre()),
    ] {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            map.push((tag_type, value.to_string()));
        }
    }
    if fields.length() > 0 {
        map.push((tag_types::LENGTH, fields.length().to_string()));
    }

    map
}

fn map_to_tag_fields(map: &HashMap<String, String>) -> Result<TagFields, StorageError> {
    let mut fields = TagFields::new();

    fields.set_title(map.get(tag_types::TITLE).cloned());
    fields.set_artist(map.get(tag_types::ARTIST).cloned());
    fields.set_genre(map.get(tag_types::GENRE).cloned());
    if let Some(length) = map.get(tag_types::LENGTH) {
        let length = length
            .parse::<u64>()
            .with_context(|| format!("stored length '{length}' is not a number"))?;
        fields.set_length(length);
    }

    Ok(fields)
}
