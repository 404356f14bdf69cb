//! Tag reader for MP3 files carrying an ID3v2 tag

use std::path::Path;

use id3::{ErrorKind, Tag, TagLike, frame::Content};

use crate::{
    domain::{Chapter, TagFields, UserTags},
    reader::{
        ParseError, ParsedTags, TagReader, has_extension,
        usertags_frame::{decode_payload, is_usertags_owner},
    },
};

const SUPPORTED_EXTENSIONS: &[&str] = &["mp3"];

/// Reads title, artist, genre, length, user tags and chapters from ID3v2.
///
/// A file without any tag is fine: it yields empty fields and no chapter
/// list.
#[derive(Debug, Default, Clone, Copy)]
pub struct Id3Reader;

impl TagReader for Id3Reader {
    fn read_tags(&self, path: &Path) -> Result<ParsedTags, ParseError> {
        if !self.supports(path) {
            return Err(ParseError::Unsupported(path.to_path_buf()));
        }

        match Tag::read_from_path(path) {
            Ok(tag) => Ok(parsed_from_tag(&tag)),
            Err(err) => {
                let reason = err.to_string();
                match err.kind {
                    ErrorKind::NoTag => {
                        log::debug!("no ID3 tag in {}", path.display());
                        Ok(ParsedTags {
                            tag_fields: TagFields::new(),
                            user_tags: UserTags::default(),
                            chapters: None,
                        })
                    }
                    ErrorKind::Io(source) => Err(ParseError::Open {
                        path: path.to_path_buf(),
                        source,
                    }),
                    _ => Err(ParseError::Malformed {
                        path: path.to_path_buf(),
                        reason,
                    }),
                }
            }
        }
    }

    fn supports(&self, path: &Path) -> bool {
        has_extension(path, SUPPORTED_EXTENSIONS)
    }
}

fn parsed_from_tag(tag: &Tag) -> ParsedTags {
    let mut tag_fields = TagFields::new();
    tag_fields.set_title(tag.title().map(str::to_owned));
    tag_fields.set_artist(tag.artist().map(str::to_owned));
    tag_fields.set_genre(tag.genre().map(str::to_owned));
    // TLEN holds milliseconds
    tag_fields.set_length(tag.duration().map(u64::from).unwrap_or(0));

    ParsedTags {
        tag_fields,
        user_tags: user_tags(tag),
        chapters: Some(chapters(tag)),
    }
}

fn user_tags(tag: &Tag) -> UserTags {
    tag.frames()
        .find_map(|frame| match frame.content() {
            Content::Private(private) if is_usertags_owner(&private.owner_identifier) => {
                Some(decode_payload(&private.private_data))
            }
            _ => None,
        })
        .unwrap_or_default()
}

fn chapters(tag: &Tag) -> Vec<Chapter> {
    tag.chapters()
        .map(|chapter| {
            let name = chapter
                .frames
                .iter()
                .find(|frame| frame.id() == "TIT2")
                .and_then(|frame| frame.content().text())
                .map(str::to_owned)
                .unwrap_or_else(|| chapter.element_id.clone());

            Chapter::new(
                u64::from(chapter.start_time),
                u64::from(chapter.end_time),
                name,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use id3::{
        Frame, Tag, TagLike, Version,
        frame::{Chapter as Id3Chapter, Content, Private},
    };
    use tempfile::tempdir;

    use crate::{
        domain::{Chapter, UserTags},
        reader::{
            Id3Reader, ParseError, TagReader,
            usertags_frame::{OWNER, encode_payload},
        },
    };

    fn write_tagged_mp3(path: &Path) -> anyhow::Result<()> {
        fs::write(path, b"")?;

        let mut tag = Tag::new();
        tag.set_title("Song");
        tag.set_artist("Band");
        tag.set_genre("Rock");
        tag.set_duration(180_000);

        tag.add_frame(Id3Chapter {
            element_id: "chp0".to_string(),
            start_time: 0,
            end_time: 60_000,
            start_offset: u32::MAX,
            end_offset: u32::MAX,
            frames: vec![Frame::text("TIT2", "Intro")],
        });
        tag.add_frame(Id3Chapter {
            element_id: "chp1".to_string(),
            start_time: 60_000,
            end_time: 180_000,
            start_offset: u32::MAX,
            end_offset: u32::MAX,
            frames: vec![],
        });
        tag.add_frame(Frame::with_content(
            "PRIV",
            Content::Private(Private {
                owner_identifier: OWNER.to_string(),
                private_data: encode_payload(&UserTags::new(["live", "favorite"])),
            }),
        ));

        tag.write_to_path(path, Version::Id3v24)?;
        Ok(())
    }

    #[test]
    fn reads_fields_user_tags_and_chapters() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("song.mp3");
        write_tagged_mp3(&path)?;

        let parsed = Id3Reader.read_tags(&path)?;

        assert_eq!(parsed.tag_fields.title(), Some("Song"));
        assert_eq!(parsed.tag_fields.artist(), Some("Band"));
        assert_eq!(parsed.tag_fields.genre(), Some("Rock"));
        assert_eq!(parsed.tag_fields.length(), 180_000);
        assert_eq!(parsed.user_tags.tags(), ["live", "favorite"]);
        assert_eq!(
            parsed.chapters,
            Some(vec![
                Chapter::new(0, 60_000, "Intro"),
                Chapter::new(60_000, 180_000, "chp1"),
            ])
        );

        Ok(())
    }

    #[test]
    fn untagged_file_parses_to_empty_tags() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("raw.mp3");
        fs::write(&path, b"not really audio")?;

        let parsed = Id3Reader.read_tags(&path)?;

        assert_eq!(parsed.tag_fields.title(), None);
        assert_eq!(parsed.tag_fields.length(), 0);
        assert!(parsed.user_tags.is_empty());
        assert!(parsed.chapters.is_none());

        Ok(())
    }

    #[test]
    fn missing_file_cannot_be_opened() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gone.mp3");

        let err = Id3Reader.read_tags(&path).unwrap_err();

        assert!(matches!(err, ParseError::Open { .. }));
    }

    #[test]
    fn other_containers_are_unsupported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("song.flac");
        fs::write(&path, b"fLaC").unwrap();

        let err = Id3Reader.read_tags(&path).unwrap_err();

        assert!(matches!(err, ParseError::Unsupported(_)));
    }

    #[test]
    fn supports_only_mp3() {
        assert!(Id3Reader.supports(Path::new("/music/a.mp3")));
        assert!(Id3Reader.supports(Path::new("/music/b.MP3")));
        assert!(!Id3Reader.supports(Path::new("/music/c.flac")));
        assert!(!Id3Reader.supports(Path::new("/music/d.ogg")));
    }
}
