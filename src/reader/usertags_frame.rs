//! Payload of the private ID3v2 frame that carries user tags.
//!
//! The frame is a `PRIV` frame whose owner identifier starts with
//! [`OWNER_PREFIX`]. Its data is a run of UTF-8 strings, each one terminated
//! by a NUL byte.

use crate::domain::UserTags;

/// Owner identifier of the user tags frame, up to the version
pub const OWNER_PREFIX: &str = "BlueBeats::Usertags::";

/// Owner identifier written for new frames; readers of the v1 format only
/// accept this exact string
pub const OWNER: &str = "BlueBeats::Usertags::v1 - chocolatecakecodes@disroot.org";

pub fn is_usertags_owner(owner: &str) -> bool {
    owner.starts_with(OWNER_PREFIX)
}

/// Splits a frame payload into user tags.
///
/// Bytes after the last NUL belong to no tag and are dropped. Invalid UTF-8
/// is replaced rather than rejected.
pub fn decode_payload(data: &[u8]) -> UserTags {
    let mut segments: Vec<&[u8]> = data.split(|b| *b == 0).collect();
    // the piece after the final terminator is either empty or unterminated
    segments.pop();

    UserTags::new(
        segments
            .into_iter()
            .map(|segment| String::from_utf8_lossy(segment).into_owned()),
    )
}

pub fn encode_payload(tags: &UserTags) -> Vec<u8> {
    let mut data = Vec::new();
    for tag in tags.tags() {
        data.extend_from_slice(tag.as_bytes());
        data.push(0);
    }
    data
}

#[cfg(test)]
mod tests {
    use crate::{
        domain::UserTags,
        reader::usertags_frame::{OWNER, decode_payload, encode_payload, is_usertags_owner},
    };

    #[test]
    fn decodes_terminated_strings() {
        let tags = decode_payload(b"rock\0favorite\0");

        assert_eq!(tags.tags(), ["rock", "favorite"]);
    }

    #[test]
    fn drops_unterminated_tail() {
        let tags = decode_payload(b"rock\0fav");

        assert_eq!(tags.tags(), ["rock"]);
    }

    #[test]
    fn empty_payload_has_no_tags() {
        assert!(decode_payload(b"").is_empty());
    }

    #[test]
    fn keeps_empty_tags_between_terminators() {
        let tags = decode_payload(b"a\0\0b\0");

        assert_eq!(tags.tags(), ["a", "", "b"]);
    }

    #[test]
    fn encode_terminates_every_tag() {
        let tags = UserTags::new(["live", "größe"]);

        let data = encode_payload(&tags);

        assert_eq!(data, "live\0größe\0".as_bytes());
        assert_eq!(decode_payload(&data), tags);
    }

    #[test]
    fn written_owner_is_the_full_v1_identifier() {
        assert_eq!(
            OWNER,
            "BlueBeats::Usertags::v1 - chocolatecakecodes@disroot.org"
        );
        assert!(is_usertags_owner(OWNER));
    }

    #[test]
    fn owner_matching_ignores_version() {
        assert!(is_usertags_owner("BlueBeats::Usertags::v1"));
        assert!(is_usertags_owner("BlueBeats::Usertags::v2 - someone"));
        assert!(!is_usertags_owner("WM/MediaClassPrimaryID"));
    }
}
