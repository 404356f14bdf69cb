use std::marker::PhantomData;

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, MapAccess},
    ser::{self, SerializeStruct},
};

use super::{Codec, Decode, FieldSchema, ListOf, Nullable, Tolerant};
use crate::domain::{Chapter, TagFields, TagSet, UserTags};

impl Serialize for Chapter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Chapter", 3)?;
        state.serialize_field("start", &self.start())?;
        state.serialize_field("end", &self.end())?;
        state.serialize_field("name", self.name())?;
        state.end()
    }
}

#[derive(Default)]
pub struct PartialChapter {
    start: Option<u64>,
    end: Option<u64>,
    name: Option<String>,
}

impl FieldSchema for Chapter {
    const TYPE_NAME: &'static str = "Chapter";
    const FIELDS: &'static [&'static str] = &["start", "end", "name"];
    type Partial = PartialChapter;

    fn read_field<'de, A>(
        _codec: &Codec,
        partial: &mut PartialChapter,
        field: &'static str,
        map: &mut A,
    ) -> Result<(), A::Error>
    where
        A: MapAccess<'de>,
    {
        match field {
            "start" => partial.start = Some(map.next_value()?),
            "end" => partial.end = Some(map.next_value()?),
            "name" => partial.name = Some(map.next_value()?),
            other => return Err(de::Error::unknown_field(other, Self::FIELDS)),
        }
        Ok(())
    }

    fn finish<E: de::Error>(partial: PartialChapter) -> Result<Self, E> {
        Ok(Chapter::new(
            partial.start.ok_or_else(|| E::missing_field("start"))?,
            partial.end.ok_or_else(|| E::missing_field("end"))?,
            partial.name.ok_or_else(|| E::missing_field("name"))?,
        ))
    }
}

impl Serialize for TagFields {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("TagFields", 4)?;
        state.serialize_field("title", &self.title())?;
        state.serialize_field("artist", &self.artist())?;
        state.serialize_field("genre", &self.genre())?;
        state.serialize_field("length", &self.length())?;
        state.end()
    }
}

/// Nullable members may also be missing; older encodings have no `genre`.
#[derive(Default)]
pub struct PartialTagFields {
    title: Option<String>,
    artist: Option<String>,
    genre: Option<String>,
    length: Option<u64>,
}

impl FieldSchema for TagFields {
    const TYPE_NAME: &'static str = "TagFields";
    const FIELDS: &'static [&'static str] = &["title", "artist", "genre", "length"];
    type Partial = PartialTagFields;

    fn read_field<'de, A>(
        _codec: &Codec,
        partial: &mut PartialTagFields,
        field: &'static str,
        map: &mut A,
    ) -> Result<(), A::Error>
    where
        A: MapAccess<'de>,
    {
        match field {
            "title" => partial.title = map.next_value()?,
            "artist" => partial.artist = map.next_value()?,
            "genre" => partial.genre = map.next_value()?,
            "length" => partial.length = Some(map.next_value()?),
            other => return Err(de::Error::unknown_field(other, Self::FIELDS)),
        }
        Ok(())
    }

    fn finish<E: de::Error>(partial: PartialTagFields) -> Result<Self, E> {
        let mut fields = TagFields::new();
        fields.set_title(partial.title);
        fields.set_artist(partial.artist);
        fields.set_genre(partial.genre);
        fields.set_length(partial.length.ok_or_else(|| E::missing_field("length"))?);
        Ok(fields)
    }
}

impl Serialize for UserTags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.tags())
    }
}

impl<'de> Deserialize<'de> for UserTags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Vec::<String>::deserialize(deserializer).map(UserTags::new)
    }
}

impl Serialize for TagSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let path = self
            .filepath()
            .to_str()
            .ok_or_else(|| <S::Error as ser::Error>::custom("file path is not valid UTF-8"))?;

        let mut state = serializer.serialize_struct("TagSet", 5)?;
        state.serialize_field("path", path)?;
        state.serialize_field("parsed", &self.is_parsed())?;
        state.serialize_field("tagFields", &self.tag_fields())?;
        state.serialize_field("userTags", &self.user_tags())?;
        state.serialize_field("chapters", &self.chapter_list())?;
        state.end()
    }
}

#[derive(Default)]
pub struct PartialTagSet {
    path: Option<String>,
    parsed: Option<bool>,
    tag_fields: Option<TagFields>,
    user_tags: Option<UserTags>,
    chapters: Option<Vec<Chapter>>,
}

impl FieldSchema for TagSet {
    const TYPE_NAME: &'static str = "TagSet";
    const FIELDS: &'static [&'static str] =
        &["path", "parsed", "tagFields", "userTags", "chapters"];
    type Partial = PartialTagSet;

    fn read_field<'de, A>(
        codec: &Codec,
        partial: &mut PartialTagSet,
        field: &'static str,
        map: &mut A,
    ) -> Result<(), A::Error>
    where
        A: MapAccess<'de>,
    {
        match field {
            "path" => partial.path = Some(map.next_value()?),
            "parsed" => partial.parsed = Some(map.next_value()?),
            "tagFields" => {
                partial.tag_fields = map.next_value_seed(Nullable(TagFields::seed(codec)))?
            }
            "userTags" => {
                partial.user_tags = map.next_value_seed(Nullable(UserTags::seed(codec)))?
            }
            "chapters" => {
                partial.chapters = map.next_value_seed(Nullable(Vec::<Chapter>::seed(codec)))?
            }
            other => return Err(de::Error::unknown_field(other, Self::FIELDS)),
        }
        Ok(())
    }

    fn finish<E: de::Error>(partial: PartialTagSet) -> Result<Self, E> {
        Ok(TagSet::restore(
            partial.path.ok_or_else(|| E::missing_field("path"))?,
            partial.parsed.ok_or_else(|| E::missing_field("parsed"))?,
            partial.tag_fields,
            partial.user_tags,
            partial.chapters,
        ))
    }
}

impl Decode for Chapter {
    type Seed<'c> = Tolerant<'c, Chapter>;

    fn seed(codec: &Codec) -> Self::Seed<'_> {
        Tolerant::new(codec)
    }
}

impl Decode for TagFields {
    type Seed<'c> = Tolerant<'c, TagFields>;

    fn seed(codec: &Codec) -> Self::Seed<'_> {
        Tolerant::new(codec)
    }
}

impl Decode for TagSet {
    type Seed<'c> = Tolerant<'c, TagSet>;

    fn seed(codec: &Codec) -> Self::Seed<'_> {
        Tolerant::new(codec)
    }
}

impl Decode for UserTags {
    type Seed<'c> = PhantomData<UserTags>;

    fn seed(_codec: &Codec) -> Self::Seed<'_> {
        PhantomData
    }
}

impl Decode for Vec<Chapter> {
    type Seed<'c> = ListOf<Tolerant<'c, Chapter>>;

    fn seed(codec: &Codec) -> Self::Seed<'_> {
        ListOf(Tolerant::new(codec))
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        codec::{Codec, CodecError},
        domain::{Chapter, TagFields, TagSet, UserTags},
    };

    fn codec() -> Codec {
        Codec::default()
    }

    fn example_set() -> TagSet {
        TagSet::restore(
            "/a.mp3",
            true,
            Some(
                TagFields::new()
                    .with_title("Song")
                    .with_artist("Band")
                    .with_length(180),
            ),
            Some(UserTags::new(["live"])),
            Some(vec![Chapter::new(0, 60, "Intro")]),
        )
    }

    #[test]
    fn chapter_encoding_has_fixed_field_order() {
        let text = codec().encode(&Chapter::new(1, 2, "x")).unwrap();

        assert_eq!(text, r#"{"start":1,"end":2,"name":"x"}"#);
    }

    #[test]
    fn tag_fields_encoding_writes_nulls() {
        let fields = TagFields::new().with_artist("Band").with_length(180);

        let text = codec().encode(&fields).unwrap();

        assert_eq!(
            text,
            r#"{"title":null,"artist":"Band","genre":null,"length":180}"#
        );
    }

    #[test]
    fn user_tags_encode_as_array() {
        let text = codec().encode(&UserTags::new(["rock", "favorite"])).unwrap();

        assert_eq!(text, r#"["rock","favorite"]"#);
    }

    #[test]
    fn tag_set_encoding_layout() {
        let text = codec().encode(&example_set()).unwrap();

        assert_eq!(
            text,
            concat!(
                r#"{"path":"/a.mp3","parsed":true,"#,
                r#""tagFields":{"title":"Song","artist":"Band","genre":null,"length":180},"#,
                r#""userTags":["live"],"#,
                r#""chapters":[{"start":0,"end":60,"name":"Intro"}]}"#
            )
        );
    }

    #[test]
    fn unparsed_tag_set_encodes_members_as_null() {
        let text = codec().encode(&TagSet::new("/b.mp3")).unwrap();

        assert_eq!(
            text,
            r#"{"path":"/b.mp3","parsed":false,"tagFields":null,"userTags":null,"chapters":null}"#
        );
    }

    #[test]
    fn example_tag_set_round_trips() {
        let codec = codec();
        let original = example_set();

        let decoded = codec
            .decode::<TagSet>(&codec.encode(&original).unwrap())
            .unwrap()
            .unwrap();

        assert_eq!(decoded, original);
        assert_eq!(decoded.filepath(), original.filepath());
        assert!(decoded.is_parsed());
        assert_eq!(decoded.tag_fields(), original.tag_fields());
        assert_eq!(decoded.user_tags(), original.user_tags());
        assert_eq!(decoded.chapters(), original.chapters());
    }

    #[test]
    fn members_round_trip() {
        let codec = codec();

        let chapter = Chapter::new(5, 10, "Verse");
        let fields = TagFields::new()
            .with_title("")
            .with_genre("Jazz")
            .with_length(0);
        let tags = UserTags::new(["a", "", "b"]);
        let empty_tags = UserTags::default();
        let chapters = vec![Chapter::new(0, 1, "a"), Chapter::new(1, 2, "b")];

        assert_eq!(
            codec.decode::<Chapter>(&codec.encode(&chapter).unwrap()).unwrap(),
            Some(chapter)
        );
        assert_eq!(
            codec.decode::<TagFields>(&codec.encode(&fields).unwrap()).unwrap(),
            Some(fields)
        );
        assert_eq!(
            codec.decode::<UserTags>(&codec.encode(&tags).unwrap()).unwrap(),
            Some(tags)
        );
        assert_eq!(
            codec
                .decode::<UserTags>(&codec.encode(&empty_tags).unwrap())
                .unwrap(),
            Some(empty_tags)
        );
        assert_eq!(
            codec
                .decode::<Vec<Chapter>>(&codec.encode(&chapters).unwrap())
                .unwrap(),
            Some(chapters)
        );
    }

    #[test]
    fn unparsed_and_partially_filled_sets_round_trip() {
        let codec = codec();

        for set in [
            TagSet::new("/music/new.mp3"),
            TagSet::restore("/x.mp3", true, Some(TagFields::new()), None, None),
            TagSet::restore("/y.mp3", true, None, Some(UserTags::default()), Some(vec![])),
        ] {
            let decoded = codec.decode::<TagSet>(&codec.encode(&set).unwrap()).unwrap();
            assert_eq!(decoded, Some(set));
        }
    }

    #[test]
    fn inverted_chapter_round_trips() {
        let codec = codec();
        let chapter = Chapter::new(90, 10, "backwards");

        let decoded = codec
            .decode::<Chapter>(&codec.encode(&chapter).unwrap())
            .unwrap();

        assert_eq!(decoded, Some(chapter));
    }

    #[test]
    fn unknown_chapter_field_is_skipped() {
        let codec = codec();

        let with_bogus = codec
            .decode::<Chapter>(r#"{"start":1,"end":2,"name":"x","bogus":true}"#)
            .unwrap();
        let without = codec
            .decode::<Chapter>(r#"{"start":1,"end":2,"name":"x"}"#)
            .unwrap();

        assert_eq!(with_bogus, without);
        assert_eq!(with_bogus, Some(Chapter::new(1, 2, "x")));
    }

    #[test]
    fn nested_unknown_fields_are_skipped() {
        let text = r#"{
            "version": 3,
            "path": "/a.mp3",
            "parsed": true,
            "tagFields": {"title":"Song","rating":5,"artist":"Band","genre":null,"length":180,"album":{"name":"A"}},
            "userTags": ["live"],
            "chapters": [{"start":0,"end":60,"name":"Intro","kind":"chapter"}],
            "artwork": null
        }"#;

        let decoded = codec().decode::<TagSet>(text).unwrap().unwrap();

        assert_eq!(decoded, example_set());
    }

    #[test]
    fn null_documents_decode_to_none() {
        let codec = codec();

        assert_eq!(codec.decode::<Chapter>("null").unwrap(), None);
        assert_eq!(codec.decode::<TagFields>("null").unwrap(), None);
        assert_eq!(codec.decode::<UserTags>("null").unwrap(), None);
        assert_eq!(codec.decode::<Vec<Chapter>>(" null ").unwrap(), None);
        assert_eq!(codec.decode::<TagSet>("null").unwrap(), None);
    }

    #[test]
    fn legacy_tag_fields_without_genre() {
        let fields = codec()
            .decode::<TagFields>(r#"{"title":"Song","artist":"Band","length":180}"#)
            .unwrap()
            .unwrap();

        assert_eq!(fields.genre(), None);
        assert_eq!(
            fields,
            TagFields::new()
                .with_title("Song")
                .with_artist("Band")
                .with_length(180)
        );
    }

    #[test]
    fn missing_nullable_members_decode_as_absent() {
        let set = codec()
            .decode::<TagSet>(r#"{"path":"/old.mp3","parsed":false}"#)
            .unwrap()
            .unwrap();

        assert_eq!(set, TagSet::new("/old.mp3"));
    }

    #[test]
    fn missing_required_fields_are_structural_errors() {
        let codec = codec();

        for result in [
            codec.decode::<Chapter>(r#"{"start":1,"name":"x"}"#).map(|_| ()),
            codec.decode::<TagFields>(r#"{"title":"t"}"#).map(|_| ()),
            codec.decode::<TagSet>(r#"{"parsed":true}"#).map(|_| ()),
        ] {
            assert!(matches!(result, Err(CodecError::StructuralDecode(_))));
        }
    }

    #[test]
    fn array_where_object_expected_is_a_structural_error() {
        let err = codec()
            .decode::<TagFields>(r#"["Song","Band",null,180]"#)
            .unwrap_err();

        assert!(matches!(err, CodecError::StructuralDecode(_)));
    }

    #[test]
    fn wrong_value_types_are_structural_errors() {
        let codec = codec();

        let cases = [
            codec.decode::<TagFields>(r#"{"title":1,"artist":null,"length":1}"#).map(|_| ()),
            codec
                .decode::<TagFields>(r#"{"title":null,"artist":null,"length":"long"}"#)
                .map(|_| ()),
            codec.decode::<Chapter>(r#"{"start":-1,"end":2,"name":"x"}"#).map(|_| ()),
            codec.decode::<Chapter>(r#"{"start":1,"end":2,"name":null}"#).map(|_| ()),
            codec.decode::<UserTags>(r#"["ok", 3]"#).map(|_| ()),
            codec.decode::<UserTags>(r#"{"tags":["a"]}"#).map(|_| ()),
            codec.decode::<TagSet>(r#"{"path":"/a","parsed":"yes"}"#).map(|_| ()),
            codec.decode::<TagSet>(r#"{"path":"/a","parsed":true,"chapters":{}}"#).map(|_| ()),
        ];

        for result in cases {
            assert!(matches!(result, Err(CodecError::StructuralDecode(_))));
        }
    }

    #[test]
    fn nested_malformed_member_fails_whole_set() {
        let err = codec()
            .decode::<TagSet>(
                r#"{"path":"/a.mp3","parsed":true,"tagFields":["Song"],"userTags":null,"chapters":null}"#,
            )
            .unwrap_err();

        assert!(matches!(err, CodecError::StructuralDecode(_)));
    }

    #[test]
    fn duplicate_field_is_a_structural_error() {
        let err = codec()
            .decode::<Chapter>(r#"{"start":1,"start":2,"end":3,"name":"x"}"#)
            .unwrap_err();

        assert!(matches!(err, CodecError::StructuralDecode(_)));
    }
}
