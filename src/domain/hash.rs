use std::hash::{DefaultHasher, Hash, Hasher};

/// Entities whose hash mixes in a fixed per-type tag.
///
/// Two different entity types with identical field values never feed the
/// same byte stream into a hasher, so they stay apart when stored in a
/// shared hash-keyed structure.
pub trait TypeSalted {
    /// Per-type tag mixed into every hash of this type.
    const TYPE_TAG: &'static str;

    /// Feeds the field values (without the tag) into `state`.
    fn hash_fields<H: Hasher>(&self, state: &mut H);
}

/// Hashes `value` with an explicit salt instead of its own type tag.
pub fn salted_hash_with<T: TypeSalted>(value: &T, salt: &str, state: &mut impl Hasher) {
    salt.hash(state);
    value.hash_fields(state);
}

/// Hashes `value` the way its `Hash` impl does.
pub fn salted_hash<T: TypeSalted>(value: &T, state: &mut impl Hasher) {
    salted_hash_with(value, T::TYPE_TAG, state);
}

/// One-shot 64 bit digest of `value` under `salt`.
pub fn digest_with<T: TypeSalted>(value: &T, salt: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    salted_hash_with(value, salt, &mut hasher);
    hasher.finish()
}

/// One-shot 64 bit digest of `value` under its own type tag.
pub fn digest<T: TypeSalted>(value: &T) -> u64 {
    digest_with(value, T::TYPE_TAG)
}
