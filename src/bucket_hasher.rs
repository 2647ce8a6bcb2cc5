//! Key to bucket mapping.

use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;

/// Maps a key to a bucket index of a table with `buckets` slots.
///
/// Implementations must return an index in `[0, buckets)` and must be a pure
/// function of the key and the bucket count: the table never rehashes, so a
/// key has to land in the same bucket for as long as it is stored. `buckets`
/// is never zero when the table calls this.
pub trait BucketHasher<K: ?Sized> {
    fn bucket(&self, key: &K, buckets: usize) -> usize;
}

impl<K: ?Sized, F> BucketHasher<K> for F
where
    F: Fn(&K, usize) -> usize,
{
    #[inline]
    fn bucket(&self, key: &K, buckets: usize) -> usize {
        self(key, buckets)
    }
}

/// Bucket hasher over any `BuildHasher`: full hash reduced modulo the bucket count.
///
/// Any `Q` that a stored key borrows as hashes identically, so borrowed
/// lookups land in the right bucket.
#[derive(Clone, Debug, Default)]
pub struct HashBuckets<S = DefaultHashBuilder> {
    build: S,
}

impl<S> HashBuckets<S> {
    pub fn with_build_hasher(build: S) -> Self {
        Self { build }
    }

    pub fn build_hasher(&self) -> &S {
        &self.build
    }
}

impl<K, S> BucketHasher<K> for HashBuckets<S>
where
    K: ?Sized + Hash,
    S: BuildHasher,
{
    #[inline]
    fn bucket(&self, key: &K, buckets: usize) -> usize {
        (self.build.hash_one(key) % buckets as u64) as usize
    }
}
