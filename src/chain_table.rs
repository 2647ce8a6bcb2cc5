//! HashTable: fixed bucket array of singly-linked chains, with nodes held in a
//! slotmap arena and linked by arena keys.

use crate::bucket_hasher::{BucketHasher, HashBuckets};
use crate::config::TableConfig;
use crate::error::{Rejected, TableError};
use crate::ownership::{Borrowing, Ownership, Owning};
use crate::reentrancy::DebugReentrancy;
use core::borrow::Borrow;
use core::fmt;
use core::iter::FusedIterator;
use core::marker::PhantomData;
use log::{debug, trace, warn};
use slotmap::{DefaultKey, SlotMap};

#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    next: Option<DefaultKey>,
}

/// A matched node and the link that points at it.
#[derive(Clone, Copy, Debug)]
struct Hit {
    bucket: usize,
    prev: Option<DefaultKey>,
    node: DefaultKey,
}

/// Separate-chaining hash table with a fixed number of buckets.
///
/// `O` decides what happens to payloads that leave the table (see
/// [`Ownership`]); `H` maps keys to buckets. The bucket count never changes,
/// so chains grow without bound as the table fills.
pub struct HashTable<K, V, O = Owning, H = HashBuckets> {
    buckets: Vec<Option<DefaultKey>>,
    nodes: SlotMap<DefaultKey, Node<K, V>>,
    hasher: H,
    max_entries: Option<usize>,
    reentrancy: DebugReentrancy,
    _policy: PhantomData<O>,
}

pub type OwningTable<K, V, H = HashBuckets> = HashTable<K, V, Owning, H>;
pub type BorrowingTable<K, V, H = HashBuckets> = HashTable<K, V, Borrowing, H>;

/// What a removal yields for one entry: `((), ())` when the table owns its
/// payloads, `(K, V)` when it does not.
pub type Released<O, K, V> = (<O as Ownership>::Released<K>, <O as Ownership>::Released<V>);

fn alloc_buckets(n: usize) -> Result<Vec<Option<DefaultKey>>, TableError> {
    let mut buckets = Vec::new();
    buckets.try_reserve_exact(n).map_err(|e| {
        warn!("bucket array of {} slots unavailable: {}", n, e);
        TableError::BucketAlloc { buckets: n }
    })?;
    buckets.resize(n, None);
    Ok(buckets)
}

impl<K, V, O> HashTable<K, V, O>
where
    K: Eq,
    O: Ownership,
{
    /// Table with `buckets` empty chains and the default bucket hasher.
    pub fn new(buckets: usize) -> Result<Self, TableError> {
        Self::with_hasher(buckets, HashBuckets::default())
    }
}

impl<K, V, O, H> HashTable<K, V, O, H>
where
    K: Eq,
    O: Ownership,
{
    /// Table with `buckets` empty chains and a caller-supplied bucket hasher.
    pub fn with_hasher(buckets: usize, hasher: H) -> Result<Self, TableError> {
        let buckets = alloc_buckets(buckets)?;
        debug!(
            "chain table: {} buckets, take_ownership = {}",
            buckets.len(),
            O::TAKES_OWNERSHIP
        );
        Ok(Self {
            buckets,
            nodes: SlotMap::with_key(),
            hasher,
            max_entries: None,
            reentrancy: DebugReentrancy::new(),
            _policy: PhantomData,
        })
    }

    /// Build from a config whose ownership flag must match `O`.
    pub fn from_config(config: &TableConfig, hasher: H) -> Result<Self, TableError> {
        if config.takes_ownership() != O::TAKES_OWNERSHIP {
            return Err(TableError::OwnershipMismatch {
                requested: config.takes_ownership(),
                actual: O::TAKES_OWNERSHIP,
            });
        }
        let mut table = Self::with_hasher(config.buckets(), hasher)?;
        table.max_entries = config.entry_limit();
        Ok(table)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Fixed number of buckets chosen at construction.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Whether removed payloads are destroyed rather than handed back.
    pub fn takes_ownership(&self) -> bool {
        O::TAKES_OWNERSHIP
    }

    /// Entry budget from the config, if any.
    pub fn max_entries(&self) -> Option<usize> {
        self.max_entries
    }

    /// The bucket hasher.
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Entries per bucket. Zero for a table without buckets.
    pub fn load_factor(&self) -> f64 {
        if self.buckets.is_empty() {
            return 0.0;
        }
        self.nodes.len() as f64 / self.buckets.len() as f64
    }

    /// Length of the chain in `bucket`, or `None` if there is no such bucket.
    pub fn chain_len(&self, bucket: usize) -> Option<usize> {
        let mut cur = *self.buckets.get(bucket)?;
        let mut n = 0;
        while let Some(k) = cur {
            n += 1;
            cur = self.nodes.get(k).and_then(|node| node.next);
        }
        Some(n)
    }

    fn bucket_of<Q>(&self, q: &Q) -> Result<usize, TableError>
    where
        Q: ?Sized,
        H: BucketHasher<Q>,
    {
        let buckets = self.buckets.len();
        if buckets == 0 {
            return Err(TableError::NoBuckets);
        }
        let index = self.hasher.bucket(q, buckets);
        if index >= buckets {
            return Err(TableError::BucketOutOfRange { index, buckets });
        }
        Ok(index)
    }

    fn scan<Q>(&self, bucket: usize, q: &Q) -> Option<Hit>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let mut prev = None;
        let mut cur = self.buckets[bucket];
        while let Some(k) = cur {
            let node = self.nodes.get(k)?;
            if node.key.borrow() == q {
                return Some(Hit {
                    bucket,
                    prev,
                    node: k,
                });
            }
            prev = cur;
            cur = node.next;
        }
        None
    }

    fn locate<Q>(&self, q: &Q) -> Result<Hit, TableError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: BucketHasher<Q>,
    {
        let bucket = self.bucket_of(q)?;
        self.scan(bucket, q).ok_or(TableError::NotFound)
    }

    /// Add a new entry at the head of its chain.
    ///
    /// Fails without touching the table if the key is already present, the
    /// table has no buckets, or the entry budget is spent; key and value come
    /// back inside the error.
    pub fn insert(&mut self, key: K, value: V) -> Result<(), Rejected<(K, V)>>
    where
        H: BucketHasher<K>,
    {
        let _g = self.reentrancy.enter("insert");
        let bucket = match self.bucket_of(&key) {
            Ok(b) => b,
            Err(e) => return Err(Rejected::new(e, (key, value))),
        };
        if self.scan(bucket, &key).is_some() {
            trace!("insert rejected: duplicate key in bucket {}", bucket);
            return Err(Rejected::new(TableError::DuplicateKey, (key, value)));
        }
        if let Some(limit) = self.max_entries {
            if self.nodes.len() >= limit {
                warn!("insert rejected: entry budget of {} exhausted", limit);
                return Err(Rejected::new(TableError::NodeAlloc { limit }, (key, value)));
            }
        }
        let next = self.buckets[bucket];
        let k = self.nodes.insert(Node { key, value, next });
        self.buckets[bucket] = Some(k);
        Ok(())
    }

    /// Swap the value stored under `key`, releasing the old one through the
    /// ownership policy. The stored key is kept.
    ///
    /// If the key is absent the new value is handed back, not adopted.
    pub fn replace<Q>(&mut self, key: &Q, value: V) -> Result<O::Released<V>, Rejected<V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: BucketHasher<Q>,
    {
        let old = {
            let _g = self.reentrancy.enter("replace");
            let hit = match self.locate(key) {
                Ok(hit) => hit,
                Err(e) => return Err(Rejected::new(e, value)),
            };
            match self.nodes.get_mut(hit.node) {
                Some(node) => core::mem::replace(&mut node.value, value),
                None => return Err(Rejected::new(TableError::NotFound, value)),
            }
        };
        // The table is consistent again; the old value's Drop may run user code.
        Ok(O::release(old))
    }

    /// Unlink and remove the entry for `key`, releasing its value and key.
    pub fn delete<Q>(&mut self, key: &Q) -> Result<Released<O, K, V>, TableError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: BucketHasher<Q>,
    {
        let node = {
            let _g = self.reentrancy.enter("delete");
            let hit = self.locate(key)?;
            let node = self.nodes.remove(hit.node).ok_or(TableError::NotFound)?;
            // Head and interior nodes differ only in which link is rewritten.
            match hit.prev {
                Some(p) => self.nodes[p].next = node.next,
                None => self.buckets[hit.bucket] = node.next,
            }
            node
        };
        let value = O::release(node.value);
        let key = O::release(node.key);
        Ok((key, value))
    }

    /// Borrow the value stored under `key`.
    pub fn find<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: BucketHasher<Q>,
    {
        let _g = self.reentrancy.enter("find");
        let hit = self.locate(key).ok()?;
        self.nodes.get(hit.node).map(|n| &n.value)
    }

    pub fn find_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: BucketHasher<Q>,
    {
        let _g = self.reentrancy.enter("find_mut");
        let hit = self.locate(key).ok()?;
        self.nodes.get_mut(hit.node).map(|n| &mut n.value)
    }

    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: BucketHasher<Q>,
    {
        let _g = self.reentrancy.enter("get_key_value");
        let hit = self.locate(key).ok()?;
        self.nodes.get(hit.node).map(|n| (&n.key, &n.value))
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: BucketHasher<Q>,
    {
        let _g = self.reentrancy.enter("contains_key");
        self.locate(key).is_ok()
    }

    /// Remove every entry, releasing keys and values bucket by bucket in chain
    /// order. The bucket array is kept and the table stays usable.
    ///
    /// One pair per removed entry comes back. Under [`Owning`] the pairs are
    /// `((), ())`, so only the length carries information and the vector never
    /// allocates.
    ///
    /// The table is emptied before any payload is dropped: a panicking `Drop`
    /// leaves it empty with its buckets intact.
    pub fn clear(&mut self) -> Vec<Released<O, K, V>> {
        let (order, mut nodes) = {
            let _g = self.reentrancy.enter("clear");
            let mut order = Vec::with_capacity(self.nodes.len());
            for head in self.buckets.iter_mut() {
                let mut cur = head.take();
                while let Some(k) = cur {
                    order.push(k);
                    cur = self.nodes.get(k).and_then(|n| n.next);
                }
            }
            let nodes = core::mem::replace(&mut self.nodes, SlotMap::with_key());
            (order, nodes)
        };
        debug!("chain table clearing {} entries", order.len());
        let mut released = Vec::with_capacity(order.len());
        for k in order {
            if let Some(node) = nodes.remove(k) {
                let key = O::release(node.key);
                let value = O::release(node.value);
                released.push((key, value));
            }
        }
        released
    }

    /// Call `visitor` on every entry, bucket by bucket in chain order.
    pub fn process<F>(&self, mut visitor: F)
    where
        F: FnMut(&K, &V),
    {
        for (k, v) in self.iter() {
            visitor(k, v);
        }
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: self.buckets.iter(),
            nodes: &self.nodes,
            cur: None,
            remaining: self.nodes.len(),
        }
    }

    /// Release the bucket array without destroying live entries.
    ///
    /// Entries still in the table are leaked, payloads included; call
    /// [`clear`](Self::clear) first for a full teardown. Returns how many
    /// entries were abandoned.
    pub fn destruct(self) -> usize {
        let HashTable { buckets, nodes, .. } = self;
        let abandoned = nodes.len();
        if abandoned > 0 {
            warn!(
                "chain table destructed with {} live entries; their payloads are leaked",
                abandoned
            );
        }
        core::mem::forget(nodes);
        drop(buckets);
        abandoned
    }
}

impl<K, V, O, H> fmt::Debug for HashTable<K, V, O, H>
where
    O: Ownership,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashTable")
            .field("buckets", &self.buckets.len())
            .field("len", &self.nodes.len())
            .field("take_ownership", &O::TAKES_OWNERSHIP)
            .field("max_entries", &self.max_entries)
            .finish()
    }
}

/// Iterator over entries in bucket order, then chain order.
pub struct Iter<'a, K, V> {
    buckets: core::slice::Iter<'a, Option<DefaultKey>>,
    nodes: &'a SlotMap<DefaultKey, Node<K, V>>,
    cur: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;
        loop {
            if let Some(k) = self.cur {
                let node = nodes.get(k)?;
                self.cur = node.next;
                self.remaining = self.remaining.saturating_sub(1);
                return Some((&node.key, &node.value));
            }
            self.cur = *self.buckets.next()?;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<'a, K, V, O, H> IntoIterator for &'a HashTable<K, V, O, H>
where
    K: Eq,
    O: Ownership,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
