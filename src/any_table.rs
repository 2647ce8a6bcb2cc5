//! AnyTable: ownership chosen at run time from a `TableConfig`.
//!
//! Both variants run the same generic table code; only the policy type
//! differs. Removals report payloads uniformly: `None` when the table
//! destroyed them, `Some` when it handed them back.

use crate::bucket_hasher::{BucketHasher, HashBuckets};
use crate::chain_table::{BorrowingTable, HashTable, Iter, OwningTable};
use crate::config::TableConfig;
use crate::error::{Rejected, TableError};
use core::borrow::Borrow;
use log::debug;

#[derive(Debug)]
pub enum AnyTable<K, V, H = HashBuckets> {
    Owning(OwningTable<K, V, H>),
    Borrowing(BorrowingTable<K, V, H>),
}

impl<K: Eq, V> AnyTable<K, V> {
    /// Table with the default bucket hasher and the ownership flag given at run time.
    pub fn new(buckets: usize, take_ownership: bool) -> Result<Self, TableError> {
        Self::from_config(
            &TableConfig::new(buckets).take_ownership(take_ownership),
            HashBuckets::default(),
        )
    }
}

impl<K: Eq, V, H> AnyTable<K, V, H> {
    pub fn from_config(config: &TableConfig, hasher: H) -> Result<Self, TableError> {
        debug!("building table from {:?}", config);
        Ok(if config.takes_ownership() {
            AnyTable::Owning(HashTable::from_config(config, hasher)?)
        } else {
            AnyTable::Borrowing(HashTable::from_config(config, hasher)?)
        })
    }

    pub fn takes_ownership(&self) -> bool {
        matches!(self, AnyTable::Owning(_))
    }

    pub fn len(&self) -> usize {
        match self {
            AnyTable::Owning(t) => t.len(),
            AnyTable::Borrowing(t) => t.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bucket_count(&self) -> usize {
        match self {
            AnyTable::Owning(t) => t.bucket_count(),
            AnyTable::Borrowing(t) => t.bucket_count(),
        }
    }

    pub fn insert(&mut self, key: K, value: V) -> Result<(), Rejected<(K, V)>>
    where
        H: BucketHasher<K>,
    {
        match self {
            AnyTable::Owning(t) => t.insert(key, value),
            AnyTable::Borrowing(t) => t.insert(key, value),
        }
    }

    /// Swap the stored value; the old one comes back only from a borrowing table.
    pub fn replace<Q>(&mut self, key: &Q, value: V) -> Result<Option<V>, Rejected<V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: BucketHasher<Q>,
    {
        match self {
            AnyTable::Owning(t) => t.replace(key, value).map(|()| None),
            AnyTable::Borrowing(t) => t.replace(key, value).map(Some),
        }
    }

    /// Remove the entry; its payloads come back only from a borrowing table.
    pub fn delete<Q>(&mut self, key: &Q) -> Result<Option<(K, V)>, TableError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: BucketHasher<Q>,
    {
        match self {
            AnyTable::Owning(t) => t.delete(key).map(|((), ())| None),
            AnyTable::Borrowing(t) => t.delete(key).map(Some),
        }
    }

    pub fn find<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: BucketHasher<Q>,
    {
        match self {
            AnyTable::Owning(t) => t.find(key),
            AnyTable::Borrowing(t) => t.find(key),
        }
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: BucketHasher<Q>,
    {
        self.find(key).is_some()
    }

    /// Empty the table. A borrowing table returns every pair; an owning one
    /// destroys them and returns nothing.
    pub fn clear(&mut self) -> Vec<(K, V)> {
        match self {
            AnyTable::Owning(t) => {
                t.clear();
                Vec::new()
            }
            AnyTable::Borrowing(t) => t.clear(),
        }
    }

    pub fn process<F>(&self, visitor: F)
    where
        F: FnMut(&K, &V),
    {
        match self {
            AnyTable::Owning(t) => t.process(visitor),
            AnyTable::Borrowing(t) => t.process(visitor),
        }
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        match self {
            AnyTable::Owning(t) => t.iter(),
            AnyTable::Borrowing(t) => t.iter(),
        }
    }

    /// See [`HashTable::destruct`]: live entries are leaked, not destroyed.
    pub fn destruct(self) -> usize {
        match self {
            AnyTable::Owning(t) => t.destruct(),
            AnyTable::Borrowing(t) => t.destruct(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{init_test_logger, DropLog, Tracked};

    #[test]
    fn flag_selects_policy() {
        init_test_logger();
        let owning: AnyTable<u32, u32> = AnyTable::new(4, true).unwrap();
        let borrowing: AnyTable<u32, u32> = AnyTable::new(4, false).unwrap();
        assert!(owning.takes_ownership());
        assert!(!borrowing.takes_ownership());
        assert_eq!(owning.bucket_count(), 4);
    }

    #[test]
    fn owning_variant_destroys_on_removal() {
        let log = DropLog::default();
        let mut t: AnyTable<Tracked, Tracked> = AnyTable::new(2, true).unwrap();
        t.insert(log.track("a"), log.track("va")).unwrap();
        t.insert(log.track("b"), log.track("vb")).unwrap();

        assert!(t.replace("a", log.track("va2")).unwrap().is_none());
        assert_eq!(log.drops_of("va"), 1);

        assert!(t.delete("a").unwrap().is_none());
        assert_eq!(log.drops_of("a"), 1);
        assert_eq!(log.drops_of("va2"), 1);

        assert!(t.clear().is_empty());
        assert_eq!(log.drops_of("b"), 1);
        assert_eq!(log.drops_of("vb"), 1);
        assert_eq!(log.total(), 5);
    }

    #[test]
    fn borrowing_variant_hands_payloads_back() {
        let log = DropLog::default();
        let mut t: AnyTable<Tracked, Tracked> = AnyTable::new(2, false).unwrap();
        t.insert(log.track("a"), log.track("va")).unwrap();
        t.insert(log.track("b"), log.track("vb")).unwrap();

        let old = t.replace("a", log.track("va2")).unwrap().expect("old value");
        assert_eq!(old.name(), "va");
        let (k, v) = t.delete("a").unwrap().expect("pair");
        assert_eq!((k.name(), v.name()), ("a", "va2"));
        let rest = t.clear();
        assert_eq!(rest.len(), 1);
        assert_eq!(log.total(), 0, "nothing destroyed by the table");

        drop((old, k, v, rest));
        assert_eq!(log.total(), 5);
    }

    #[test]
    fn lookups_and_iteration_delegate() {
        let mut t: AnyTable<String, i32> = AnyTable::new(3, false).unwrap();
        for (i, k) in ["x", "y", "z"].into_iter().enumerate() {
            t.insert(k.to_string(), i as i32).unwrap();
        }
        assert_eq!(t.len(), 3);
        assert_eq!(t.find("y"), Some(&1));
        assert!(t.contains_key("z"));
        assert!(!t.contains_key("w"));
        assert_eq!(t.iter().count(), 3);
        let mut sum = 0;
        t.process(|_, v| sum += *v);
        assert_eq!(sum, 3);
        assert_eq!(t.insert("x".into(), 9).unwrap_err().error, TableError::DuplicateKey);
        assert_eq!(t.destruct(), 3);
    }

    #[test]
    fn config_budget_is_honored() {
        let cfg = TableConfig::new(2).take_ownership(false).max_entries(1);
        let mut t: AnyTable<u8, u8> = AnyTable::from_config(&cfg, HashBuckets::default()).unwrap();
        t.insert(1, 1).unwrap();
        let err = t.insert(2, 2).unwrap_err();
        assert_eq!(err.error, TableError::NodeAlloc { limit: 1 });
        assert_eq!(err.payload, (2, 2));
    }
}
