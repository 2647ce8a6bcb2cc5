//! chain-table: a fixed-capacity, separate-chaining hash table with an
//! explicit policy for who destroys the payloads it stores.
//!
//! Internal Design:
//!
//! Summary
//! - `HashTable<K, V, O, H>` keeps `size` bucket heads and a slotmap arena
//!   of nodes. Each node holds a key, a value and the arena key of the next
//!   node in its chain, so chains are singly-linked lists without raw
//!   pointers.
//! - `O: Ownership` decides what happens to a payload that leaves the
//!   table. `Owning` destroys it; `Borrowing` hands it back to the caller.
//!   Every removal path (replace, delete, clear) funnels through
//!   `O::release`.
//! - `H: BucketHasher<K>` maps a key to a bucket for a table of a given
//!   size. `HashBuckets` reduces any `BuildHasher` modulo the bucket count;
//!   plain closures work too.
//! - `AnyTable` picks the ownership policy at run time from a
//!   `TableConfig`.
//!
//! Constraints
//! - Fixed capacity: the bucket count is set at construction and never
//!   changes. There is no rehashing, so a stored key always lives in the
//!   bucket its hash names, and chains grow without bound.
//! - Unique keys: inserting an equal key fails; the table is unchanged.
//! - All-or-nothing: a failed operation leaves the table as it was and
//!   gives payloads passed by value back inside `Rejected`.
//! - Single-threaded, `!Send`/`!Sync`: no internal synchronization.
//!
//! Allocation
//! - The bucket array is reserved fallibly; failure is reported as
//!   `TableError::BucketAlloc`.
//! - Entry nodes come from the arena. An optional entry budget
//!   (`TableConfig::max_entries`) bounds them and reports exhaustion as
//!   `TableError::NodeAlloc`.
//!
//! Teardown
//! - `clear` releases every entry through the policy and keeps the bucket
//!   array. `destruct` releases the bucket array only and leaks whatever
//!   entries remain; `clear` then `destruct` is the full teardown. A table
//!   that simply goes out of scope drops everything it holds.
//!
//! Reentrancy
//! - Chain scans call user code (`K: Eq`, the bucket hasher). A debug-only
//!   guard panics if that code re-enters the same table. Payloads are
//!   released only after the table is consistent again, so their `Drop`
//!   runs outside the guard.

mod any_table;
pub mod bucket_hasher;
pub mod chain_table;
mod chain_table_proptest;
mod config;
mod error;
pub mod ownership;
mod reentrancy;
mod test_support;

// Public surface
pub use any_table::AnyTable;
pub use bucket_hasher::{BucketHasher, HashBuckets};
pub use chain_table::{BorrowingTable, HashTable, OwningTable, Released};
pub use config::TableConfig;
pub use error::{Rejected, TableError};
pub use ownership::{Borrowing, Ownership, Owning};
pub use reentrancy::DebugReentrancy;
