//! Payload ownership policies.
//!
//! A table either owns its payloads, destroying every key and value it
//! removes, overwrites or clears, or it only holds them on the caller's
//! behalf and hands each one back when it leaves the table. The choice is a
//! type parameter so that every removal path goes through `release` and no
//! code path can forget to honor it.

/// How a table disposes of payloads that leave it.
pub trait Ownership {
    /// Whether the table destroys the payloads it removes.
    const TAKES_OWNERSHIP: bool;

    /// What a removal yields to the caller for one payload.
    type Released<T>;

    /// Dispose of a payload that has just left the table.
    fn release<T>(payload: T) -> Self::Released<T>;
}

/// The table destroys payloads on removal; callers get `()` back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Owning;

impl Ownership for Owning {
    const TAKES_OWNERSHIP: bool = true;

    type Released<T> = ();

    #[inline]
    fn release<T>(payload: T) -> Self::Released<T> {
        drop(payload)
    }
}

/// The caller keeps responsibility; removed payloads are handed back intact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Borrowing;

impl Ownership for Borrowing {
    const TAKES_OWNERSHIP: bool = false;

    type Released<T> = T;

    #[inline]
    fn release<T>(payload: T) -> Self::Released<T> {
        payload
    }
}
