//! Storage operations executed by [`Handler`]s.
//!
//! Each operation wraps its argument, so a single storage type may implement
//! [`Handler`] for many of them.

use std::marker::PhantomData;

use crate::Handler;

/// Stores a new value.
#[derive(Clone, Copy, Debug)]
pub struct Insert<T>(pub T);

/// Overwrites an already stored value.
#[derive(Clone, Copy, Debug)]
pub struct Update<T>(pub T);

/// Removes a stored value.
#[derive(Clone, Copy, Debug)]
pub struct Delete<T>(pub T);

/// Reads a stored value.
#[derive(Clone, Copy, Debug)]
pub struct Select<T>(pub T);

/// Reads a stored value, holding it from concurrent modification until the
/// current transaction ends.
#[derive(Clone, Copy, Debug)]
pub struct Lock<T>(pub T);

/// Starts a transaction.
#[derive(Clone, Copy, Debug)]
pub struct Transact;

/// Storage handle returned by [`Transact`].
pub type Transacted<T> = <T as Handler<Transact>>::Ok;

/// Commits the current transaction.
#[derive(Clone, Copy, Debug)]
pub struct Commit;

/// Key `B` selecting values of type `W`.
///
/// Disambiguates operations reading different values by the same key type.
#[derive(Clone, Copy, Debug)]
pub struct By<W, B> {
    /// Selected value type.
    _what: PhantomData<W>,

    /// Key to select by.
    key: B,
}

impl<W, B> By<W, B> {
    /// Creates a new [`By`] selector of the provided `key`.
    #[must_use]
    pub const fn new(key: B) -> Self {
        Self {
            _what: PhantomData,
            key,
        }
    }

    /// Returns the key of this [`By`] selector.
    #[must_use]
    pub fn into_inner(self) -> B {
        self.key
    }
}
