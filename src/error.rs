//! Error types for fallible storage and element operations.

use core::{alloc::Layout, convert::Infallible};
use thiserror::Error;

/// The error type for `try_reserve`-style methods.
///
/// When one of these is returned the container is exactly as it was
/// before the call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ReserveError {
    /// The requested capacity does not fit in `isize::MAX` bytes.
    #[error("capacity overflow")]
    CapacityOverflow,

    /// The allocation strategy could not provide a block for `layout`.
    #[error("memory allocation failed for {layout:?}")]
    AllocError {
        /// The layout of the rejected request.
        layout: Layout,
    },
}

/// The error type for operations that construct elements with a fallible closure,
/// such as [`DynArray::try_emplace_with`](crate::DynArray::try_emplace_with).
///
/// Either the storage could not be obtained, or the element constructor
/// returned `Err`. In both cases every element constructed by the failing call
/// has been dropped and the length is back to its value before the call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum EmplaceError<E> {
    /// Storage for the new elements could not be obtained.
    #[error(transparent)]
    Reserve(#[from] ReserveError),

    /// The element constructor failed.
    #[error("element construction failed: {0}")]
    Element(E),
}

impl<E> EmplaceError<E> {
    /// Returns the constructor error, if that is what failed.
    #[inline]
    pub fn into_element(self) -> Option<E> {
        match self {
            Self::Element(err) => Some(err),
            Self::Reserve(_) => None,
        }
    }
}

impl EmplaceError<Infallible> {
    /// Narrows an error whose constructor cannot fail.
    #[inline]
    pub fn into_reserve(self) -> ReserveError {
        match self {
            Self::Reserve(err) => err,
            Self::Element(never) => match never {},
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::string::ToString;

    #[test]
    fn messages() {
        assert_eq!(ReserveError::CapacityOverflow.to_string(), "capacity overflow");

        let err: EmplaceError<&str> = EmplaceError::Element("bad input");
        assert_eq!(err.to_string(), "element construction failed: bad input");

        let err: EmplaceError<&str> = ReserveError::CapacityOverflow.into();
        assert_eq!(err.to_string(), "capacity overflow");
        assert_eq!(err.into_element(), None);
    }

    #[test]
    fn infallible_narrowing() {
        let layout = Layout::new::<u64>();
        let err: EmplaceError<Infallible> = ReserveError::AllocError { layout }.into();
        assert_eq!(err.into_reserve(), ReserveError::AllocError { layout });
    }
}
