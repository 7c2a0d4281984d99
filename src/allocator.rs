//! The allocation strategy behind [`RawStorage`](crate::RawStorage).
//!
//! A strategy only has to *acquire* a block for a layout and *release* it again.
//! Running out of memory is reported as a [`ReserveError`], never as an abort,
//! so every container operation can roll back instead.

use alloc::alloc::{alloc, dealloc};
use core::{alloc::Layout, ptr::NonNull};

use crate::ReserveError;

/// A source of raw memory blocks.
///
/// Strategies are cloned whenever a container needs a second block (during
/// growth, or when cloning the container), so handles should be cheap to clone.
///
/// # Safety
///
/// - A block returned by [`acquire`](Allocator::acquire) must be valid for reads and
///   writes of `layout.size()` bytes, aligned to `layout.align()`, and must stay
///   valid until it is passed to [`release`](Allocator::release).
/// - A block acquired through one clone may be released through any other clone.
pub unsafe trait Allocator: Clone {
    /// Acquires a block for `layout`.
    ///
    /// `layout.size()` is never zero: empty storage never reaches the strategy.
    fn acquire(&self, layout: Layout) -> Result<NonNull<u8>, ReserveError>;

    /// Releases a block previously returned by [`acquire`](Allocator::acquire).
    ///
    /// # Safety
    /// `ptr` must come from `acquire` with the same `layout` and must not be used afterwards.
    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout);
}

/// The global allocator, through [`alloc::alloc`].
///
/// # Examples
///
/// ```
/// # use dynarray::{DynArray, Global};
/// let vec: DynArray<u32, Global> = DynArray::new_in(Global);
/// assert!(vec.is_empty());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Global;

unsafe impl Allocator for Global {
    #[inline]
    fn acquire(&self, layout: Layout) -> Result<NonNull<u8>, ReserveError> {
        debug_assert!(layout.size() != 0, "zero sized blocks are never acquired");
        // SAFETY: the layout has a non-zero size.
        let ptr = unsafe { alloc(layout) };
        NonNull::new(ptr).ok_or(ReserveError::AllocError { layout })
    }

    #[inline]
    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: see the trait contract.
        unsafe { dealloc(ptr.as_ptr(), layout) }
    }
}

unsafe impl<A: Allocator> Allocator for &A {
    #[inline]
    fn acquire(&self, layout: Layout) -> Result<NonNull<u8>, ReserveError> {
        (**self).acquire(layout)
    }

    #[inline]
    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { (**self).release(ptr, layout) }
    }
}
