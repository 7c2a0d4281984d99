use alloc::alloc::handle_alloc_error;
use core::{
    alloc::Layout,
    fmt,
    marker::PhantomData,
    mem,
    ptr::NonNull,
};

use crate::{
    Allocator, Global, ReserveError,
    utils::{IsZST, trace},
};

/// An owned block of uninitialized memory with room for `capacity` values of `T`.
///
/// This type never inspects the memory it manages. Dropping it *will* free the
/// block, but it *won't* drop anything stored inside; tracking which slots hold
/// live values is the job of the owner (see [`DynArray`](crate::DynArray)).
///
/// A capacity of zero means no block is held and no allocation was ever made.
/// The block is never shared and never copied: moving a `RawStorage` transfers it,
/// and [`take`](RawStorage::take) moves it out leaving an empty storage behind.
///
/// # Examples
///
/// ```
/// # use dynarray::RawStorage;
/// let mut storage = RawStorage::<String>::with_capacity(4);
/// assert_eq!(storage.capacity(), 4);
///
/// unsafe {
///     storage.slot(0).write("hello".to_string());
///     // The storage does not know this slot is live, so drop it by hand.
///     core::ptr::drop_in_place(storage.slot(0));
/// }
///
/// storage.release();
/// assert_eq!(storage.capacity(), 0);
/// ```
///
/// # ZST support
///
/// Zero sized types never touch the allocation strategy; the requested
/// capacity is only recorded.
pub struct RawStorage<T, A: Allocator = Global> {
    ptr: NonNull<T>,
    cap: usize,
    alloc: A,
    _marker: PhantomData<T>,
}

unsafe impl<T, A: Allocator> Send for RawStorage<T, A>
where
    T: Send,
    A: Send,
{
}
unsafe impl<T, A: Allocator> Sync for RawStorage<T, A>
where
    T: Sync,
    A: Sync,
{
}

impl<T, A: Allocator> Drop for RawStorage<T, A> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T> RawStorage<T, Global> {
    /// Creates an empty storage. Does not allocate.
    #[inline]
    pub const fn new() -> Self {
        Self::new_in(Global)
    }

    /// Allocates room for exactly `capacity` values.
    ///
    /// # Panics
    /// Panics if the byte size overflows `isize::MAX`, and calls
    /// [`handle_alloc_error`] if the allocation fails.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_in(capacity, Global)
    }

    /// The same as [`with_capacity`](RawStorage::with_capacity), but returns on errors.
    ///
    /// # Examples
    ///
    /// ```
    /// # use dynarray::{RawStorage, ReserveError};
    /// let err = RawStorage::<u64>::try_with_capacity(usize::MAX).unwrap_err();
    /// assert_eq!(err, ReserveError::CapacityOverflow);
    /// ```
    #[inline]
    pub fn try_with_capacity(capacity: usize) -> Result<Self, ReserveError> {
        Self::try_with_capacity_in(capacity, Global)
    }
}

impl<T, A: Allocator> RawStorage<T, A> {
    /// Creates an empty storage that will allocate from `alloc`.
    #[inline]
    pub const fn new_in(alloc: A) -> Self {
        Self {
            ptr: NonNull::dangling(),
            cap: 0,
            alloc,
            _marker: PhantomData,
        }
    }

    /// Like [`with_capacity`](RawStorage::with_capacity), with an explicit strategy.
    #[inline]
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Self {
        handle_reserve(Self::try_with_capacity_in(capacity, alloc))
    }

    /// Like [`try_with_capacity`](RawStorage::try_with_capacity), with an explicit strategy.
    ///
    /// A capacity of zero makes no call to the strategy. On failure no block is kept.
    pub fn try_with_capacity_in(capacity: usize, alloc: A) -> Result<Self, ReserveError> {
        if capacity == 0 {
            return Ok(Self::new_in(alloc));
        }

        if T::IS_ZST {
            return Ok(Self {
                ptr: NonNull::dangling(),
                cap: capacity,
                alloc,
                _marker: PhantomData,
            });
        }

        let layout = layout_for::<T>(capacity)?;
        let ptr = match alloc.acquire(layout) {
            Ok(ptr) => ptr,
            Err(err) => {
                trace!("failed to acquire {} bytes: {}", layout.size(), err);
                return Err(err);
            }
        };

        Ok(Self {
            ptr: ptr.cast(),
            cap: capacity,
            alloc,
            _marker: PhantomData,
        })
    }

    /// Returns the number of values the block can hold.
    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        self.cap
    }

    /// Returns `true` if a block is currently held from the strategy.
    ///
    /// Always `false` for zero sized types.
    #[inline(always)]
    pub const fn is_allocated(&self) -> bool {
        !T::IS_ZST && self.cap != 0
    }

    /// Returns a raw pointer to the start of the block, or a dangling pointer
    /// if no block is held.
    #[inline(always)]
    pub const fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// Returns a raw mutable pointer to the start of the block, or a dangling
    /// pointer if no block is held.
    #[inline(always)]
    pub const fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Returns a reference to the allocation strategy.
    #[inline(always)]
    pub const fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Returns a pointer to the slot at `offset`.
    ///
    /// `offset == capacity` is allowed and yields the one-past-the-end pointer.
    ///
    /// # Safety
    /// `offset <= capacity`. This is only checked in debug builds.
    #[inline(always)]
    pub unsafe fn slot(&mut self, offset: usize) -> *mut T {
        debug_assert!(offset <= self.cap, "slot offset should be <= capacity");
        // SAFETY: the offset stays inside the block or one past it.
        unsafe { self.as_mut_ptr().add(offset) }
    }

    /// Frees the block without dropping anything stored in it.
    ///
    /// Afterwards the capacity is zero. Calling this on an empty storage does nothing.
    pub fn release(&mut self) {
        if self.is_allocated() {
            // SAFETY: the block was acquired with exactly this layout, which
            // was validated by `layout_for` at that time.
            unsafe {
                let layout = Layout::from_size_align_unchecked(
                    mem::size_of::<T>() * self.cap,
                    mem::align_of::<T>(),
                );
                self.alloc.release(self.ptr.cast(), layout);
            }
        }
        self.ptr = NonNull::dangling();
        self.cap = 0;
    }

    /// Exchanges the blocks (and strategies) of two storages.
    ///
    /// # Examples
    ///
    /// ```
    /// # use dynarray::RawStorage;
    /// let mut a = RawStorage::<u8>::with_capacity(2);
    /// let mut b = RawStorage::<u8>::new();
    /// a.swap(&mut b);
    /// assert_eq!((a.capacity(), b.capacity()), (0, 2));
    /// ```
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Moves the block out, leaving `self` empty with a clone of its strategy.
    #[inline]
    pub fn take(&mut self) -> Self {
        let empty = Self::new_in(self.alloc.clone());
        mem::replace(self, empty)
    }

    /// Allocates a fresh block of `capacity` slots from a clone of this strategy.
    #[inline]
    pub(crate) fn try_sibling(&self, capacity: usize) -> Result<Self, ReserveError> {
        Self::try_with_capacity_in(capacity, self.alloc.clone())
    }
}

impl<T, A: Allocator + Default> Default for RawStorage<T, A> {
    #[inline]
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<T, A: Allocator> fmt::Debug for RawStorage<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawStorage")
            .field("ptr", &self.ptr)
            .field("capacity", &self.cap)
            .finish_non_exhaustive()
    }
}

/// Layout of a block of `capacity` values, rejecting byte sizes above `isize::MAX`.
#[inline]
fn layout_for<T>(capacity: usize) -> Result<Layout, ReserveError> {
    Layout::array::<T>(capacity).map_err(|_| ReserveError::CapacityOverflow)
}

// Central function for reserve error handling.
#[inline]
pub(crate) fn handle_reserve<T>(result: Result<T, ReserveError>) -> T {
    match result {
        Ok(t) => t,
        Err(ReserveError::CapacityOverflow) => capacity_overflow(),
        Err(ReserveError::AllocError { layout }) => handle_alloc_error(layout),
    }
}

// One place that panics on overflow keeps the generated code small.
#[cold]
fn capacity_overflow() -> ! {
    panic!("capacity overflow");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::testing::Budgeted;

    #[test]
    fn zero_capacity_makes_no_allocation() {
        let strategy = Budgeted::unlimited();
        let storage = RawStorage::<u64, _>::try_with_capacity_in(0, strategy.clone()).unwrap();
        assert_eq!(storage.capacity(), 0);
        assert!(!storage.is_allocated());
        assert_eq!(strategy.acquired(), 0);
    }

    #[test]
    fn allocates_exactly_and_releases_on_drop() {
        let strategy = Budgeted::unlimited();
        {
            let storage = RawStorage::<u64, _>::with_capacity_in(5, strategy.clone());
            assert_eq!(storage.capacity(), 5);
            assert!(storage.is_allocated());
            assert_eq!(strategy.outstanding(), 1);
        }
        assert_eq!(strategy.outstanding(), 0);
    }

    #[test]
    fn release_is_idempotent() {
        let strategy = Budgeted::unlimited();
        let mut storage = RawStorage::<u32, _>::with_capacity_in(3, strategy.clone());
        storage.release();
        storage.release();
        assert_eq!(storage.capacity(), 0);
        assert_eq!(strategy.acquired(), 1);
        assert_eq!(strategy.outstanding(), 0);
        drop(storage);
        assert_eq!(strategy.outstanding(), 0);
    }

    #[test]
    fn failed_allocation_keeps_nothing() {
        let strategy = Budgeted::with_budget(0);
        let err = RawStorage::<u32, _>::try_with_capacity_in(8, strategy.clone()).unwrap_err();
        assert_eq!(
            err,
            ReserveError::AllocError {
                layout: Layout::array::<u32>(8).unwrap()
            }
        );
        assert_eq!(strategy.outstanding(), 0);
    }

    #[test]
    fn overflowing_capacity_is_rejected() {
        let strategy = Budgeted::unlimited();
        let err =
            RawStorage::<u64, _>::try_with_capacity_in(usize::MAX / 4, strategy.clone()).unwrap_err();
        assert_eq!(err, ReserveError::CapacityOverflow);
        assert_eq!(strategy.acquired(), 0);
    }

    #[test]
    fn swap_and_take_transfer_ownership() {
        let strategy = Budgeted::unlimited();
        let mut a = RawStorage::<u16, _>::with_capacity_in(4, strategy.clone());
        let mut b = RawStorage::<u16, _>::new_in(strategy.clone());
        let ptr = a.as_ptr();

        a.swap(&mut b);
        assert_eq!(a.capacity(), 0);
        assert_eq!(b.capacity(), 4);
        assert_eq!(b.as_ptr(), ptr);

        let c = b.take();
        assert_eq!(b.capacity(), 0);
        assert!(!b.is_allocated());
        assert_eq!(c.capacity(), 4);
        assert_eq!(strategy.outstanding(), 1);

        drop(c);
        assert_eq!(strategy.outstanding(), 0);
    }

    #[test]
    fn zst_never_allocates() {
        let strategy = Budgeted::with_budget(0);
        let storage = RawStorage::<(), _>::try_with_capacity_in(1024, strategy.clone()).unwrap();
        assert_eq!(storage.capacity(), 1024);
        assert!(!storage.is_allocated());
        assert_eq!(strategy.acquired(), 0);
    }

    #[test]
    fn slots_are_contiguous() {
        let mut storage = RawStorage::<u32>::with_capacity(3);
        unsafe {
            for i in 0..3 {
                storage.slot(i).write(i as u32 * 10);
            }
            assert_eq!(*storage.slot(2), 20);
            assert_eq!(storage.slot(3).offset_from(storage.slot(0)), 3);
        }
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "slot offset should be <= capacity")]
    fn slot_past_end_is_caught_in_debug() {
        let mut storage = RawStorage::<u32>::with_capacity(2);
        let _ = unsafe { storage.slot(3) };
    }
}
