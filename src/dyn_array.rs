use alloc::{boxed::Box, vec::Vec};
use core::{
    cmp,
    convert::Infallible,
    fmt,
    iter::FusedIterator,
    mem::{self, ManuallyDrop},
    ptr, slice,
};

use crate::{
    Allocator, EmplaceError, Global, RawStorage, ReserveError,
    raw_storage::handle_reserve,
    utils::{cold_path, split_range_bound, trace},
};

/// A contiguous growable array that owns one [`RawStorage`] and tracks how many of
/// its slots hold live values.
///
/// Slots `[0, len)` are always initialized and `[len, capacity)` are always raw.
/// Every mutating method keeps that split exact, including when it fails half-way:
///
/// - If storage cannot be obtained, the array is left exactly as it was.
/// - If an element constructor or `clone` fails (by returning `Err` or by panicking),
///   every value the failing call had already built is dropped, and the length goes
///   back to the set of values that are still valid.
///
/// # Examples
///
/// ```
/// use dynarray::{DynArray, dynarray};
///
/// let mut vec: DynArray<i32> = DynArray::new();
/// assert_eq!(vec.capacity(), 0);
///
/// vec.push(1);
/// vec.push(3);
/// vec.insert(1, 2);
/// assert_eq!(vec, [1, 2, 3]);
///
/// // Growth doubles the capacity.
/// assert_eq!(vec.capacity(), 4);
///
/// let next = vec.erase(0);
/// assert_eq!(vec[next], 2);
/// assert_eq!(vec, dynarray![2, 3]);
/// ```
///
/// # Growth
///
/// When one more slot is needed the capacity becomes `max(1, 2 * capacity)`.
/// [`reserve`](DynArray::reserve) bypasses this and allocates exactly what is asked.
/// Values are relocated by bitwise moves, which cannot fail, so growth either
/// happens completely or not at all.
pub struct DynArray<T, A: Allocator = Global> {
    buf: RawStorage<T, A>,
    len: usize,
}

impl<T, A: Allocator> Drop for DynArray<T, A> {
    fn drop(&mut self) {
        // SAFETY: `[0, len)` is live. The storage releases itself afterwards.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.as_mut_ptr(), self.len));
        }
    }
}

/// Creates a [`DynArray`] containing the arguments.
///
/// The syntax is similar to [`vec!`](https://doc.rust-lang.org/std/macro.vec.html).
///
/// # Examples
///
/// ```
/// # use dynarray::{dynarray, DynArray};
/// let vec: DynArray<String> = dynarray![];
/// let vec: DynArray<i64> = dynarray![1; 5]; // Need to support Clone.
/// let vec: DynArray<_> = dynarray![1, 2, 3, 4];
/// assert_eq!(vec.capacity(), 4);
/// ```
#[macro_export]
macro_rules! dynarray {
    [] => { $crate::DynArray::new() };
    [$elem:expr; $n:expr] => { $crate::DynArray::from_elem($elem, $n) };
    [$($item:expr),+ $(,)?] => { $crate::DynArray::from([ $($item),+ ]) };
}

/// Truncates the array back to `restore` when dropped, unless committed.
///
/// Wraps loops that build several values, so a failure part-way drops exactly
/// the values that loop created.
struct Rollback<'a, T, A: Allocator> {
    vec: &'a mut DynArray<T, A>,
    restore: usize,
}

impl<'a, T, A: Allocator> Rollback<'a, T, A> {
    #[inline]
    fn new(vec: &'a mut DynArray<T, A>) -> Self {
        let restore = vec.len;
        Self { vec, restore }
    }

    #[inline]
    fn commit(self) {
        mem::forget(self);
    }
}

impl<T, A: Allocator> Drop for Rollback<'_, T, A> {
    fn drop(&mut self) {
        self.vec.truncate(self.restore);
    }
}

/// Turns an error from an infallible constructor into a panic, like `Vec` does.
#[inline]
fn unwrap_reserve<T>(result: Result<T, EmplaceError<Infallible>>) -> T {
    handle_reserve(result.map_err(EmplaceError::into_reserve))
}

impl<T> DynArray<T, Global> {
    /// Constructs a new, empty `DynArray`. Does not allocate.
    ///
    /// # Examples
    ///
    /// ```
    /// # use dynarray::DynArray;
    /// let vec: DynArray<i32> = DynArray::new();
    /// assert_eq!(vec.capacity(), 0);
    /// ```
    #[inline]
    pub const fn new() -> Self {
        Self::new_in(Global)
    }

    /// Constructs a new, empty `DynArray` with room for exactly `capacity` values.
    ///
    /// # Panics
    /// Panics if the new capacity exceeds `isize::MAX` bytes.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_in(capacity, Global)
    }

    /// The same as [`with_capacity`](DynArray::with_capacity), but returns on errors.
    #[inline]
    pub fn try_with_capacity(capacity: usize) -> Result<Self, ReserveError> {
        Self::try_with_capacity_in(capacity, Global)
    }

    /// Creates an array of `len` values produced by `f(index)`.
    ///
    /// Allocates exactly `len` slots. If `f` panics, the values already built
    /// are dropped and the storage is released before the panic continues.
    ///
    /// # Examples
    ///
    /// ```
    /// # use dynarray::DynArray;
    /// let squares = DynArray::from_fn(4, |i| i * i);
    /// assert_eq!(squares, [0, 1, 4, 9]);
    /// ```
    #[inline]
    pub fn from_fn<F: FnMut(usize) -> T>(len: usize, f: F) -> Self {
        Self::from_fn_in(len, f, Global)
    }

    /// Creates an array of `len` values produced by a fallible `f(index)`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use dynarray::{DynArray, EmplaceError};
    /// let parsed = DynArray::try_from_fn(3, |i| ["1", "2", "x"][i].parse::<u8>());
    /// assert!(matches!(parsed, Err(EmplaceError::Element(_))));
    /// ```
    #[inline]
    pub fn try_from_fn<E, F>(len: usize, f: F) -> Result<Self, EmplaceError<E>>
    where
        F: FnMut(usize) -> Result<T, E>,
    {
        Self::try_from_fn_in(len, f, Global)
    }
}

impl<T: Default> DynArray<T, Global> {
    /// Creates an array of `len` default values, with capacity exactly `len`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use dynarray::DynArray;
    /// let vec = DynArray::<String>::with_len(3);
    /// assert_eq!(vec.len(), 3);
    /// assert_eq!(vec.capacity(), 3);
    /// assert!(vec.iter().all(String::is_empty));
    /// ```
    #[inline]
    pub fn with_len(len: usize) -> Self {
        Self::from_fn(len, |_| T::default())
    }

    /// The same as [`with_len`](DynArray::with_len), but returns on allocation errors.
    #[inline]
    pub fn try_with_len(len: usize) -> Result<Self, ReserveError> {
        Self::try_from_fn(len, |_| Ok::<_, Infallible>(T::default()))
            .map_err(EmplaceError::into_reserve)
    }
}

impl<T, A: Allocator> DynArray<T, A> {
    /// Constructs a new, empty `DynArray` that allocates from `alloc`.
    #[inline]
    pub const fn new_in(alloc: A) -> Self {
        Self {
            buf: RawStorage::new_in(alloc),
            len: 0,
        }
    }

    /// Like [`with_capacity`](DynArray::with_capacity), with an explicit strategy.
    #[inline]
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Self {
        handle_reserve(Self::try_with_capacity_in(capacity, alloc))
    }

    /// Like [`try_with_capacity`](DynArray::try_with_capacity), with an explicit strategy.
    #[inline]
    pub fn try_with_capacity_in(capacity: usize, alloc: A) -> Result<Self, ReserveError> {
        Ok(Self {
            buf: RawStorage::try_with_capacity_in(capacity, alloc)?,
            len: 0,
        })
    }

    /// Like [`from_fn`](DynArray::from_fn), with an explicit strategy.
    #[inline]
    pub fn from_fn_in<F: FnMut(usize) -> T>(len: usize, mut f: F, alloc: A) -> Self {
        unwrap_reserve(Self::try_from_fn_in(len, |i| Ok(f(i)), alloc))
    }

    /// Like [`try_from_fn`](DynArray::try_from_fn), with an explicit strategy.
    pub fn try_from_fn_in<E, F>(len: usize, mut f: F, alloc: A) -> Result<Self, EmplaceError<E>>
    where
        F: FnMut(usize) -> Result<T, E>,
    {
        let mut vec = Self::try_with_capacity_in(len, alloc)?;
        for index in 0..len {
            // On failure `vec` is dropped: `[0, index)` is destroyed and the block released.
            let value = f(index).map_err(EmplaceError::Element)?;
            // SAFETY: `index < len == capacity`.
            unsafe { vec.push_unchecked(value) };
        }
        Ok(vec)
    }

    /// Returns a raw pointer to the array's buffer, or a dangling pointer
    /// valid for zero sized reads if nothing is allocated.
    ///
    /// The caller must ensure that the array outlives the pointer.
    /// Growing the array reallocates the buffer, which invalidates it.
    #[inline(always)]
    pub const fn as_ptr(&self) -> *const T {
        self.buf.as_ptr()
    }

    /// Returns a raw mutable pointer to the array's buffer, or a dangling pointer
    /// valid for zero sized reads if nothing is allocated.
    #[inline(always)]
    pub const fn as_mut_ptr(&mut self) -> *mut T {
        self.buf.as_mut_ptr()
    }

    /// Returns a reference to the allocation strategy.
    #[inline(always)]
    pub const fn allocator(&self) -> &A {
        self.buf.allocator()
    }

    /// Returns the number of elements in the array.
    ///
    /// # Examples
    ///
    /// ```
    /// # use dynarray::dynarray;
    /// let vec = dynarray![1, 2, 3];
    /// assert_eq!(vec.len(), 3);
    /// ```
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the array contains no elements.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of elements the array can hold without reallocating.
    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Forces the length of the array to `new_len`.
    ///
    /// This is a low-level operation that maintains none of the normal invariants of the type.
    ///
    /// # Safety
    /// - `new_len` needs to be less than or equal to [`capacity`](DynArray::capacity).
    /// - If the length is increased, the new elements must be initialized.
    /// - If the length is reduced, the removed elements must be dropped (or moved out) by the caller.
    ///
    /// See more information in [`Vec::set_len`].
    #[inline(always)]
    pub const unsafe fn set_len(&mut self, new_len: usize) {
        debug_assert!(new_len <= self.buf.capacity());
        self.len = new_len;
    }

    /// Extracts a slice containing the entire array.
    #[inline]
    pub const fn as_slice(&self) -> &[T] {
        // SAFETY: `[0, len)` is live.
        unsafe { slice::from_raw_parts(self.as_ptr(), self.len) }
    }

    /// Extracts a mutable slice containing the entire array.
    #[inline]
    pub const fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: `[0, len)` is live.
        unsafe { slice::from_raw_parts_mut(self.as_mut_ptr(), self.len) }
    }

    /// Cursor to the first element.
    ///
    /// Together with [`end`](DynArray::end) this delimits the live range;
    /// for `begin() == end()` the array is empty.
    #[inline(always)]
    pub const fn begin(&self) -> *const T {
        self.as_ptr()
    }

    /// Cursor one past the last element.
    #[inline(always)]
    pub const fn end(&self) -> *const T {
        // SAFETY: `len <= capacity`, so this stays inside the block or one past it.
        unsafe { self.as_ptr().add(self.len) }
    }

    /// Mutable cursor to the first element.
    #[inline(always)]
    pub const fn begin_mut(&mut self) -> *mut T {
        self.as_mut_ptr()
    }

    /// Mutable cursor one past the last element.
    #[inline(always)]
    pub const fn end_mut(&mut self) -> *mut T {
        let len = self.len;
        // SAFETY: `len <= capacity`.
        unsafe { self.as_mut_ptr().add(len) }
    }

    /// Returns a reference to the element at `index` without bounds checking.
    ///
    /// The bound is asserted in debug builds only.
    ///
    /// # Safety
    /// `index < len`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use dynarray::dynarray;
    /// let vec = dynarray![10, 20, 30];
    /// assert_eq!(unsafe { *vec.get_unchecked(1) }, 20);
    /// ```
    #[inline(always)]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        debug_assert!(index < self.len, "index should be < len");
        // SAFETY: see function doc.
        unsafe { &*self.as_ptr().add(index) }
    }

    /// Returns a mutable reference to the element at `index` without bounds checking.
    ///
    /// # Safety
    /// `index < len`.
    #[inline(always)]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.len, "index should be < len");
        // SAFETY: see function doc.
        unsafe { &mut *self.as_mut_ptr().add(index) }
    }

    /// Appends without checking capacity.
    ///
    /// # Safety
    /// `len < capacity`.
    #[inline(always)]
    unsafe fn push_unchecked(&mut self, value: T) {
        debug_assert!(self.len < self.buf.capacity());
        let len = self.len;
        // SAFETY: the slot at `len` is raw and inside the block.
        unsafe { ptr::write(self.as_mut_ptr().add(len), value) };
        self.len = len + 1;
    }

    /// Capacity for one more slot: `max(1, 2 * capacity)`.
    #[inline]
    fn grown_capacity(&self) -> Result<usize, ReserveError> {
        match self.buf.capacity() {
            0 => Ok(1),
            cap => cap.checked_mul(2).ok_or(ReserveError::CapacityOverflow),
        }
    }

    /// Moves the live prefix into `new_buf` and adopts it.
    ///
    /// The old block is released without dropping anything, its values now live in `new_buf`.
    ///
    /// # Safety
    /// `new_buf.capacity() >= len`.
    unsafe fn relocate(&mut self, mut new_buf: RawStorage<T, A>) {
        debug_assert!(new_buf.capacity() >= self.len);
        trace!(
            "relocating {} elements into capacity {}",
            self.len,
            new_buf.capacity()
        );
        // SAFETY: both blocks hold at least `len` slots and are distinct allocations.
        unsafe {
            ptr::copy_nonoverlapping(self.as_ptr(), new_buf.as_mut_ptr(), self.len);
        }
        self.buf.swap(&mut new_buf);
    }

    /// Makes room for `additional` more values, growing geometrically.
    pub(crate) fn try_reserve_for(&mut self, additional: usize) -> Result<(), ReserveError> {
        let required = self
            .len
            .checked_add(additional)
            .ok_or(ReserveError::CapacityOverflow)?;
        if required <= self.buf.capacity() {
            return Ok(());
        }
        cold_path();
        let amortized = cmp::max(required, self.buf.capacity().saturating_mul(2));
        self.try_reserve(amortized)
    }

    /// Ensures the capacity is at least `capacity` (a total, not an increment).
    ///
    /// Does nothing if the capacity is already sufficient. Otherwise reallocates once,
    /// to exactly `capacity`, regardless of the doubling policy.
    ///
    /// # Panics
    /// Panics if the new capacity exceeds `isize::MAX` bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// # use dynarray::dynarray;
    /// let mut vec = dynarray![1];
    /// vec.reserve(10);
    /// assert_eq!(vec.capacity(), 10);
    ///
    /// vec.reserve(3);
    /// assert_eq!(vec.capacity(), 10);
    /// ```
    #[inline]
    pub fn reserve(&mut self, capacity: usize) {
        handle_reserve(self.try_reserve(capacity));
    }

    /// The same as [`reserve`](DynArray::reserve), but returns on errors.
    ///
    /// On error the array is unchanged.
    pub fn try_reserve(&mut self, capacity: usize) -> Result<(), ReserveError> {
        if capacity <= self.buf.capacity() {
            return Ok(());
        }
        let new_buf = self.buf.try_sibling(capacity)?;
        // SAFETY: `capacity > old capacity >= len`.
        unsafe { self.relocate(new_buf) };
        Ok(())
    }

    /// Shrinks the capacity to exactly `len`. An empty array releases its block.
    ///
    /// # Examples
    ///
    /// ```
    /// # use dynarray::DynArray;
    /// let mut vec = DynArray::with_capacity(8);
    /// vec.push(1);
    /// vec.shrink_to_fit();
    /// assert_eq!(vec.capacity(), 1);
    /// ```
    #[inline]
    pub fn shrink_to_fit(&mut self) {
        handle_reserve(self.try_shrink_to_fit());
    }

    /// The same as [`shrink_to_fit`](DynArray::shrink_to_fit), but returns on errors.
    ///
    /// On error the array keeps its current block.
    pub fn try_shrink_to_fit(&mut self) -> Result<(), ReserveError> {
        if self.buf.capacity() > self.len {
            let new_buf = self.buf.try_sibling(self.len)?;
            // SAFETY: the new block holds exactly `len` slots.
            unsafe { self.relocate(new_buf) };
        }
        Ok(())
    }

    /// Constructs a value with `f` and inserts it at `index`, shifting all
    /// elements after it to the right.
    ///
    /// `index == len` appends. Returns a reference to the new element.
    ///
    /// If `f` fails, or storage cannot be obtained, the array is unchanged:
    /// `f` runs after any new block has been obtained but before any existing
    /// element is touched, so there is nothing to undo except releasing that block.
    ///
    /// At capacity, the value is written straight into its final slot of a doubled
    /// block and the elements before and after it are moved around it.
    ///
    /// # Panics
    /// Panics if `index > len`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use dynarray::{dynarray, EmplaceError};
    /// let mut vec = dynarray!['a', 'c'];
    ///
    /// let ok = vec.try_emplace_with(1, || Ok::<_, ()>('b'));
    /// assert_eq!(ok, Ok(&mut 'b'));
    ///
    /// let err = vec.try_emplace_with(0, || Err("no value"));
    /// assert_eq!(err, Err(EmplaceError::Element("no value")));
    /// assert_eq!(vec, ['a', 'b', 'c']);
    /// ```
    pub fn try_emplace_with<E, F>(&mut self, index: usize, f: F) -> Result<&mut T, EmplaceError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let len = self.len;
        assert!(index <= len, "insertion index should be <= len");

        if len == self.buf.capacity() {
            cold_path();

            let mut new_buf = self.buf.try_sibling(self.grown_capacity()?)?;
            // A failing constructor drops `new_buf`; nothing else has been touched.
            let value = f().map_err(EmplaceError::Element)?;

            trace!(
                "relocating {} elements into capacity {}",
                len,
                new_buf.capacity()
            );
            // SAFETY: the new block holds `len + 1` slots and does not overlap the old one.
            unsafe {
                let src = self.as_ptr();
                let dst = new_buf.as_mut_ptr();
                ptr::write(dst.add(index), value);
                ptr::copy_nonoverlapping(src, dst, index);
                ptr::copy_nonoverlapping(src.add(index), dst.add(index + 1), len - index);
            }
            // The old block only holds moved-out values now; dropping `new_buf` releases it.
            self.buf.swap(&mut new_buf);
        } else {
            let value = f().map_err(EmplaceError::Element)?;

            // SAFETY: `len < capacity`, so the tail can move one slot to the right.
            unsafe {
                let slot = self.as_mut_ptr().add(index);
                if index < len {
                    ptr::copy(slot, slot.add(1), len - index);
                }
                ptr::write(slot, value);
            }
        }

        self.len = len + 1;
        // SAFETY: `index < len` now.
        Ok(unsafe { &mut *self.as_mut_ptr().add(index) })
    }

    /// Constructs a value with `f` and inserts it at `index`.
    ///
    /// A panic in `f` leaves the array unchanged.
    ///
    /// # Panics
    /// Panics if `index > len`, or if the new capacity exceeds `isize::MAX` bytes.
    #[inline]
    pub fn emplace_with<F: FnOnce() -> T>(&mut self, index: usize, f: F) -> &mut T {
        unwrap_reserve(self.try_emplace_with(index, || Ok(f())))
    }

    /// Inserts `value` at `index` and returns a reference to it.
    ///
    /// # Panics
    /// Panics if `index > len`.
    #[inline]
    pub fn emplace(&mut self, index: usize, value: T) -> &mut T {
        self.emplace_with(index, || value)
    }

    /// Inserts an element at position `index` within the array, shifting all
    /// elements after it to the right.
    ///
    /// # Panics
    /// Panics if `index > len`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use dynarray::dynarray;
    /// let mut vec = dynarray![1, 2, 3];
    /// vec.insert(1, 99);
    /// assert_eq!(vec, [1, 99, 2, 3]);
    /// ```
    #[inline]
    pub fn insert(&mut self, index: usize, value: T) -> &mut T {
        self.emplace(index, value)
    }

    /// Appends an element to the back of the array.
    ///
    /// # Panics
    /// Panics if the new capacity exceeds `isize::MAX` bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// # use dynarray::DynArray;
    /// let mut vec = DynArray::new();
    /// let mut caps = Vec::new();
    /// for i in 0..5 {
    ///     vec.push(i);
    ///     caps.push(vec.capacity());
    /// }
    /// assert_eq!(caps, [1, 2, 4, 4, 8]);
    /// ```
    #[inline]
    pub fn push(&mut self, value: T) {
        self.emplace_back(value);
    }

    /// The same as [`push`](DynArray::push), but returns on allocation errors.
    ///
    /// On error the array is unchanged and `value` is dropped.
    #[inline]
    pub fn try_push(&mut self, value: T) -> Result<(), ReserveError> {
        match self.try_emplace_back_with(|| Ok::<_, Infallible>(value)) {
            Ok(_) => Ok(()),
            Err(err) => Err(err.into_reserve()),
        }
    }

    /// Appends `value` and returns a reference to it.
    #[inline]
    pub fn emplace_back(&mut self, value: T) -> &mut T {
        self.emplace_back_with(|| value)
    }

    /// Constructs a value with `f` at the back of the array.
    #[inline]
    pub fn emplace_back_with<F: FnOnce() -> T>(&mut self, f: F) -> &mut T {
        let len = self.len;
        self.emplace_with(len, f)
    }

    /// Constructs a value with a fallible `f` at the back of the array.
    ///
    /// On error the array is unchanged.
    #[inline]
    pub fn try_emplace_back_with<E, F>(&mut self, f: F) -> Result<&mut T, EmplaceError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let len = self.len;
        self.try_emplace_with(len, f)
    }

    /// Removes and drops the element at `index`, shifting all elements after it to the left.
    ///
    /// Returns the index of the element that followed the erased one, which is `len`
    /// if the erased element was the last.
    ///
    /// # Panics
    /// Panics if `index >= len`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use dynarray::dynarray;
    /// let mut vec = dynarray![1, 99, 2, 3];
    /// let next = vec.erase(1);
    /// assert_eq!(next, 1);
    /// assert_eq!(vec[next], 2);
    /// assert_eq!(vec.erase(2), vec.len());
    /// ```
    #[inline]
    pub fn erase(&mut self, index: usize) -> usize {
        drop(self.remove(index));
        index
    }

    /// Removes and returns the element at `index`, shifting all elements after it to the left.
    ///
    /// # Time complexity
    /// O(N)
    ///
    /// # Panics
    /// Panics if `index >= len`.
    pub fn remove(&mut self, index: usize) -> T {
        assert!(index < self.len, "removal index should be < len");
        // SAFETY: `index < len`; the length is updated before the value escapes.
        unsafe {
            let ptr = self.as_mut_ptr().add(index);
            let value = ptr::read(ptr);
            ptr::copy(ptr.add(1), ptr, self.len - index - 1);
            self.len -= 1;
            value
        }
    }

    /// Removes the last element and returns it, or `None` if empty.
    ///
    /// # Examples
    ///
    /// ```
    /// # use dynarray::dynarray;
    /// let mut vec = dynarray![1];
    /// assert_eq!(vec.pop(), Some(1));
    /// assert_eq!(vec.pop(), None);
    /// ```
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            cold_path();
            None
        } else {
            self.len -= 1;
            // SAFETY: the slot at the old last index was live and is now outside `[0, len)`.
            unsafe { Some(ptr::read(self.as_ptr().add(self.len))) }
        }
    }

    /// Drops the last element.
    ///
    /// Popping an empty array is a programming error: it is asserted in debug
    /// builds and does nothing in release builds.
    #[inline]
    pub fn pop_back(&mut self) {
        debug_assert!(self.len != 0, "pop_back on an empty array");
        drop(self.pop());
    }

    /// Shortens the array, keeping the first `len` elements and dropping the rest.
    ///
    /// If `len` is greater or equal to the current length, this has no effect.
    /// The capacity is untouched.
    pub fn truncate(&mut self, len: usize) {
        if len < self.len {
            // SAFETY: `[len, self.len)` is live. The length shrinks first so a
            // panicking destructor cannot cause a second drop.
            unsafe {
                let tail = ptr::slice_from_raw_parts_mut(self.as_mut_ptr().add(len), self.len - len);
                self.len = len;
                ptr::drop_in_place(tail);
            }
        }
    }

    /// Clears the array, removing all values. The capacity is untouched.
    #[inline]
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Resizes the array in-place so that `len` is equal to `new_len`, building
    /// new elements with a fallible `f`.
    ///
    /// Shrinking drops the tail. Growing reserves exactly `new_len` slots first
    /// if the capacity is too small. If `f` fails part-way, the elements it had
    /// already produced are dropped and the length is restored.
    ///
    /// # Examples
    ///
    /// ```
    /// # use dynarray::{dynarray, EmplaceError};
    /// let mut vec = dynarray![1, 2];
    /// let mut next = 2;
    /// let err = vec.try_resize_with(5, || {
    ///     next += 1;
    ///     if next < 5 { Ok(next) } else { Err(next) }
    /// });
    /// assert_eq!(err, Err(EmplaceError::Element(5)));
    /// assert_eq!(vec, [1, 2]);
    /// ```
    pub fn try_resize_with<E, F>(&mut self, new_len: usize, mut f: F) -> Result<(), EmplaceError<E>>
    where
        F: FnMut() -> Result<T, E>,
    {
        if new_len <= self.len {
            self.truncate(new_len);
            return Ok(());
        }

        self.try_reserve(new_len)?;

        let guard = Rollback::new(self);
        while guard.vec.len < new_len {
            let value = f().map_err(EmplaceError::Element)?;
            // SAFETY: capacity >= new_len > len.
            unsafe { guard.vec.push_unchecked(value) };
        }
        guard.commit();
        Ok(())
    }

    /// Resizes the array in-place so that `len` is equal to `new_len`, calling `f`
    /// for every new element.
    ///
    /// # Examples
    ///
    /// ```
    /// # use dynarray::dynarray;
    /// let mut vec = dynarray![1, 2, 3, 4];
    /// vec.resize_with(2, Default::default);
    /// assert_eq!(vec, [1, 2]);
    ///
    /// let mut p = 1;
    /// vec.resize_with(5, || { p *= 2; p });
    /// assert_eq!(vec, [1, 2, 2, 4, 8]);
    /// ```
    #[inline]
    pub fn resize_with<F: FnMut() -> T>(&mut self, new_len: usize, mut f: F) {
        unwrap_reserve(self.try_resize_with(new_len, || Ok(f())));
    }

    /// Exchanges the contents (storage, length and strategy) of two arrays in O(1).
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Move assignment: drops the current elements and takes over `other`'s
    /// storage and elements, leaving `other` empty.
    ///
    /// `other` keeps the (now empty) block this array had, so its capacity
    /// can be reused.
    ///
    /// # Examples
    ///
    /// ```
    /// # use dynarray::dynarray;
    /// let mut a = dynarray![1, 2, 3];
    /// let mut b = dynarray![7, 8];
    /// a.move_from(&mut b);
    /// assert_eq!(a, [7, 8]);
    /// assert!(b.is_empty());
    /// assert_eq!(b.capacity(), 3);
    /// ```
    #[inline]
    pub fn move_from(&mut self, other: &mut Self) {
        self.clear();
        self.swap(other);
    }

    /// Moves every element out into a new array, leaving `self` empty without storage.
    ///
    /// # Examples
    ///
    /// ```
    /// # use dynarray::dynarray;
    /// let mut a = dynarray![1, 2];
    /// let b = a.take();
    /// assert_eq!(b, [1, 2]);
    /// assert_eq!((a.len(), a.capacity()), (0, 0));
    /// ```
    #[inline]
    pub fn take(&mut self) -> Self {
        let len = mem::replace(&mut self.len, 0);
        Self {
            buf: self.buf.take(),
            len,
        }
    }

    /// Converts the array into a [`Vec`], transferring the elements.
    #[inline]
    pub fn into_vec(mut self) -> Vec<T> {
        let mut vec: Vec<T> = Vec::with_capacity(self.len);
        // SAFETY: the elements are moved bitwise and forgotten here.
        unsafe {
            ptr::copy_nonoverlapping(self.as_ptr(), vec.as_mut_ptr(), self.len);
            vec.set_len(self.len);
            self.len = 0;
        }
        vec
    }

    /// Converts the array into a [`Box<[T]>`](Box).
    #[inline]
    pub fn into_boxed_slice(self) -> Box<[T]> {
        self.into_vec().into_boxed_slice()
    }
}

impl<T: Default, A: Allocator> DynArray<T, A> {
    /// Resizes the array in-place so that `len` is equal to `new_len`,
    /// default-constructing new elements.
    ///
    /// # Examples
    ///
    /// ```
    /// # use dynarray::dynarray;
    /// let mut vec = dynarray![1, 2, 3];
    /// vec.resize(5);
    /// assert_eq!(vec, [1, 2, 3, 0, 0]);
    /// assert_eq!(vec.capacity(), 5);
    ///
    /// vec.resize(1);
    /// assert_eq!(vec, [1]);
    /// ```
    #[inline]
    pub fn resize(&mut self, new_len: usize) {
        self.resize_with(new_len, T::default);
    }
}

impl<T: Clone> DynArray<T, Global> {
    /// Creates a [`DynArray`] with `num` copies of `elem`.
    ///
    /// # Examples
    /// ```
    /// # use dynarray::DynArray;
    /// let vec = DynArray::from_elem(1, 4);
    /// assert_eq!(vec, [1, 1, 1, 1]);
    /// ```
    #[inline]
    pub fn from_elem(elem: T, num: usize) -> Self {
        Self::from_elem_in(elem, num, Global)
    }
}

impl<T: Clone, A: Allocator> DynArray<T, A> {
    /// Like [`from_elem`](DynArray::from_elem), with an explicit strategy.
    #[inline]
    pub fn from_elem_in(elem: T, num: usize, alloc: A) -> Self {
        handle_reserve(Self::try_from_elem_in(elem, num, alloc))
    }

    /// The same as [`from_elem_in`](DynArray::from_elem_in), but returns on allocation errors.
    pub fn try_from_elem_in(elem: T, num: usize, alloc: A) -> Result<Self, ReserveError> {
        let mut vec = Self::try_with_capacity_in(num, alloc)?;
        if num != 0 {
            // SAFETY: capacity is exactly `num`.
            unsafe {
                for _ in 1..num {
                    vec.push_unchecked(elem.clone());
                }
                // Reduce one copy.
                vec.push_unchecked(elem);
            }
        }
        Ok(vec)
    }

    /// Copies every element into a fresh block of exactly `len` slots from `alloc`.
    fn try_clone_in(&self, alloc: A) -> Result<Self, ReserveError> {
        let mut vec = Self::try_with_capacity_in(self.len, alloc)?;
        for item in self.as_slice() {
            // SAFETY: capacity is exactly `self.len`.
            unsafe { vec.push_unchecked(item.clone()) };
        }
        Ok(vec)
    }

    /// Copy construction that returns on allocation errors instead of aborting.
    ///
    /// If a clone panics, the clones already made are dropped and the new block
    /// is released.
    ///
    /// # Examples
    ///
    /// ```
    /// # use dynarray::dynarray;
    /// let vec = dynarray![1, 2, 3];
    /// let copy = vec.try_clone().unwrap();
    /// assert_eq!(copy, vec);
    /// assert_eq!(copy.capacity(), 3);
    /// ```
    #[inline]
    pub fn try_clone(&self) -> Result<Self, ReserveError> {
        self.try_clone_in(self.allocator().clone())
    }

    /// Copy assignment that returns on allocation errors instead of aborting.
    ///
    /// - If `source` does not fit in the current capacity, a full copy is built
    ///   in a new block first and then swapped in. A failed allocation or a
    ///   failing clone leaves `self` untouched.
    /// - Otherwise the overlapping prefix is assigned element-wise with
    ///   [`Clone::clone_from`], then the surplus tail is either cloned into raw
    ///   slots or dropped. No storage is needed, so this never fails with an error.
    ///
    /// # Examples
    ///
    /// ```
    /// # use dynarray::dynarray;
    /// let source = dynarray![7, 8, 9];
    /// let mut vec = dynarray![1];
    /// vec.try_clone_from(&source).unwrap();
    /// assert_eq!(vec, [7, 8, 9]);
    /// ```
    pub fn try_clone_from(&mut self, source: &Self) -> Result<(), ReserveError> {
        let len = self.len;
        let src_len = source.len;

        if src_len > self.capacity() {
            let mut copy = source.try_clone_in(self.allocator().clone())?;
            self.swap(&mut copy);
        } else if src_len >= len {
            for (dst, src) in self.as_mut_slice().iter_mut().zip(&source.as_slice()[..len]) {
                dst.clone_from(src);
            }
            let guard = Rollback::new(self);
            for item in &source.as_slice()[len..] {
                // SAFETY: `src_len <= capacity`.
                unsafe { guard.vec.push_unchecked(item.clone()) };
            }
            guard.commit();
        } else {
            for (dst, src) in self.as_mut_slice()[..src_len].iter_mut().zip(source.as_slice()) {
                dst.clone_from(src);
            }
            self.truncate(src_len);
        }
        Ok(())
    }

    /// Inserts a clone of the element at `src` at position `index`.
    ///
    /// The source element may lie anywhere in the array, including at or after
    /// `index`: it is cloned into a temporary before any growth or shifting
    /// moves it.
    ///
    /// # Panics
    /// Panics if `index > len` or `src >= len`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use dynarray::dynarray;
    /// let mut vec = dynarray![1, 2, 3];
    /// vec.insert_from_within(0, 2);
    /// assert_eq!(vec, [3, 1, 2, 3]);
    /// ```
    #[inline]
    pub fn insert_from_within(&mut self, index: usize, src: usize) -> &mut T {
        handle_reserve(self.try_insert_from_within(index, src))
    }

    /// The same as [`insert_from_within`](DynArray::insert_from_within), but returns
    /// on allocation errors.
    ///
    /// On error the array is unchanged and the temporary clone is dropped.
    pub fn try_insert_from_within(&mut self, index: usize, src: usize) -> Result<&mut T, ReserveError> {
        assert!(index <= self.len, "insertion index should be <= len");
        assert!(src < self.len, "source index should be < len");
        let value = self.as_slice()[src].clone();
        self.try_emplace_with(index, || Ok::<_, Infallible>(value))
            .map_err(EmplaceError::into_reserve)
    }

    /// Extends the array by cloning all elements from the given slice.
    ///
    /// If a clone panics, the clones already appended are dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// # use dynarray::dynarray;
    /// let mut vec = dynarray![1];
    /// vec.extend_from_slice(&[2, 3, 4]);
    /// assert_eq!(vec, [1, 2, 3, 4]);
    /// ```
    #[inline]
    pub fn extend_from_slice(&mut self, other: &[T]) {
        handle_reserve(self.try_extend_from_slice(other));
    }

    /// The same as [`extend_from_slice`](DynArray::extend_from_slice), but returns
    /// on allocation errors.
    ///
    /// On error nothing has been cloned and the array is unchanged.
    pub fn try_extend_from_slice(&mut self, other: &[T]) -> Result<(), ReserveError> {
        self.try_reserve_for(other.len())?;

        let guard = Rollback::new(self);
        for item in other {
            // SAFETY: room for `other.len()` values was reserved above.
            unsafe { guard.vec.push_unchecked(item.clone()) };
        }
        guard.commit();
        Ok(())
    }

    /// Clones elements from the given range within the array and appends them to the end.
    ///
    /// # Panics
    /// - Starting index is greater than the end index.
    /// - The end index is greater than the length of the array.
    ///
    /// # Examples
    /// ```
    /// # use dynarray::dynarray;
    /// let mut vec = dynarray!['a', 'b', 'c', 'd', 'e'];
    /// vec.extend_from_within(2..);
    /// assert_eq!(vec, ['a', 'b', 'c', 'd', 'e', 'c', 'd', 'e']);
    /// ```
    #[inline]
    pub fn extend_from_within<R: core::ops::RangeBounds<usize>>(&mut self, src: R) {
        handle_reserve(self.try_extend_from_within(src));
    }

    /// The same as [`extend_from_within`](DynArray::extend_from_within), but returns
    /// on allocation errors.
    pub fn try_extend_from_within<R>(&mut self, src: R) -> Result<(), ReserveError>
    where
        R: core::ops::RangeBounds<usize>,
    {
        let (start, end) = split_range_bound(&src, self.len);
        assert!(start <= end, "range start should be <= range end");
        assert!(end <= self.len, "range end should be <= len");

        self.try_reserve_for(end - start)?;

        let guard = Rollback::new(self);
        for index in start..end {
            // SAFETY: the source stays below `restore <= len`, and no
            // reallocation happens in this loop.
            unsafe {
                let item = (*guard.vec.as_ptr().add(index)).clone();
                guard.vec.push_unchecked(item);
            }
        }
        guard.commit();
        Ok(())
    }
}

impl<T, A: Allocator> DynArray<T, A> {
    /// Removes all but the first of consecutive elements in the array that resolve to the same key.
    ///
    /// See [`Vec::dedup_by_key`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use dynarray::dynarray;
    /// let mut vec = dynarray![10, 20, 21, 30, 20];
    /// vec.dedup_by_key(|i| *i / 10);
    /// assert_eq!(vec, [10, 20, 30, 20]);
    /// ```
    #[inline]
    pub fn dedup_by_key<F, K>(&mut self, mut key: F)
    where
        F: FnMut(&mut T) -> K,
        K: PartialEq,
    {
        self.dedup_by(|a, b| key(a) == key(b));
    }

    /// Removes all but the first of consecutive elements in the array satisfying a given equality relation.
    ///
    /// `same_bucket(a, b)` is called with `a` after `b`. Kept elements are
    /// compacted forward in one pass and the duplicates are dropped at the end.
    ///
    /// # Time Complexity
    ///
    /// O(N)
    ///
    /// # Examples
    ///
    /// ```
    /// # use dynarray::dynarray;
    /// let mut vec = dynarray!["foo", "bar", "Bar", "baz", "bar"];
    /// vec.dedup_by(|a, b| a.eq_ignore_ascii_case(b));
    /// assert_eq!(vec, ["foo", "bar", "baz", "bar"]);
    /// ```
    pub fn dedup_by<F: FnMut(&mut T, &mut T) -> bool>(&mut self, mut same_bucket: F) {
        if self.len <= 1 {
            return;
        }

        let ptr = self.as_mut_ptr();
        let mut left = 0usize;

        // SAFETY: `left < right < len`, so both pointers address distinct live slots.
        // Swapping keeps every slot live if `same_bucket` panics.
        unsafe {
            let mut p_l = ptr.add(left);
            for right in 1..self.len {
                let p_r = ptr.add(right);
                if !same_bucket(&mut *p_r, &mut *p_l) {
                    left += 1;
                    p_l = ptr.add(left);
                    if right != left {
                        ptr::swap(p_r, p_l);
                    }
                }
            }
        }
        self.truncate(left + 1);
    }
}

impl<T: PartialEq, A: Allocator> DynArray<T, A> {
    /// Removes consecutive duplicate elements.
    ///
    /// # Examples
    ///
    /// ```
    /// # use dynarray::dynarray;
    /// let mut vec = dynarray![1, 2, 2, 3, 2];
    /// vec.dedup();
    /// assert_eq!(vec, [1, 2, 3, 2]);
    /// ```
    #[inline]
    pub fn dedup(&mut self) {
        self.dedup_by(|x, y| PartialEq::eq(x, y));
    }
}

impl<T, A: Allocator + Default> Default for DynArray<T, A> {
    /// Constructs a new, empty `DynArray`. Does not allocate.
    #[inline(always)]
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<T: Clone, A: Allocator> Clone for DynArray<T, A> {
    /// Copy construction: allocates exactly `len` slots and clones every element.
    ///
    /// If a clone panics, the clones already made are dropped and the new block
    /// is released.
    #[inline]
    fn clone(&self) -> Self {
        handle_reserve(self.try_clone())
    }

    /// Copy assignment, see [`try_clone_from`](DynArray::try_clone_from).
    ///
    /// # Examples
    ///
    /// ```
    /// # use dynarray::dynarray;
    /// let source = dynarray![7, 8];
    /// let mut vec = dynarray![1, 2, 3, 4, 5];
    /// vec.clone_from(&source);
    /// assert_eq!(vec, [7, 8]);
    /// assert_eq!(vec.capacity(), 5);
    /// ```
    #[inline]
    fn clone_from(&mut self, source: &Self) {
        handle_reserve(self.try_clone_from(source));
    }
}

impl<T, A: Allocator> core::ops::Deref for DynArray<T, A> {
    type Target = [T];
    #[inline]
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T, A: Allocator> core::ops::DerefMut for DynArray<T, A> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for DynArray<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_slice(), f)
    }
}

impl<T, A: Allocator> AsRef<[T]> for DynArray<T, A> {
    #[inline]
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A: Allocator> AsMut<[T]> for DynArray<T, A> {
    #[inline]
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, A: Allocator> alloc::borrow::Borrow<[T]> for DynArray<T, A> {
    #[inline]
    fn borrow(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A: Allocator> alloc::borrow::BorrowMut<[T]> for DynArray<T, A> {
    #[inline]
    fn borrow_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: core::hash::Hash, A: Allocator> core::hash::Hash for DynArray<T, A> {
    #[inline]
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        core::hash::Hash::hash(self.as_slice(), state);
    }
}

impl<T, I: slice::SliceIndex<[T]>, A: Allocator> core::ops::Index<I> for DynArray<T, A> {
    type Output = <I as slice::SliceIndex<[T]>>::Output;
    #[inline]
    fn index(&self, index: I) -> &Self::Output {
        core::ops::Index::index(self.as_slice(), index)
    }
}

impl<T, I: slice::SliceIndex<[T]>, A: Allocator> core::ops::IndexMut<I> for DynArray<T, A> {
    #[inline]
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        core::ops::IndexMut::index_mut(self.as_mut_slice(), index)
    }
}

impl<'a, T, A: Allocator> IntoIterator for &'a DynArray<T, A> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<'a, T, A: Allocator> IntoIterator for &'a mut DynArray<T, A> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.as_mut_slice().iter_mut()
    }
}

impl<T: Ord, A: Allocator> Ord for DynArray<T, A> {
    #[inline]
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        Ord::cmp(self.as_slice(), other.as_slice())
    }
}

impl<T: PartialOrd, A: Allocator> PartialOrd for DynArray<T, A> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        PartialOrd::partial_cmp(self.as_slice(), other.as_slice())
    }
}

impl<T: Eq, A: Allocator> Eq for DynArray<T, A> {}

impl<T, U, A: Allocator, B: Allocator> PartialEq<DynArray<U, B>> for DynArray<T, A>
where
    T: PartialEq<U>,
{
    #[inline]
    fn eq(&self, other: &DynArray<U, B>) -> bool {
        PartialEq::eq(self.as_slice(), other.as_slice())
    }
}

impl<T, U, A: Allocator> PartialEq<[U]> for DynArray<T, A>
where
    T: PartialEq<U>,
{
    #[inline]
    fn eq(&self, other: &[U]) -> bool {
        PartialEq::eq(self.as_slice(), other)
    }
}

impl<T, U, A: Allocator> PartialEq<&[U]> for DynArray<T, A>
where
    T: PartialEq<U>,
{
    #[inline]
    fn eq(&self, other: &&[U]) -> bool {
        PartialEq::eq(self.as_slice(), *other)
    }
}

impl<T, U, A: Allocator, const P: usize> PartialEq<[U; P]> for DynArray<T, A>
where
    T: PartialEq<U>,
{
    #[inline]
    fn eq(&self, other: &[U; P]) -> bool {
        PartialEq::eq(self.as_slice(), other.as_slice())
    }
}

impl<T, U, A: Allocator, const P: usize> PartialEq<&[U; P]> for DynArray<T, A>
where
    T: PartialEq<U>,
{
    #[inline]
    fn eq(&self, other: &&[U; P]) -> bool {
        PartialEq::eq(self.as_slice(), other.as_slice())
    }
}

impl<T, U, A: Allocator> PartialEq<Vec<U>> for DynArray<T, A>
where
    T: PartialEq<U>,
{
    #[inline]
    fn eq(&self, other: &Vec<U>) -> bool {
        PartialEq::eq(self.as_slice(), other.as_slice())
    }
}

impl<'a, T: 'a + Clone, A: Allocator> Extend<&'a T> for DynArray<T, A> {
    /// Clone values from iterators.
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        handle_reserve(self.try_reserve_for(iter.size_hint().0));
        for item in iter {
            self.push(item.clone());
        }
    }
}

impl<T, A: Allocator> Extend<T> for DynArray<T, A> {
    /// Extends a collection with the contents of an iterator.
    ///
    /// # Examples
    ///
    /// ```
    /// # use dynarray::{DynArray, dynarray};
    /// let mut vec: DynArray<i32> = dynarray![];
    /// vec.extend([1, 2, 3]);
    /// assert_eq!(vec, [1, 2, 3]);
    /// ```
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        handle_reserve(self.try_reserve_for(iter.size_hint().0));
        for item in iter {
            self.push(item);
        }
    }
}

impl<T> FromIterator<T> for DynArray<T, Global> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut vec = Self::new();
        vec.extend(iter);
        vec
    }
}

impl<T: Clone> From<&[T]> for DynArray<T, Global> {
    /// # Examples
    ///
    /// ```
    /// # use dynarray::DynArray;
    /// let vec = DynArray::from([1, 2, 3].as_slice());
    /// assert_eq!(vec, [1, 2, 3]);
    /// ```
    fn from(value: &[T]) -> Self {
        let mut vec = Self::with_capacity(value.len());
        for item in value {
            // SAFETY: capacity is exactly `value.len()`.
            unsafe { vec.push_unchecked(item.clone()) };
        }
        vec
    }
}

impl<T, const P: usize> From<[T; P]> for DynArray<T, Global> {
    fn from(value: [T; P]) -> Self {
        let mut vec = Self::with_capacity(P);
        let value = ManuallyDrop::new(value);
        // SAFETY: the array is moved bitwise and never dropped.
        unsafe {
            ptr::copy_nonoverlapping(value.as_ptr(), vec.as_mut_ptr(), P);
            vec.len = P;
        }
        vec
    }
}

impl<T> From<Vec<T>> for DynArray<T, Global> {
    /// # Examples
    ///
    /// ```
    /// # use dynarray::DynArray;
    /// let vec = DynArray::from(vec![1, 2, 3]);
    /// assert_eq!(vec, [1, 2, 3]);
    /// assert_eq!(vec.capacity(), 3);
    /// ```
    fn from(mut value: Vec<T>) -> Self {
        let mut vec = Self::with_capacity(value.len());
        // SAFETY: the elements are moved bitwise and the source forgets them.
        unsafe {
            ptr::copy_nonoverlapping(value.as_ptr(), vec.as_mut_ptr(), value.len());
            vec.len = value.len();
            value.set_len(0);
        }
        vec
    }
}

impl<T> From<Box<[T]>> for DynArray<T, Global> {
    #[inline]
    fn from(value: Box<[T]>) -> Self {
        Self::from(value.into_vec())
    }
}

impl<T, A: Allocator> From<DynArray<T, A>> for Vec<T> {
    #[inline]
    fn from(value: DynArray<T, A>) -> Self {
        value.into_vec()
    }
}

/// An iterator that consumes a [`DynArray`] and yields its items by value.
///
/// Items not yielded are dropped with the iterator, then the block is released.
///
/// # Examples
///
/// ```
/// # use dynarray::dynarray;
/// let vec = dynarray!["1", "2", "3"];
/// let mut iter = vec.into_iter();
///
/// assert_eq!(iter.next(), Some("1"));
/// assert_eq!(iter.next_back(), Some("3"));
/// assert_eq!(iter.as_slice(), ["2"]);
/// ```
pub struct IntoIter<T, A: Allocator = Global> {
    buf: RawStorage<T, A>,
    start: usize,
    end: usize,
}

impl<T, A: Allocator> IntoIterator for DynArray<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        let vec = ManuallyDrop::new(self);
        // SAFETY: `vec` is never dropped, so the storage has exactly one owner.
        let buf = unsafe { ptr::read(&vec.buf) };
        IntoIter {
            buf,
            start: 0,
            end: vec.len,
        }
    }
}

impl<T, A: Allocator> IntoIter<T, A> {
    /// Returns the remaining items as a slice.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `[start, end)` is live.
        unsafe { slice::from_raw_parts(self.buf.as_ptr().add(self.start), self.end - self.start) }
    }

    /// Returns the remaining items as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let len = self.end - self.start;
        // SAFETY: `[start, end)` is live.
        unsafe { slice::from_raw_parts_mut(self.buf.as_mut_ptr().add(self.start), len) }
    }
}

impl<T, A: Allocator> Iterator for IntoIter<T, A> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.start < self.end {
            self.start += 1;
            // SAFETY: the slot was live and is now outside `[start, end)`.
            unsafe { Some(ptr::read(self.buf.as_ptr().add(self.start - 1))) }
        } else {
            None
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let v = self.end - self.start;
        (v, Some(v))
    }
}

impl<T, A: Allocator> DoubleEndedIterator for IntoIter<T, A> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.start < self.end {
            self.end -= 1;
            // SAFETY: the slot was live and is now outside `[start, end)`.
            unsafe { Some(ptr::read(self.buf.as_ptr().add(self.end))) }
        } else {
            None
        }
    }
}

impl<T, A: Allocator> ExactSizeIterator for IntoIter<T, A> {
    #[inline]
    fn len(&self) -> usize {
        self.end - self.start
    }
}

impl<T, A: Allocator> FusedIterator for IntoIter<T, A> {}

impl<T, A: Allocator> Drop for IntoIter<T, A> {
    fn drop(&mut self) {
        // SAFETY: `[start, end)` is still live; `buf` releases the block afterwards.
        unsafe {
            ptr::drop_in_place(self.as_mut_slice());
        }
    }
}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for IntoIter<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}
