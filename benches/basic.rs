//! Compares `DynArray` with `Vec` and `SmallVec` on the common operations.

use core::hint;
use criterion::{Bencher, Criterion, criterion_group, criterion_main};
use dynarray::DynArray;
use smallvec::SmallVec;
use std::sync::OnceLock;

use rand::Rng;

const SMALL_SIZE: usize = 16;
const LARGE_SIZE: usize = 40000;

/// A function used to generate a random amount of data.
///
/// Random data keeps the compiler from specializing the measured code
/// on a length it can see at compile time.
#[inline(never)]
fn gen_one(start: usize, end: usize) -> usize {
    let mut rng = rand::rng();
    rng.random_range(start..end)
}

/// The amount of data used in small data testing.
static SMALL_BOUND: OnceLock<usize> = OnceLock::new();

/// The amount of data used in large data testing.
static LARGE_BOUND: OnceLock<usize> = OnceLock::new();

/// Generate an array of random content of a specified length.
#[inline(never)]
fn gen_rand(len: usize, start: u64, end: u64) -> Box<[u64]> {
    let mut rng = rand::rng();
    let mut vec: Vec<u64> = Vec::with_capacity(len);
    for _ in 0..len {
        vec.push(rng.random_range(start..end));
    }
    vec.into_boxed_slice()
}

/// The operations under test, implemented for every container.
trait VecLike: Clone {
    fn new_empty() -> Self;
    fn with_capacity(capacity: usize) -> Self;
    fn push(&mut self, value: u64);
    fn pop(&mut self) -> Option<u64>;
    fn insert(&mut self, index: usize, value: u64);
    fn remove(&mut self, index: usize) -> u64;
    fn clear(&mut self);
    fn get_mut(&mut self, index: usize) -> &mut u64;
}

macro_rules! impl_vec_like {
    ($name:ty) => {
        impl VecLike for $name {
            #[inline(always)]
            fn new_empty() -> Self {
                <$name>::new()
            }
            #[inline(always)]
            fn with_capacity(capacity: usize) -> Self {
                <$name>::with_capacity(capacity)
            }
            #[inline(always)]
            fn push(&mut self, value: u64) {
                <$name>::push(self, value);
            }
            #[inline(always)]
            fn pop(&mut self) -> Option<u64> {
                <$name>::pop(self)
            }
            #[inline(always)]
            fn insert(&mut self, index: usize, value: u64) {
                <$name>::insert(self, index, value);
            }
            #[inline(always)]
            fn remove(&mut self, index: usize) -> u64 {
                <$name>::remove(self, index)
            }
            #[inline(always)]
            fn clear(&mut self) {
                <$name>::clear(self);
            }
            #[inline(always)]
            fn get_mut(&mut self, index: usize) -> &mut u64 {
                &mut self[index]
            }
        }
    };
}

impl_vec_like!(Vec<u64>);
impl_vec_like!(DynArray<u64>);
impl_vec_like!(SmallVec<u64, SMALL_SIZE>);

macro_rules! gen_bench_group {
    ($c:ident => $fn_name:ident) => {{
        let mut group_new = $c.benchmark_group(stringify!($fn_name));
        group_new.bench_function("Vec", |b| $fn_name::<Vec<u64>>(b));
        group_new.bench_function("DynArray", |b| $fn_name::<DynArray<u64>>(b));
        group_new.bench_function("SmallVec", |b| $fn_name::<SmallVec<u64, SMALL_SIZE>>(b));
    }};
}

fn bench_vec(c: &mut Criterion) {
    SMALL_BOUND.get_or_init(|| gen_one(14, 16));
    LARGE_BOUND.get_or_init(|| gen_one(36000, 36003));
    gen_bench_group!(c => new_empty);
    gen_bench_group!(c => push_small_from_empty);
    gen_bench_group!(c => push_large);
    gen_bench_group!(c => push_large_from_empty);
    gen_bench_group!(c => pop_large);
    gen_bench_group!(c => insert_large);
    gen_bench_group!(c => remove_large);
    gen_bench_group!(c => clone_large);
    gen_bench_group!(c => clone_from_large);
    gen_bench_group!(c => index_large);
}

/// Filled with `len` random values, with capacity for `capacity`.
fn filled<T: VecLike>(len: usize, capacity: usize) -> T {
    let mut vec = T::with_capacity(capacity);
    for item in gen_rand(len, 0, 9999).iter() {
        vec.push(*item);
    }
    vec
}

/// Test the creation time of an empty vector.
///
/// No container needs to allocate here.
#[inline(never)]
fn new_empty<T: VecLike>(b: &mut Bencher) {
    b.iter(|| hint::black_box(T::new_empty()));
}

/// Not pre allocating, so `Vec` and `DynArray` grow a few times.
///
/// The data volume is 14-15.
#[inline(never)]
fn push_small_from_empty<T: VecLike>(b: &mut Bencher) {
    let data = gen_rand(*SMALL_BOUND.get().unwrap(), 0, 9999);
    let index = gen_one(0, *SMALL_BOUND.get().unwrap());

    b.iter(|| {
        let mut vec = T::new_empty();
        for item in &data {
            vec.push(*item);
        }
        hint::black_box(*vec.get_mut(index))
    });
}

/// Pre allocate capacity and only test the efficiency of `push`.
///
/// The data volume is 36000-36002.
#[inline(never)]
fn push_large<T: VecLike>(b: &mut Bencher) {
    let mut vec = T::with_capacity(LARGE_SIZE);
    let data = gen_rand(*LARGE_BOUND.get().unwrap(), 0, 9999);
    let index = gen_rand(10, 0, *LARGE_BOUND.get().unwrap() as _);

    b.iter(|| {
        let mut counter = 0u64;
        vec.clear();
        for item in &data {
            vec.push(*item);
        }
        for item in &index {
            counter += *vec.get_mut(*item as usize);
        }
        hint::black_box(counter)
    });
}

/// Not pre allocating heap memory, all containers need to be expanded.
///
/// The data volume is 36000-36002.
#[inline(never)]
fn push_large_from_empty<T: VecLike>(b: &mut Bencher) {
    let data = gen_rand(*LARGE_BOUND.get().unwrap(), 0, 9999);
    let index = gen_rand(10, 0, *LARGE_BOUND.get().unwrap() as _);

    b.iter(|| {
        let mut vec = T::new_empty();
        let mut counter = 0u64;
        for item in &data {
            vec.push(*item);
        }
        for item in &index {
            counter += *vec.get_mut(*item as usize);
        }
        hint::black_box(counter)
    });
}

/// Test `pop` efficient, will not reallocate memory.
///
/// The data volume is 36000-36002.
#[inline(never)]
fn pop_large<T: VecLike>(b: &mut Bencher) {
    let num = *LARGE_BOUND.get().unwrap();
    let source: T = filled(num, LARGE_SIZE);

    b.iter_batched_ref(
        || source.clone(),
        |vec| {
            let mut counter = 0u64;
            while let Some(item) = vec.pop() {
                counter += item;
            }
            hint::black_box(counter)
        },
        criterion::BatchSize::LargeInput,
    );
}

/// Test `insert` efficient, will not reallocate memory.
///
/// The data volume is 36000-36002.
#[inline(never)]
fn insert_large<T: VecLike>(b: &mut Bencher) {
    let num = *LARGE_BOUND.get().unwrap();
    let source: T = filled(36000, LARGE_SIZE);
    let index = gen_one(0, 36004);

    b.iter_batched_ref(
        || source.clone(),
        |vec| {
            vec.insert(num % 12 + 35000, 6);
            vec.insert(num % 20 + 20000, 7);
            vec.insert(num % 16 + 10000, 8);
            vec.insert(num % 13, 11);
            hint::black_box(*vec.get_mut(index))
        },
        criterion::BatchSize::LargeInput,
    );
}

/// Test `remove` efficient, will not reallocate memory.
///
/// The data volume is 36000-36002.
#[inline(never)]
fn remove_large<T: VecLike>(b: &mut Bencher) {
    let num = *LARGE_BOUND.get().unwrap();
    let source: T = filled(36050, LARGE_SIZE);
    let index = gen_one(0, 36000);

    b.iter_batched_ref(
        || source.clone(),
        |vec| {
            vec.remove(num % 12 + 35000);
            vec.remove(num % 20 + 20000);
            vec.remove(num % 16 + 10000);
            vec.remove(num % 13);
            hint::black_box(*vec.get_mut(index))
        },
        criterion::BatchSize::LargeInput,
    );
}

/// Copy construction of a large vector.
///
/// The data volume is 36000-36002.
#[inline(never)]
fn clone_large<T: VecLike>(b: &mut Bencher) {
    let source: T = filled(*LARGE_BOUND.get().unwrap(), LARGE_SIZE);
    b.iter(|| hint::black_box(source.clone()));
}

/// Copy assignment into a vector that already has enough capacity.
///
/// The data volume is 36000-36002.
#[inline(never)]
fn clone_from_large<T: VecLike>(b: &mut Bencher) {
    let source: T = filled(*LARGE_BOUND.get().unwrap(), LARGE_SIZE);
    let mut target: T = filled(100, LARGE_SIZE);

    b.iter(|| {
        target.clone_from(&source);
        hint::black_box(*target.get_mut(7))
    });
}

/// Test `index` efficient, will not reallocate memory.
///
/// The data volume is 36000-36002.
#[inline(never)]
fn index_large<T: VecLike>(b: &mut Bencher) {
    let mut vec: T = filled(*LARGE_BOUND.get().unwrap(), LARGE_SIZE);

    let index = gen_one(0, 36000);
    let range = gen_rand(10, 0, 36000);

    b.iter(|| {
        let mut counter = 0u64;
        for item in &range {
            *vec.get_mut(*item as usize) += *item;
        }
        counter += *vec.get_mut(index);
        hint::black_box(counter)
    });
}

criterion_group!(benches, bench_vec);
criterion_main!(benches);
