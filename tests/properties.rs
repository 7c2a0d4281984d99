use dynarray::DynArray;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Push(u16),
    Pop,
    Insert(usize, u16),
    Erase(usize),
    InsertFromWithin(usize, usize),
    Resize(usize),
    Reserve(usize),
    Truncate(usize),
    ShrinkToFit,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<u16>().prop_map(Op::Push),
        2 => Just(Op::Pop),
        3 => (any::<usize>(), any::<u16>()).prop_map(|(i, v)| Op::Insert(i, v)),
        2 => any::<usize>().prop_map(Op::Erase),
        1 => (any::<usize>(), any::<usize>()).prop_map(|(i, s)| Op::InsertFromWithin(i, s)),
        1 => (0usize..64).prop_map(Op::Resize),
        1 => (0usize..64).prop_map(Op::Reserve),
        1 => (0usize..64).prop_map(Op::Truncate),
        1 => Just(Op::ShrinkToFit),
    ]
}

proptest! {
    #[test]
    fn behaves_like_vec(ops in proptest::collection::vec(op(), 0..200)) {
        let mut vec: DynArray<u16> = DynArray::new();
        let mut model: Vec<u16> = Vec::new();

        for op in ops {
            match op {
                Op::Push(v) => {
                    vec.push(v);
                    model.push(v);
                }
                Op::Pop => {
                    prop_assert_eq!(vec.pop(), model.pop());
                }
                Op::Insert(i, v) => {
                    let i = i % (model.len() + 1);
                    prop_assert_eq!(*vec.insert(i, v), v);
                    model.insert(i, v);
                }
                Op::Erase(i) => {
                    if !model.is_empty() {
                        let i = i % model.len();
                        prop_assert_eq!(vec.erase(i), i);
                        model.remove(i);
                    }
                }
                Op::InsertFromWithin(i, s) => {
                    if !model.is_empty() {
                        let i = i % (model.len() + 1);
                        let s = s % model.len();
                        vec.insert_from_within(i, s);
                        model.insert(i, model[s]);
                    }
                }
                Op::Resize(n) => {
                    vec.resize(n);
                    model.resize(n, 0);
                }
                Op::Reserve(n) => {
                    let before = vec.capacity();
                    vec.reserve(n);
                    prop_assert_eq!(vec.capacity(), before.max(n));
                }
                Op::Truncate(n) => {
                    vec.truncate(n);
                    model.truncate(n);
                }
                Op::ShrinkToFit => {
                    vec.shrink_to_fit();
                    prop_assert_eq!(vec.capacity(), model.len());
                }
            }
            prop_assert!(vec.len() <= vec.capacity());
            prop_assert_eq!(vec.as_slice(), model.as_slice());
        }
    }

    #[test]
    fn push_then_pop_restores(items in proptest::collection::vec(any::<i64>(), 0..64), extra in any::<i64>()) {
        let mut vec: DynArray<i64> = items.iter().copied().collect();
        vec.push(extra);
        vec.pop_back();
        prop_assert_eq!(vec, items);
    }

    #[test]
    fn insert_then_erase_restores(
        items in proptest::collection::vec(any::<i64>(), 0..64),
        index in any::<usize>(),
        value in any::<i64>(),
    ) {
        let mut vec = DynArray::from(items.clone());
        let index = index % (items.len() + 1);
        vec.insert(index, value);
        prop_assert_eq!(vec[index], value);
        prop_assert_eq!(vec.erase(index), index);
        prop_assert_eq!(vec, items);
    }

    #[test]
    fn growth_by_push_stays_power_of_two(n in 1usize..2000) {
        let mut vec: DynArray<u8> = DynArray::new();
        for i in 0..n {
            vec.push(i as u8);
            prop_assert!(vec.capacity().is_power_of_two());
            prop_assert!(vec.capacity() >= vec.len());
            prop_assert!(vec.capacity() < 2 * vec.len().max(1));
        }
    }

    #[test]
    fn clones_are_independent(
        items in proptest::collection::vec(any::<String>(), 0..32),
        other in proptest::collection::vec(any::<String>(), 0..32),
    ) {
        let original = DynArray::from(items.clone());
        let mut copy = original.clone();
        prop_assert_eq!(copy.capacity(), items.len());

        copy.push(String::from("tail"));
        copy.clone_from(&DynArray::from(other.clone()));
        prop_assert_eq!(&copy, &other);
        prop_assert_eq!(&original, &items);
    }
}
