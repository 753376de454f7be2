use super::*;
use crate::collections::avl_tree::print_memory;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use std::collections::BTreeSet;

const REP: usize = if cfg!(miri) { 2 } else { 10 };
const N: usize = if cfg!(miri) { 100 } else { 100000 };

fn forward<T: Clone>(set: &AvlSet<T>) -> Vec<T> {
    let mut out = Vec::new();
    let mut c = set.begin();
    while let Some(v) = c.get() {
        out.push(v.clone());
        c.move_next();
    }
    out
}

fn backward<T: Clone + Ord>(set: &AvlSet<T>) -> Vec<T> {
    let mut out = Vec::new();
    let mut c = set.end();
    while c != set.begin() {
        c.move_prev();
        out.push(c.get().unwrap().clone());
    }
    out
}

#[test]
fn exp_example_scenario() {
    let mut set = AvlSet::new();
    for x in [5, 3, 8, 1, 4, 7, 9] {
        set.insert(x);
    }
    assert_eq!(forward(&set), [1, 3, 4, 5, 7, 8, 9]);
    assert_eq!(set.lower_bound(&6).get(), Some(&7));
    set.erase(&8);
    assert_eq!(forward(&set), [1, 3, 4, 5, 7, 9]);
    assert_eq!(set.size(), 6);
    assert!(set.find(&8) == set.end());
    assert_eq!(set.validate(), Ok(()));
}

#[test]
fn exp_empty_set_cursors() {
    let set: AvlSet<i32> = AvlSet::new();
    assert!(set.empty());
    assert!(set.begin() == set.end());
    let mut c = set.end();
    c.move_prev();
    assert!(c.is_end());
    assert_eq!(c.get(), None);
    c.move_next();
    assert!(c.is_end());
    assert!(set.find(&1).is_end());
    assert!(set.lower_bound(&1).is_end());
    assert!(set.upper_bound(&1).is_end());
}

#[test]
fn exp_end_steps_back_to_last() {
    let set = AvlSet::from([1, 2, 3]);
    let mut c = set.end();
    assert!(c.is_end());
    c.move_prev();
    assert_eq!(c.get(), Some(&3));
    c.move_next();
    assert!(c.is_end());
    // Moving forward from the end stays at the end.
    c.move_next();
    assert!(c.is_end());
    c.move_prev();
    assert_eq!(c.get(), Some(&3));
}

#[test]
fn exp_step_back_past_first() {
    let set = AvlSet::from([1, 2, 3]);
    let mut c = set.begin();
    c.move_prev();
    assert!(c.is_end());
    assert!(c == set.end());
    c.move_prev();
    assert_eq!(c.get(), Some(&1));
}

#[test]
fn exp_single_element_cursor() {
    let set = AvlSet::from([7]);
    let mut c = set.begin();
    assert_eq!(c.get(), Some(&7));
    c.move_next();
    assert!(c == set.end());
    c.move_prev();
    assert!(c == set.begin());
    c.move_prev();
    assert!(c.is_end());
}

#[test]
fn exp_cursor_equality() {
    let a = AvlSet::from([1, 2, 3]);
    let b = a.clone();
    assert!(a.find(&2) == a.lower_bound(&2));
    assert!(a.find(&2) != a.find(&3));
    assert!(a.find(&2) != a.end());
    assert!(a.end() != a.find(&3));
    // Equality is by value, so cursors into a copy compare equal too.
    assert!(a.find(&2) == b.find(&2));
    assert!(a.find(&9) == b.end());
    let mut c = a.begin();
    c.move_prev();
    assert!(c == a.end());
}

#[test]
fn exp_cursor_iterator() {
    let set: AvlSet<u32> = (0..20).map(|x| x * 5).collect();
    let got: Vec<_> = set.lower_bound(&42).take(3).copied().collect();
    assert_eq!(got, [45, 50, 55]);
    assert_eq!(set.upper_bound(&90).copied().collect::<Vec<_>>(), [95]);
    assert_eq!(set.end().next(), None);
    assert_eq!(set.begin().count(), set.len());
}

#[test]
fn exp_cursor_debug() {
    let set = AvlSet::from([4]);
    assert_eq!(format!("{:?}", set.begin()), "Cursor(4)");
    assert_eq!(format!("{:?}", set.end()), "Cursor(end)");
}

#[test]
fn exp_set_semantics() {
    let mut set = AvlSet::from([3, 1, 2]);
    assert!(!set.insert(2));
    assert_eq!(set.len(), 3);
    assert_eq!(forward(&set), [1, 2, 3]);
    assert!(!set.erase(&5));
    assert!(!set.remove(&0));
    assert_eq!(forward(&set), [1, 2, 3]);
    assert!(set.remove(&2));
    assert!(!set.contains(&2));
    assert_eq!(set.get(&3), Some(&3));
    assert_eq!(set.take(&1), Some(1));
    assert_eq!(forward(&set), [3]);
}

#[test]
fn exp_literal_and_range_construction() {
    let set = AvlSet::from([5, 1, 5, 3, 1]);
    assert_eq!(set.len(), 3);
    let v = vec![9, 7, 8, 7];
    let set2: AvlSet<i32> = v.iter().copied().collect();
    assert_eq!(forward(&set2), [7, 8, 9]);
    let set3: AvlSet<i32> = v[1..3].iter().copied().collect();
    assert_eq!(forward(&set3), [7, 8]);
    let mut set4: AvlSet<i32> = AvlSet::new();
    set4.extend(&[2, 4]);
    set4.extend(vec![4, 6]);
    assert_eq!(forward(&set4), [2, 4, 6]);
    assert_eq!(AvlSet::<i32>::default(), AvlSet::new());
}

#[test]
fn exp_strings_borrowed() {
    let mut set: AvlSet<String> = AvlSet::new();
    for s in ["delta", "alpha", "charlie", "bravo"] {
        set.insert(s.to_string());
    }
    assert!(set.contains("alpha"));
    assert_eq!(set.lower_bound("c").get().map(String::as_str), Some("charlie"));
    assert!(set.erase("bravo"));
    assert_eq!(set.first().map(String::as_str), Some("alpha"));
    assert_eq!(set.last().map(String::as_str), Some("delta"));
    assert_eq!(format!("{set:?}"), r#"{"alpha", "charlie", "delta"}"#);
}

#[test]
fn exp_round_trip() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut values: Vec<u32> = (0..500).collect();
    values.shuffle(&mut rng);
    let set: AvlSet<u32> = values.into_iter().collect();
    let fwd = forward(&set);
    assert_eq!(fwd, (0..500).collect::<Vec<_>>());
    let mut bwd = backward(&set);
    bwd.reverse();
    assert_eq!(bwd, fwd);
    assert!(set.iter().rev().copied().eq((0..500).rev()));
}

#[test]
fn exp_lower_bound_random() {
    let mut rng = StdRng::seed_from_u64(11);
    for _rep in 0..REP {
        let mut set = AvlSet::new();
        let mut std = BTreeSet::new();
        for _ in 0..300 {
            let k: i32 = rng.gen_range(-1000..1000);
            set.insert(k);
            std.insert(k);
        }
        for _ in 0..300 {
            let k: i32 = rng.gen_range(-1100..1100);
            assert_eq!(set.lower_bound(&k).get(), std.range(k..).next());
            assert_eq!(set.upper_bound(&k).get(), std.range(k + 1..).next());
            assert_eq!(set.find(&k).get(), std.get(&k));
        }
    }
}

#[test]
fn exp_random_ops() {
    let mut rng = StdRng::seed_from_u64(3);
    for _rep in 0..REP {
        let mut set = AvlSet::new();
        let mut std = BTreeSet::new();
        for _ in 0..3000 {
            let k: u8 = rng.gen();
            match rng.gen_range(0..3) {
                0 | 1 => assert_eq!(set.insert(k), std.insert(k)),
                _ => assert_eq!(set.erase(&k), std.remove(&k)),
            }
            assert_eq!(set.validate(), Ok(()));
        }
        assert_eq!(set.size(), std.len());
        assert_eq!(set.begin().count(), std.len());
        assert!(set.iter().eq(std.iter()));
    }
}

#[test]
fn exp_clone_independence() {
    let mut a: AvlSet<i32> = (0..100).collect();
    let mut b = a.clone();
    a.erase(&10);
    a.insert(1000);
    assert!(b.contains(&10));
    assert!(!b.contains(&1000));
    b.erase(&20);
    assert!(a.contains(&20));
    assert_eq!(a.len(), 100);
    assert_eq!(b.len(), 99);
    assert_eq!(a.validate(), Ok(()));
    assert_eq!(b.validate(), Ok(()));

    let mut c = AvlSet::from([-1, -2]);
    c.clone_from(&a);
    assert_eq!(c, a);
    a.clear();
    assert_eq!(c.len(), 100);
    assert!(a.begin() == a.end());
}

#[test]
fn exp_ordering_and_hash() {
    use std::collections::hash_map::DefaultHasher;

    let a = AvlSet::from([1, 2, 3]);
    let b = AvlSet::from([3, 2, 1]);
    let c = AvlSet::from([1, 2, 4]);
    assert_eq!(a, b);
    assert!(a < c);
    assert_eq!(a.cmp(&b), Ordering::Equal);
    let hash = |s: &AvlSet<i32>| {
        let mut h = DefaultHasher::new();
        s.hash(&mut h);
        h.finish()
    };
    assert_eq!(hash(&a), hash(&b));
}

#[test]
fn exp_into_iter_test() {
    let set: AvlSet<usize> = (0..N).rev().collect();
    let mut total = 0;
    for (i, x) in set.into_iter().enumerate() {
        assert_eq!(i, x);
        total += 1;
    }
    assert_eq!(total, N);
}

#[test]
fn std_into_iter_test() {
    let set: BTreeSet<usize> = (0..N).rev().collect();
    let mut total = 0;
    for (i, x) in set.into_iter().enumerate() {
        assert_eq!(i, x);
        total += 1;
    }
    assert_eq!(total, N);
}

#[test]
fn exp_cursor_walk_test() {
    let set: AvlSet<usize> = (0..N).collect();
    print_memory();
    let mut c = set.end();
    for i in (0..N).rev() {
        c.move_prev();
        assert_eq!(c.get(), Some(&i));
    }
    c.move_prev();
    assert!(c.is_end());
}

#[test]
#[cfg(feature = "serde")]
fn exp_serde_test() {
    let set: AvlSet<String> = ["x", "y", "x", "a"].iter().map(|s| s.to_string()).collect();
    let ser = bincode::serialize(&set).unwrap();
    let back: AvlSet<String> = bincode::deserialize(&ser).unwrap();
    assert_eq!(back, set);
    assert_eq!(back.len(), 3);
}
