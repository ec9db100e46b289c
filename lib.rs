// Rust-sorted: Guaranteed-sorted containers.
// Copyright (c) 2014, Kang Seonghoon.
// See README.md and LICENSE.txt for details.

//! A sorted dictionary ordered by a caller-supplied comparator.
//!
//! `SortedDict` keeps its keys and values in two parallel vectors, sorted by
//! key. Lookups are a binary search over the keys; insertion and removal
//! splice both vectors at the position that search reports. Two keys are the
//! same slot whenever the comparator says they are `Equal`, whatever else
//! they carry.
//!
//! ```
//! use sorted_dict::SortedDict;
//!
//! let mut dict = SortedDict::new();
//! dict.insert(5, "e");
//! dict.insert(1, "a");
//! dict.insert(3, "c");
//!
//! let (keys, values) = dict.extract_arrays();
//! assert_eq!(keys, [1, 3, 5]);
//! assert_eq!(values, ["a", "c", "e"]);
//! assert!(dict.is_empty());
//! ```

use std::cmp::Ordering::{self, Equal, Greater, Less};
use std::ops::Index;
use std::{fmt, iter, mem, slice, vec};

#[cfg(test)] use quickcheck::TestResult;
#[cfg(test)] use quickcheck_macros::quickcheck;

/// A three-way ordering over keys.
///
/// Implementations must be a strict total order up to equivalence and must
/// give the same answer for the same pair every time. A `SortedDict` never
/// checks this outside of debug assertions.
pub trait Comparator<K: ?Sized> {
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

impl<K: ?Sized, F> Comparator<K> for F where F: Fn(&K, &K) -> Ordering {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering { self(a, b) }
}

/// Orders keys by their `Ord` implementation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NaturalOrder;

impl<K: Ord + ?Sized> Comparator<K> for NaturalOrder {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering { a.cmp(b) }
}

/// Applied to a key or value as it moves into a `SortedDict`.
pub trait Capture<T> {
    fn capture(&self, value: T) -> T;
}

impl<T, F> Capture<T> for F where F: Fn(T) -> T {
    #[inline]
    fn capture(&self, value: T) -> T { self(value) }
}

/// Moves the value in unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Identity;

impl<T> Capture<T> for Identity {
    #[inline]
    fn capture(&self, value: T) -> T { value }
}

/// Returns the first index `i` such that `f(&v[i])` is no `Less`,
/// or `v.len()` if there is no such `i`.
/// `f` reports how `v[i]` orders against the target.
fn bsearch_no_less<T, F>(v: &[T], mut f: F) -> usize where F: FnMut(&T) -> Ordering {
    let mut base = 0;
    let mut limit = v.len();
    while limit != 0 { // invariant: v[base-1] (if any) < target <= v[base+limit] (if any)
        let ix = base + (limit >> 1);
        if f(&v[ix]) == Less {
            base = ix + 1;
            limit -= 1;
        }
        limit >>= 1;
    }
    base
}

#[cfg(test)]
#[quickcheck]
fn test_bsearch_no_less(mut v: Vec<u32>, x: u32) -> bool {
    v.sort();
    let i = bsearch_no_less(&v, |y| y.cmp(&x));
    v[..i].iter().all(|&y| y < x) && v[i..].iter().all(|&y| y >= x)
}

/// Returns the first index `i` such that `f(&v[i])` is `Greater`,
/// or `v.len()` if there is no such `i`.
fn bsearch_greater<T, F>(v: &[T], mut f: F) -> usize where F: FnMut(&T) -> Ordering {
    let mut base = 0;
    let mut limit = v.len();
    while limit != 0 { // invariant: v[base-1] (if any) <= target < v[base+limit] (if any)
        let ix = base + (limit >> 1);
        if f(&v[ix]) != Greater {
            base = ix + 1;
            limit -= 1;
        }
        limit >>= 1;
    }
    base
}

#[cfg(test)]
#[quickcheck]
fn test_bsearch_greater(mut v: Vec<u32>, x: u32) -> bool {
    v.sort();
    let i = bsearch_greater(&v, |y| y.cmp(&x));
    v[..i].iter().all(|&y| y <= x) && v[i..].iter().all(|&y| y > x)
}

/// Finds where `key` belongs in `sorted_keys`.
///
/// Returns the smallest index `i` with `compare(key, sorted_keys[i]) != Greater`
/// (or `sorted_keys.len()`), together with whether `sorted_keys[i]` is
/// equivalent to `key`. `sorted_keys` must be strictly increasing under
/// `compare`.
///
/// This takes O(log n) comparisons. If `compare` is not a total order the
/// result is unspecified but still in bounds; debug builds assert on the
/// violations that are visible around the match.
pub fn lower_bound<K, C>(key: &K, sorted_keys: &[K], compare: &C) -> (usize, bool)
        where C: Comparator<K> + ?Sized {
    let i = bsearch_no_less(sorted_keys, |k| compare.compare(key, k).reverse());
    let equal = match sorted_keys.get(i) {
        Some(k) => compare.compare(key, k) == Equal,
        None => false,
    };
    if equal {
        debug_assert!(compare.compare(&sorted_keys[i], key) == Equal,
                      "comparator is not antisymmetric");
        debug_assert!(sorted_keys.get(i + 1).map_or(true, |k| compare.compare(key, k) == Less),
                      "keys are not strictly sorted under the comparator");
    }
    (i, equal)
}

#[cfg(test)]
#[quickcheck]
fn test_lower_bound(mut v: Vec<u32>, x: u32) -> bool {
    v.sort();
    v.dedup();
    let (i, equal) = lower_bound(&x, &v, &NaturalOrder);
    v[..i].iter().all(|&y| y < x) && v[i..].iter().all(|&y| y >= x) &&
        equal == (v.get(i) == Some(&x))
}

#[cfg(test)]
#[quickcheck]
fn test_lower_bound_present(mut v: Vec<u32>, pick: usize) -> TestResult {
    if v.is_empty() { return TestResult::discard(); }

    v.sort();
    v.dedup();
    let i = pick % v.len();
    TestResult::from_bool(lower_bound(&v[i], &v, &NaturalOrder) == (i, true))
}

/// Returns the first index whose key compares `Greater` than `key`,
/// or `sorted_keys.len()` if there is none.
pub fn upper_bound<K, C>(key: &K, sorted_keys: &[K], compare: &C) -> usize
        where C: Comparator<K> + ?Sized {
    bsearch_greater(sorted_keys, |k| compare.compare(key, k).reverse())
}

#[cfg(test)]
#[quickcheck]
fn test_upper_bound(mut v: Vec<u32>, x: u32) -> bool {
    v.sort();
    let i = upper_bound(&x, &v, &NaturalOrder);
    v[..i].iter().all(|&y| y <= x) && v[i..].iter().all(|&y| y > x)
}

/// Whether every key compares `Less` than its successor.
pub fn is_strictly_sorted<K, C>(keys: &[K], compare: &C) -> bool
        where C: Comparator<K> + ?Sized {
    keys.windows(2).all(|win| compare.compare(&win[0], &win[1]) == Less)
}

#[cfg(test)]
#[quickcheck]
fn test_is_strictly_sorted(mut v: Vec<u32>) -> bool {
    v.sort();
    let has_duplicates = v.windows(2).any(|win| win[0] == win[1]);
    if is_strictly_sorted(&v, &NaturalOrder) == has_duplicates { return false; }
    v.dedup();
    v.reverse();
    is_strictly_sorted(&v, &NaturalOrder) == (v.len() < 2)
}

pub type Iter<'a, K, V> = iter::Zip<slice::Iter<'a, K>, slice::Iter<'a, V>>;
pub type IntoIter<K, V> = iter::Zip<vec::IntoIter<K>, vec::IntoIter<V>>;

/// A dictionary whose keys are kept sorted under a comparator `C`.
///
/// `CK` and `CV` are applied to keys and values as they are inserted; both
/// default to `Identity`, which simply moves them in.
///
/// Lookup is O(log n); insertion and removal are O(n) because they shift the
/// tail of both vectors. This suits the small-to-medium sizes of registries
/// and lookup tables rather than large indexes.
#[derive(Clone)]
pub struct SortedDict<K, V, C = NaturalOrder, CK = Identity, CV = Identity> {
    keys: Vec<K>,
    values: Vec<V>,
    compare: C,
    capture_key: CK,
    capture_value: CV,
}

impl<K: Ord, V> SortedDict<K, V> {
    /// An empty dictionary ordered by `K`'s `Ord`.
    pub fn new() -> SortedDict<K, V> {
        SortedDict::with_comparator(NaturalOrder)
    }
}

impl<K, V, C: Comparator<K>> SortedDict<K, V, C> {
    pub fn with_comparator(compare: C) -> SortedDict<K, V, C> {
        SortedDict::with_capture(compare, Identity, Identity)
    }

    pub fn with_capacity(compare: C, capacity: usize) -> SortedDict<K, V, C> {
        SortedDict {
            keys: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
            compare,
            capture_key: Identity,
            capture_value: Identity,
        }
    }

    /// Adopts `keys` and `values` as they are, if `keys` is strictly sorted
    /// under `compare` and both have the same length. Otherwise they are
    /// handed back untouched.
    pub fn from_sorted_arrays(compare: C, keys: Vec<K>, values: Vec<V>)
            -> Result<SortedDict<K, V, C>, (Vec<K>, Vec<V>)> {
        if keys.len() == values.len() && is_strictly_sorted(&keys, &compare) {
            Ok(SortedDict {
                keys,
                values,
                compare,
                capture_key: Identity,
                capture_value: Identity,
            })
        } else {
            Err((keys, values))
        }
    }

    /// Sorts `pairs` by key. Of several equivalent keys, the first one in
    /// `pairs` wins, as if they had been added with `insert`.
    pub fn from_unsorted_pairs(compare: C, mut pairs: Vec<(K, V)>) -> SortedDict<K, V, C> {
        pairs.sort_by(|a, b| compare.compare(&a.0, &b.0)); // stable
        let mut dict = SortedDict::with_capacity(compare, pairs.len());
        for (k, v) in pairs {
            let duplicate = match dict.keys.last() {
                Some(last) => dict.compare.compare(last, &k) == Equal,
                None => false,
            };
            if !duplicate {
                dict.keys.push(k);
                dict.values.push(v);
            }
        }
        dict
    }
}

impl<K, V, C, CK, CV> SortedDict<K, V, C, CK, CV> where C: Comparator<K> {
    #[inline]
    fn lookup(&self, key: &K) -> (usize, bool) {
        lower_bound(key, &self.keys, &self.compare)
    }

    /// Index of the key equivalent to `key`, if any.
    pub fn position(&self, key: &K) -> Option<usize> {
        match self.lookup(key) {
            (i, true) => Some(i),
            _ => None,
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.position(key).map(|i| &self.values[i])
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        match self.position(key) {
            Some(i) => Some(&mut self.values[i]),
            None => None,
        }
    }

    /// Like `get`, but also returns the stored key, which may differ from
    /// `key` in everything the comparator ignores.
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        self.position(key).map(|i| (&self.keys[i], &self.values[i]))
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.lookup(key).1
    }

    /// Removes the pair whose key is equivalent to `key`.
    /// Returns whether there was one.
    pub fn delete(&mut self, key: &K) -> bool {
        self.remove(key).is_some()
    }

    /// Removes and returns the pair whose key is equivalent to `key`.
    pub fn remove(&mut self, key: &K) -> Option<(K, V)> {
        let i = self.position(key)?;
        Some((self.keys.remove(i), self.values.remove(i)))
    }

    #[cfg(test)]
    fn is_consistent(&self) -> bool {
        self.keys.len() == self.values.len() && is_strictly_sorted(&self.keys, &self.compare)
    }
}

impl<K, V, C, CK, CV> SortedDict<K, V, C, CK, CV>
        where C: Comparator<K>, CK: Capture<K>, CV: Capture<V> {
    /// An empty dictionary that passes inserted keys through `capture_key`
    /// and inserted values through `capture_value`.
    pub fn with_capture(compare: C, capture_key: CK, capture_value: CV)
            -> SortedDict<K, V, C, CK, CV> {
        SortedDict {
            keys: Vec::new(),
            values: Vec::new(),
            compare,
            capture_key,
            capture_value,
        }
    }

    fn splice_in(&mut self, i: usize, key: K, value: V) {
        let key = self.capture_key.capture(key);
        let value = self.capture_value.capture(value);
        debug_assert!(i == 0 || self.compare.compare(&self.keys[i-1], &key) == Less,
                      "captured key sorts before its predecessor");
        debug_assert!(i == self.keys.len() || self.compare.compare(&key, &self.keys[i]) == Less,
                      "captured key sorts after its successor");
        self.keys.insert(i, key);
        self.values.insert(i, value);
    }

    /// Inserts the pair unless an equivalent key is already present, in
    /// which case nothing changes and `value` is dropped.
    /// Returns whether the pair was inserted.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        match self.lookup(&key) {
            (_, true) => false,
            (i, false) => {
                self.splice_in(i, key, value);
                true
            }
        }
    }

    /// Inserts the pair, or replaces the value of an equivalent key.
    ///
    /// When an equivalent key exists, the stored key is kept and `key` is
    /// dropped; only the value changes.
    pub fn set(&mut self, key: K, value: V) {
        match self.lookup(&key) {
            (i, true) => self.values[i] = self.capture_value.capture(value),
            (i, false) => self.splice_in(i, key, value),
        }
    }

    /// Returns the value for `key`, inserting `f()` first if it is absent.
    pub fn get_or_insert_with<F>(&mut self, key: K, f: F) -> &mut V where F: FnOnce() -> V {
        let i = match self.lookup(&key) {
            (i, true) => i,
            (i, false) => {
                self.splice_in(i, key, f());
                i
            }
        };
        &mut self.values[i]
    }
}

impl<K, V, C, CK, CV> SortedDict<K, V, C, CK, CV> {
    pub fn len(&self) -> usize { self.keys.len() }

    pub fn is_empty(&self) -> bool { self.keys.is_empty() }

    pub fn clear(&mut self) {
        self.keys.clear();
        self.values.clear();
    }

    pub fn comparator(&self) -> &C { &self.compare }

    /// The keys in ascending order.
    pub fn keys(&self) -> &[K] { &self.keys }

    /// The values, aligned with `keys()`.
    pub fn values(&self) -> &[V] { &self.values }

    pub fn values_mut(&mut self) -> &mut [V] { &mut self.values }

    pub fn first(&self) -> Option<(&K, &V)> {
        self.keys.first().zip(self.values.first())
    }

    pub fn last(&self) -> Option<(&K, &V)> {
        self.keys.last().zip(self.values.last())
    }

    pub fn iter(&self) -> Iter<K, V> {
        self.keys.iter().zip(self.values.iter())
    }

    /// Calls `f` on every pair in ascending key order.
    ///
    /// The dictionary stays borrowed for the whole call, so `f` cannot
    /// modify it.
    pub fn for_each<F>(&self, mut f: F) where F: FnMut(&K, &V) {
        for (k, v) in self.iter() {
            f(k, v);
        }
    }

    /// Keeps only the pairs for which `f` returns `true`, preserving order.
    pub fn retain<F>(&mut self, mut f: F) where F: FnMut(&K, &mut V) -> bool {
        let keys = mem::take(&mut self.keys);
        let values = mem::take(&mut self.values);
        self.keys.reserve(keys.len());
        self.values.reserve(values.len());
        for (k, mut v) in keys.into_iter().zip(values) {
            if f(&k, &mut v) {
                self.keys.push(k);
                self.values.push(v);
            }
        }
    }

    /// Takes every pair out in ascending key order, leaving the dictionary
    /// empty.
    pub fn extract_pairs(&mut self) -> Vec<(K, V)> {
        let (keys, values) = self.extract_arrays();
        keys.into_iter().zip(values).collect()
    }

    /// Takes the backing vectors out without copying, leaving the
    /// dictionary empty with fresh storage.
    pub fn extract_arrays(&mut self) -> (Vec<K>, Vec<V>) {
        (mem::take(&mut self.keys), mem::take(&mut self.values))
    }

    pub fn capacity(&self) -> usize {
        self.keys.capacity().min(self.values.capacity())
    }

    pub fn reserve(&mut self, additional: usize) {
        self.keys.reserve(additional);
        self.values.reserve(additional);
    }

    pub fn shrink_to_fit(&mut self) {
        self.keys.shrink_to_fit();
        self.values.shrink_to_fit();
    }
}

impl<K, V, C: Default, CK: Default, CV: Default> Default for SortedDict<K, V, C, CK, CV> {
    fn default() -> SortedDict<K, V, C, CK, CV> {
        SortedDict {
            keys: Vec::new(),
            values: Vec::new(),
            compare: C::default(),
            capture_key: CK::default(),
            capture_value: CV::default(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C, CK, CV> fmt::Debug for SortedDict<K, V, C, CK, CV> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: PartialEq, V: PartialEq, C, CK, CV> PartialEq for SortedDict<K, V, C, CK, CV> {
    fn eq(&self, other: &SortedDict<K, V, C, CK, CV>) -> bool {
        self.keys == other.keys && self.values == other.values
    }
}

impl<K: Eq, V: Eq, C, CK, CV> Eq for SortedDict<K, V, C, CK, CV> {}

impl<'a, K, V, C: Comparator<K>, CK, CV> Index<&'a K> for SortedDict<K, V, C, CK, CV> {
    type Output = V;

    /// Panics if no equivalent key is present.
    fn index(&self, key: &'a K) -> &V {
        match self.get(key) {
            Some(v) => v,
            None => panic!("no entry found for key"),
        }
    }
}

impl<K, V, C, CK, CV> IntoIterator for SortedDict<K, V, C, CK, CV> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        self.keys.into_iter().zip(self.values)
    }
}

impl<'a, K, V, C, CK, CV> IntoIterator for &'a SortedDict<K, V, C, CK, CV> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> { self.iter() }
}

/// Each pair is added with `set`, so later pairs overwrite earlier values.
impl<K, V, C, CK, CV> Extend<(K, V)> for SortedDict<K, V, C, CK, CV>
        where C: Comparator<K>, CK: Capture<K>, CV: Capture<V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iterable: I) {
        for (k, v) in iterable {
            self.set(k, v);
        }
    }
}

impl<K: Ord, V> iter::FromIterator<(K, V)> for SortedDict<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iterable: I) -> SortedDict<K, V> {
        let mut dict = SortedDict::new();
        dict.extend(iterable);
        dict
    }
}

#[cfg(test)]
#[quickcheck]
fn test_insert_keeps_existing(pairs: Vec<(u16, u16)>, key: u16, value: u16) -> bool {
    let mut dict: SortedDict<u16, u16> = pairs.into_iter().collect();
    let len = dict.len();
    let before = dict.get(&key).cloned();
    let inserted = dict.insert(key, value);
    match before {
        Some(old) => !inserted && dict.len() == len && dict.get(&key) == Some(&old),
        None => inserted && dict.len() == len + 1 && dict.get(&key) == Some(&value),
    }
}

#[cfg(test)]
#[quickcheck]
fn test_set_then_get(pairs: Vec<(u16, u16)>, key: u16, value: u16) -> bool {
    let mut dict: SortedDict<u16, u16> = pairs.into_iter().collect();
    dict.set(key, value);
    dict.get(&key) == Some(&value) && dict.is_consistent()
}

#[cfg(test)]
#[quickcheck]
fn test_delete_then_get(pairs: Vec<(u16, u16)>, key: u16) -> bool {
    let mut dict: SortedDict<u16, u16> = pairs.into_iter().collect();
    let before = dict.clone();
    if dict.delete(&key) {
        dict.get(&key).is_none() && dict.len() + 1 == before.len() && dict.is_consistent()
    } else {
        dict == before
    }
}

#[cfg(test)]
#[quickcheck]
fn test_extraction_drains(pairs: Vec<(u16, u16)>) -> bool {
    let mut dict: SortedDict<u16, u16> = pairs.into_iter().collect();
    let expected: Vec<(u16, u16)> = dict.iter().map(|(&k, &v)| (k, v)).collect();
    let mut copy = dict.clone();

    let extracted = dict.extract_pairs();
    let (keys, values) = copy.extract_arrays();
    dict.is_empty() && copy.is_empty() && extracted == expected &&
        keys.into_iter().zip(values).eq(expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::collections::BTreeMap;

    fn case_insensitive(a: &&str, b: &&str) -> Ordering {
        a.to_lowercase().cmp(&b.to_lowercase())
    }

    #[derive(Clone, Debug, PartialEq)]
    struct Tagged {
        id: u32,
        tag: &'static str,
    }

    fn by_id(a: &Tagged, b: &Tagged) -> Ordering {
        a.id.cmp(&b.id)
    }

    #[test]
    fn round_trip() {
        let mut dict = SortedDict::new();
        assert!(dict.insert(5, "e"));
        assert!(dict.insert(1, "a"));
        assert!(dict.insert(3, "c"));
        let (keys, values) = dict.extract_arrays();
        assert_eq!(keys, vec![1, 3, 5]);
        assert_eq!(values, vec!["a", "c", "e"]);
        assert_eq!(dict.len(), 0);
        assert_eq!(dict.get(&3), None);
    }

    #[test]
    fn equivalent_keys_share_a_slot() {
        let mut dict: SortedDict<&str, i32, _> = SortedDict::with_comparator(case_insensitive);
        assert!(dict.insert("A", 1));
        assert!(!dict.insert("a", 2));
        assert_eq!(dict.get(&"a"), Some(&1));
        assert_eq!(dict.get_key_value(&"a"), Some((&"A", &1)));
        assert_eq!(dict.len(), 1);

        dict.set("a", 3);
        assert_eq!(dict.get(&"A"), Some(&3));
        assert_eq!(dict.keys(), ["A"]);

        assert!(dict.delete(&"a"));
        assert!(dict.is_empty());
    }

    #[test]
    fn lookup_on_empty() {
        let dict: SortedDict<i32, ()> = SortedDict::new();
        assert_eq!(dict.get(&42), None);
        assert!(!dict.contains_key(&42));
        assert_eq!(lower_bound(&42, dict.keys(), dict.comparator()), (0, false));
        assert_eq!(upper_bound(&42, dict.keys(), dict.comparator()), 0);
        assert_eq!(dict.first(), None);
        assert_eq!(dict.last(), None);
    }

    #[test]
    fn lower_bound_edges() {
        let keys = [10, 20, 30];
        assert_eq!(lower_bound(&5, &keys, &NaturalOrder), (0, false));
        assert_eq!(lower_bound(&10, &keys, &NaturalOrder), (0, true));
        assert_eq!(lower_bound(&25, &keys, &NaturalOrder), (2, false));
        assert_eq!(lower_bound(&30, &keys, &NaturalOrder), (2, true));
        assert_eq!(lower_bound(&35, &keys, &NaturalOrder), (3, false));
        assert_eq!(upper_bound(&20, &keys, &NaturalOrder), 2);
    }

    #[test]
    fn set_keeps_the_stored_key() {
        let mut dict = SortedDict::with_comparator(by_id);
        dict.set(Tagged { id: 1, tag: "first" }, "a");
        dict.set(Tagged { id: 1, tag: "second" }, "b");
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.keys()[0].tag, "first");
        assert_eq!(dict.get(&Tagged { id: 1, tag: "other" }), Some(&"b"));
    }

    #[test]
    fn reverse_comparator() {
        let mut dict = SortedDict::with_comparator(|a: &i32, b: &i32| b.cmp(a));
        for k in [2, 9, 4, 7] {
            dict.set(k, k * 10);
        }
        assert_eq!(dict.keys(), [9, 7, 4, 2]);
        assert_eq!(dict.first(), Some((&9, &90)));
        assert_eq!(dict.last(), Some((&2, &20)));
    }

    #[test]
    fn capture_runs_only_on_the_way_in() {
        let key_calls = Cell::new(0);
        let value_calls = Cell::new(0);
        let mut dict = SortedDict::with_capture(
            NaturalOrder,
            |k: i32| { key_calls.set(key_calls.get() + 1); k },
            |v: String| { value_calls.set(value_calls.get() + 1); v.to_uppercase() });

        assert!(dict.insert(1, "one".to_string()));
        assert_eq!((key_calls.get(), value_calls.get()), (1, 1));

        // rejected insert captures nothing
        assert!(!dict.insert(1, "uno".to_string()));
        assert_eq!((key_calls.get(), value_calls.get()), (1, 1));

        // replacing a value leaves the key alone
        dict.set(1, "eins".to_string());
        assert_eq!((key_calls.get(), value_calls.get()), (1, 2));
        assert_eq!(dict.get(&1).map(|s| s.as_str()), Some("EINS"));

        dict.set(2, "two".to_string());
        assert_eq!((key_calls.get(), value_calls.get()), (2, 3));

        dict.get_or_insert_with(3, || "three".to_string());
        assert_eq!(dict[&3], "THREE");
        assert_eq!((key_calls.get(), value_calls.get()), (3, 4));
    }

    #[test]
    fn capture_detaches_shared_values() {
        let shared = Rc::new(RefCell::new(vec![1, 2, 3]));
        let mut dict = SortedDict::with_capture(
            NaturalOrder,
            |k: u8| k,
            |v: Rc<RefCell<Vec<i32>>>| {
                let copy = v.borrow().clone();
                Rc::new(RefCell::new(copy))
            });
        dict.insert(0, shared.clone());
        shared.borrow_mut().push(4);
        assert_eq!(*dict[&0].borrow(), [1, 2, 3]);
        assert_eq!(*shared.borrow(), [1, 2, 3, 4]);
    }

    #[test]
    fn from_sorted_arrays() {
        let dict = SortedDict::from_sorted_arrays(NaturalOrder, vec![1, 2, 3], vec!['a', 'b', 'c']);
        assert_eq!(dict.unwrap().get(&2), Some(&'b'));

        let unsorted = SortedDict::from_sorted_arrays(NaturalOrder, vec![2, 1], vec!['b', 'a']);
        assert_eq!(unsorted.unwrap_err(), (vec![2, 1], vec!['b', 'a']));

        let duplicated = SortedDict::from_sorted_arrays(NaturalOrder, vec![1, 1], vec!['a', 'b']);
        assert!(duplicated.is_err());

        let mismatched = SortedDict::from_sorted_arrays(NaturalOrder, vec![1, 2], vec!['a']);
        assert!(mismatched.is_err());
    }

    #[test]
    fn from_unsorted_pairs_keeps_first() {
        let dict = SortedDict::from_unsorted_pairs(
            case_insensitive,
            vec![("b", 1), ("A", 2), ("B", 3), ("a", 4), ("c", 5)]);
        assert_eq!(dict.keys(), ["A", "b", "c"]);
        assert_eq!(dict.values(), [2, 1, 5]);
    }

    #[test]
    fn remove_and_retain() {
        let mut dict: SortedDict<i32, i32> = (0..10).map(|k| (k, k * k)).collect();
        assert_eq!(dict.remove(&3), Some((3, 9)));
        assert_eq!(dict.remove(&3), None);
        assert!(!dict.delete(&3));

        dict.retain(|k, v| {
            *v += 1;
            k % 2 == 0
        });
        assert_eq!(dict.keys(), [0, 2, 4, 6, 8]);
        assert_eq!(dict.values(), [1, 5, 17, 37, 65]);
        assert_eq!(dict.position(&6), Some(3));
        assert_eq!(dict.position(&7), None);
    }

    #[test]
    fn iteration_order() {
        let mut dict = SortedDict::new();
        for k in [4, 1, 3, 2] {
            dict.insert(k, k.to_string());
        }

        let mut seen = Vec::new();
        dict.for_each(|k, v| seen.push((*k, v.clone())));
        assert_eq!(seen, dict.iter().map(|(k, v)| (*k, v.clone())).collect::<Vec<_>>());
        assert_eq!(seen.iter().map(|p| p.0).collect::<Vec<_>>(), [1, 2, 3, 4]);

        let owned: Vec<(i32, String)> = dict.into_iter().collect();
        assert_eq!(owned, seen);
    }

    #[test]
    fn extend_overwrites() {
        let mut dict: SortedDict<char, u32> = SortedDict::new();
        dict.extend(vec![('b', 1), ('a', 2), ('b', 3)]);
        assert_eq!(dict.extract_pairs(), [('a', 2), ('b', 3)]);
        assert!(dict.is_empty());
    }

    #[test]
    fn clear_and_capacity() {
        let mut dict = SortedDict::with_capacity(NaturalOrder, 16);
        assert!(dict.capacity() >= 16);
        dict.insert("x", 1);
        dict.clear();
        assert!(dict.is_empty());
        dict.shrink_to_fit();
        dict.reserve(4);
        assert!(dict.capacity() >= 4);
    }

    #[test]
    fn debug_print() {
        assert_eq!(format!("{:?}", SortedDict::<i32, i32>::new()), "{}");
        let dict: SortedDict<i32, &str> = vec![(100, "hundred"), (1, "one")].into_iter().collect();
        assert_eq!(format!("{:?}", dict), "{1: \"one\", 100: \"hundred\"}");
    }

    #[test]
    #[should_panic(expected = "no entry found for key")]
    fn index_missing() {
        let dict: SortedDict<i32, i32> = SortedDict::default();
        assert_eq!(dict[&1], 0);
    }

    #[quickcheck]
    fn behaves_like_btreemap(ops: Vec<(u8, u8, u16)>) -> bool {
        let mut dict = SortedDict::new();
        let mut model = BTreeMap::new();
        for (op, key, value) in ops {
            let agrees = match op % 4 {
                0 => {
                    let absent = !model.contains_key(&key);
                    if absent { model.insert(key, value); }
                    dict.insert(key, value) == absent
                }
                1 => {
                    model.insert(key, value);
                    dict.set(key, value);
                    true
                }
                2 => dict.delete(&key) == model.remove(&key).is_some(),
                _ => dict.get(&key) == model.get(&key),
            };
            if !agrees || !dict.is_consistent() || dict.len() != model.len() {
                return false;
            }
        }
        dict.iter().eq(model.iter())
    }
}
