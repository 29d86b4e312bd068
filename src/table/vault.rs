//! The mutation protocol shared by repeat-compressed containers.
//!
//! A "vault" is an ordered store of repeatable items together with its
//! [`CacheMap`]: a [`crate::table::Row`] storing cells, or a
//! [`crate::table::Table`] storing rows. The functions here perform
//! set/insert/delete of one logical (dense) position against the compact
//! stored form, splitting or shrinking repeated runs as needed, and keep
//! the map synchronized incrementally. The map is never recomputed
//! wholesale on these paths, which is what keeps single-cell edits cheap
//! on sheets whose rows span thousands of columns through one repeated
//! empty cell.
//!
//! Callers (Row/Table) resolve coordinates and pad short vaults before
//! delegating here, so the stored-index resolution in this module failing
//! means the map no longer matches the store: corrupted state, propagated
//! as [`Error::IndexOutOfRange`] and not recoverable.

use super::cache_map::CacheMap;
use crate::{Error, Result};

/// An item that may stand for several consecutive logical occurrences:
/// cells, rows and column descriptors all repeat the same way.
pub trait Repeatable {
    /// The raw repeat attribute: `None` means not repeated.
    fn repeated(&self) -> Option<usize>;

    /// Set the repeat attribute. Implementations normalize values `<= 1`
    /// to `None`.
    fn set_repeated(&mut self, repeated: Option<usize>);

    /// Number of logical occurrences this stored item covers.
    #[inline]
    fn repeat(&self) -> usize {
        self.repeated().unwrap_or(1)
    }
}

/// Helper: write a run length back as a repeat attribute.
fn shrink_to<T: Repeatable>(item: &mut T, len: usize) {
    item.set_repeated(if len > 1 { Some(len) } else { None });
}

/// Replace the logical position `position` with `item`.
///
/// The run covering the position is split into an optional prefix (the
/// original item shrunk in place), the new item, and an optional suffix (a
/// clone of the original). When the new item's own repeat count overruns
/// into subsequent runs, those are consumed (deleted or shrunk) until
/// the overlap is paid off.
pub(crate) fn set_item<T>(
    store: &mut Vec<T>,
    map: &mut CacheMap,
    position: usize,
    item: T,
) -> Result<()>
where
    T: Repeatable + Clone,
{
    let index = map.find_stored_index(position).ok_or(Error::IndexOutOfRange {
        index: position,
        len: map.len(),
    })?;

    let run_start = map.run_start(index);
    let run_len = map.run_len(index);
    let before = position - run_start;
    let new_repeat = item.repeat();
    let after = run_len as i64 - before as i64 - new_repeat as i64;

    let original = store[index].clone();
    map.erase_run(index)?;

    // Prefix: the original item keeps covering positions before the edit.
    let mut at = index;
    if before >= 1 {
        shrink_to(&mut store[index], before);
        map.insert_run(index, before)?;
        at = index + 1;
    } else {
        store.remove(index);
    }

    store.insert(at, item);
    map.insert_run(at, new_repeat)?;

    if after >= 1 {
        // Suffix: reconstitute the remainder of the original run.
        let mut suffix = original;
        shrink_to(&mut suffix, after as usize);
        store.insert(at + 1, suffix);
        map.insert_run(at + 1, after as usize)?;
    } else if after < 0 {
        // The new item overruns into subsequent runs: consume whole runs
        // while the budget allows, then shrink the run it ends inside.
        // Each pass removes a stored item or zeroes the budget, so the
        // walk terminates even when a run's length equals the remainder.
        let mut overrun = (-after) as usize;
        let next = at + 1;
        while overrun > 0 && next < store.len() {
            let len = map.run_len(next);
            if len <= overrun {
                map.erase_run(next)?;
                store.remove(next);
                overrun -= len;
            } else {
                map.erase_run(next)?;
                map.insert_run(next, len - overrun)?;
                shrink_to(&mut store[next], len - overrun);
                overrun = 0;
            }
        }
    }

    Ok(())
}

/// Insert `item` so that it covers the logical position `position`,
/// shifting everything at and after it right by the item's repeat count.
///
/// On a run boundary the item slots in whole; inside a run, the run is
/// split around it (prefix shrunk in place, suffix cloned).
pub(crate) fn insert_item<T>(
    store: &mut Vec<T>,
    map: &mut CacheMap,
    position: usize,
    item: T,
) -> Result<()>
where
    T: Repeatable + Clone,
{
    let index = map.find_stored_index(position).ok_or(Error::IndexOutOfRange {
        index: position,
        len: map.len(),
    })?;

    let run_start = map.run_start(index);
    let before = position - run_start;
    let new_repeat = item.repeat();

    if before == 0 {
        store.insert(index, item);
        map.insert_run(index, new_repeat)?;
        return Ok(());
    }

    let run_len = map.run_len(index);
    let after = run_len - before;

    let mut suffix = store[index].clone();
    shrink_to(&mut suffix, after);
    shrink_to(&mut store[index], before);

    map.erase_run(index)?;
    map.insert_run(index, before)?;

    store.insert(index + 1, item);
    map.insert_run(index + 1, new_repeat)?;

    store.insert(index + 2, suffix);
    map.insert_run(index + 2, after)?;

    Ok(())
}

/// Delete the logical position `position`, shifting everything after it
/// left by one. A run longer than one shrinks in place; a run of one is
/// removed outright.
pub(crate) fn delete_item<T>(store: &mut Vec<T>, map: &mut CacheMap, position: usize) -> Result<()>
where
    T: Repeatable + Clone,
{
    let index = map.find_stored_index(position).ok_or(Error::IndexOutOfRange {
        index: position,
        len: map.len(),
    })?;

    let run_len = map.run_len(index);
    if run_len == 1 {
        store.remove(index);
        map.erase_run(index)?;
    } else {
        shrink_to(&mut store[index], run_len - 1);
        map.decrement_from(index)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // A minimal repeatable item; the protocol is exercised end-to-end
    // through Row and Table in their own modules.
    #[derive(Debug, Clone, PartialEq)]
    struct Run {
        tag: char,
        repeated: Option<usize>,
    }

    impl Run {
        fn new(tag: char, repeat: usize) -> Self {
            Self {
                tag,
                repeated: (repeat > 1).then_some(repeat),
            }
        }
    }

    impl Repeatable for Run {
        fn repeated(&self) -> Option<usize> {
            self.repeated
        }

        fn set_repeated(&mut self, repeated: Option<usize>) {
            self.repeated = repeated.filter(|&r| r > 1);
        }
    }

    fn vault(runs: &[(char, usize)]) -> (Vec<Run>, CacheMap) {
        let store: Vec<Run> = runs.iter().map(|&(tag, r)| Run::new(tag, r)).collect();
        let map = CacheMap::from_runs(store.iter().map(|i| i.repeat()).enumerate()).unwrap();
        (store, map)
    }

    fn expand(store: &[Run]) -> String {
        store
            .iter()
            .flat_map(|run| std::iter::repeat_n(run.tag, run.repeat()))
            .collect()
    }

    fn check(store: &[Run], map: &CacheMap) {
        // The map must mirror the store run for run.
        assert_eq!(map.len(), store.len());
        for (index, item) in store.iter().enumerate() {
            assert_eq!(map.run_len(index), item.repeat());
        }
    }

    #[test]
    fn test_set_inside_run() {
        let (mut store, mut map) = vault(&[('a', 10)]);
        set_item(&mut store, &mut map, 5, Run::new('X', 1)).unwrap();
        assert_eq!(expand(&store), "aaaaaXaaaa");
        check(&store, &map);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_set_at_run_start() {
        let (mut store, mut map) = vault(&[('a', 3), ('b', 2)]);
        set_item(&mut store, &mut map, 3, Run::new('X', 1)).unwrap();
        assert_eq!(expand(&store), "aaaXb");
        check(&store, &map);
    }

    #[test]
    fn test_set_at_run_end() {
        let (mut store, mut map) = vault(&[('a', 3)]);
        set_item(&mut store, &mut map, 2, Run::new('X', 1)).unwrap();
        assert_eq!(expand(&store), "aaX");
        check(&store, &map);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_set_whole_run() {
        let (mut store, mut map) = vault(&[('a', 1), ('b', 1)]);
        set_item(&mut store, &mut map, 0, Run::new('X', 1)).unwrap();
        assert_eq!(expand(&store), "Xb");
        check(&store, &map);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_set_repeated_item_overruns_following_runs() {
        let (mut store, mut map) = vault(&[('a', 3), ('b', 2), ('c', 4)]);
        // X covers positions 1..=6: eats the rest of 'a', all of 'b', and
        // two of 'c'.
        set_item(&mut store, &mut map, 1, Run::new('X', 6)).unwrap();
        assert_eq!(expand(&store), "aXXXXXXcc");
        check(&store, &map);
    }

    #[test]
    fn test_set_overrun_exact_run_boundary() {
        // Overrun budget equals the following run's length exactly; the
        // walk must consume it and stop.
        let (mut store, mut map) = vault(&[('a', 2), ('b', 3)]);
        set_item(&mut store, &mut map, 1, Run::new('X', 4)).unwrap();
        assert_eq!(expand(&store), "aXXXX");
        check(&store, &map);
    }

    #[test]
    fn test_set_overrun_past_width() {
        let (mut store, mut map) = vault(&[('a', 2), ('b', 1)]);
        // X extends beyond the old width; total width grows.
        set_item(&mut store, &mut map, 1, Run::new('X', 10)).unwrap();
        assert_eq!(expand(&store), "aXXXXXXXXXX");
        check(&store, &map);
    }

    #[test]
    fn test_insert_at_boundary() {
        let (mut store, mut map) = vault(&[('a', 2), ('b', 2)]);
        insert_item(&mut store, &mut map, 2, Run::new('X', 1)).unwrap();
        assert_eq!(expand(&store), "aaXbb");
        check(&store, &map);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_insert_splits_run() {
        let (mut store, mut map) = vault(&[('a', 4)]);
        insert_item(&mut store, &mut map, 1, Run::new('X', 2)).unwrap();
        assert_eq!(expand(&store), "aXXaaa");
        check(&store, &map);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_delete_single_run() {
        let (mut store, mut map) = vault(&[('a', 1), ('b', 1)]);
        delete_item(&mut store, &mut map, 0).unwrap();
        assert_eq!(expand(&store), "b");
        check(&store, &map);
    }

    #[test]
    fn test_delete_from_long_run() {
        let (mut store, mut map) = vault(&[('a', 5), ('b', 2)]);
        delete_item(&mut store, &mut map, 2).unwrap();
        assert_eq!(expand(&store), "aaaabb");
        check(&store, &map);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_insert_then_delete_restores() {
        let (mut store, mut map) = vault(&[('a', 3), ('b', 2)]);
        let before = expand(&store);
        insert_item(&mut store, &mut map, 2, Run::new('X', 1)).unwrap();
        delete_item(&mut store, &mut map, 2).unwrap();
        assert_eq!(expand(&store), before);
        check(&store, &map);
    }

    #[test]
    fn test_out_of_range_is_fatal() {
        let (mut store, mut map) = vault(&[('a', 2)]);
        assert!(set_item(&mut store, &mut map, 2, Run::new('X', 1)).is_err());
        assert!(delete_item(&mut store, &mut map, 5).is_err());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Set(usize, usize),
            Insert(usize, usize),
            Delete(usize),
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            prop_oneof![
                (0usize..30, 1usize..6).prop_map(|(p, r)| Op::Set(p, r)),
                (0usize..30, 1usize..6).prop_map(|(p, r)| Op::Insert(p, r)),
                (0usize..30).prop_map(Op::Delete),
            ]
        }

        proptest! {
            // Any sequence of protocol calls keeps the map mirroring the
            // store: same run count, same run lengths, widths add up.
            #[test]
            fn protocol_keeps_map_and_store_in_sync(
                repeats in prop::collection::vec(1usize..8, 1..6),
                ops in prop::collection::vec(op_strategy(), 0..20),
            ) {
                let runs: Vec<(char, usize)> = repeats
                    .iter()
                    .enumerate()
                    .map(|(i, &r)| ((b'a' + (i % 26) as u8) as char, r))
                    .collect();
                let (mut store, mut map) = vault(&runs);

                let mut tag = 'A';
                for op in ops {
                    let width = map.width();
                    match op {
                        Op::Set(p, r) if p < width => {
                            set_item(&mut store, &mut map, p, Run::new(tag, r)).unwrap();
                        }
                        Op::Insert(p, r) if p < width => {
                            insert_item(&mut store, &mut map, p, Run::new(tag, r)).unwrap();
                        }
                        Op::Delete(p) if p < width => {
                            delete_item(&mut store, &mut map, p).unwrap();
                        }
                        _ => continue,
                    }
                    tag = if tag == 'Z' { 'A' } else { (tag as u8 + 1) as char };

                    check(&store, &map);
                    let total: usize = store.iter().map(|i| i.repeat()).sum();
                    prop_assert_eq!(total, map.width());
                }
            }
        }
    }
}
