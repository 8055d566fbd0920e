//! # Watch List
//!
//! Ordered tag → value store shared between the control surface and one
//! refresh loop. Each store carries a *break flag*: clearing the store while a
//! cycle is running sets the flag, the loop checks it between items and stops
//! fetching, and the cycle end wipes whatever the loop wrote in the meantime.
//!
//! All guards are short and never held across an `.await`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::utils::tags::Tag;

/// Last known state of a watched tag.
#[derive(Debug)]
pub enum WatchEntry<T> {
    /// Registered, not fetched successfully yet.
    Empty,
    /// Last successful snapshot.
    Populated(Arc<T>),
}

impl<T> WatchEntry<T> {
    /// The snapshot, if any.
    pub fn snapshot(&self) -> Option<Arc<T>> {
        match self {
            WatchEntry::Empty => None,
            WatchEntry::Populated(value) => Some(Arc::clone(value)),
        }
    }
}

// derive(Clone) would require T: Clone
impl<T> Clone for WatchEntry<T> {
    fn clone(&self) -> Self {
        match self {
            WatchEntry::Empty => WatchEntry::Empty,
            WatchEntry::Populated(value) => WatchEntry::Populated(Arc::clone(value)),
        }
    }
}

#[derive(Debug)]
struct Inner<V> {
    order: Vec<Tag>,
    values: HashMap<Tag, V>,
}

/// Insertion-ordered map of watched tags with a cooperative break flag.
#[derive(Debug)]
pub struct WatchList<V> {
    inner: Mutex<Inner<V>>,
    break_flag: AtomicBool,
}

impl<V: Clone> WatchList<V> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                order: Vec::new(),
                values: HashMap::new(),
            }),
            break_flag: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<V>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Adds `tag` unless it is already watched. Returns true when added.
    pub fn insert_if_absent(&self, tag: Tag, value: V) -> bool {
        let mut inner = self.lock();
        if inner.values.contains_key(&tag) {
            return false;
        }
        inner.order.push(tag.clone());
        inner.values.insert(tag, value);
        true
    }

    /// Stops watching `tag`. Returns true when it was watched.
    pub fn remove(&self, tag: &Tag) -> bool {
        let mut inner = self.lock();
        if inner.values.remove(tag).is_none() {
            return false;
        }
        inner.order.retain(|t| t != tag);
        true
    }

    /// Overwrites the value of a tag that is still watched.
    ///
    /// A tag removed while its fetch was in flight stays removed.
    pub fn replace_if_present(&self, tag: &Tag, value: V) -> bool {
        match self.lock().values.get_mut(tag) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Current value of `tag`.
    pub fn get(&self, tag: &Tag) -> Option<V> {
        self.lock().values.get(tag).cloned()
    }

    /// Whether `tag` is watched.
    pub fn contains(&self, tag: &Tag) -> bool {
        self.lock().values.contains_key(tag)
    }

    /// Watched tags in insertion order.
    pub fn keys(&self) -> Vec<Tag> {
        self.lock().order.clone()
    }

    /// Number of watched tags.
    pub fn len(&self) -> usize {
        self.lock().order.len()
    }

    /// True when nothing is watched.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Empties the list and asks a running cycle to stop.
    pub fn clear_and_break(&self) {
        let mut inner = self.lock();
        inner.order.clear();
        inner.values.clear();
        self.break_flag.store(true, Ordering::SeqCst);
    }

    /// Resets the break flag and snapshots the keys to iterate this cycle.
    pub fn begin_cycle(&self) -> Vec<Tag> {
        self.break_flag.store(false, Ordering::SeqCst);
        self.keys()
    }

    /// Whether a clear happened since the cycle began.
    pub fn break_requested(&self) -> bool {
        self.break_flag.load(Ordering::SeqCst)
    }

    /// Ends a cycle; wipes anything written after a mid-cycle clear.
    /// Returns true when the cycle was broken.
    pub fn finish_cycle(&self) -> bool {
        if !self.break_requested() {
            return false;
        }
        let mut inner = self.lock();
        inner.order.clear();
        inner.values.clear();
        true
    }
}

impl<V: Clone> Default for WatchList<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(raw: &str) -> Tag {
        Tag::parse(raw).unwrap()
    }

    #[test]
    fn keeps_insertion_order_and_ignores_duplicates() {
        let list = WatchList::new();
        assert!(list.insert_if_absent(tag("#QQQ"), 1));
        assert!(list.insert_if_absent(tag("#PPP"), 2));
        assert!(!list.insert_if_absent(tag("qqq"), 3));

        assert_eq!(list.keys(), vec![tag("#QQQ"), tag("#PPP")]);
        assert_eq!(list.get(&tag("#QQQ")), Some(1));
    }

    #[test]
    fn removed_tags_are_not_resurrected_by_write_back() {
        let list = WatchList::new();
        list.insert_if_absent(tag("#QQQ"), 1);
        assert!(list.remove(&tag("#QQQ")));
        assert!(!list.remove(&tag("#QQQ")));

        assert!(!list.replace_if_present(&tag("#QQQ"), 9));
        assert!(list.is_empty());
    }

    #[test]
    fn clear_mid_cycle_breaks_and_wipes_late_writes() {
        let list = WatchList::new();
        list.insert_if_absent(tag("#QQQ"), 1);
        list.insert_if_absent(tag("#PPP"), 2);

        let keys = list.begin_cycle();
        assert_eq!(keys.len(), 2);
        assert!(!list.break_requested());

        list.clear_and_break();
        assert!(list.break_requested());
        // a loop that raced the clear re-adds nothing: the tag is gone
        assert!(!list.replace_if_present(&tag("#QQQ"), 5));
        // a tag added after the clear is wiped at cycle end too
        list.insert_if_absent(tag("#RRR"), 3);

        assert!(list.finish_cycle());
        assert!(list.is_empty());

        // the next cycle starts clean
        list.insert_if_absent(tag("#RRR"), 3);
        list.begin_cycle();
        assert!(!list.finish_cycle());
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn entry_snapshot_shares_the_allocation() {
        let entry = WatchEntry::Populated(Arc::new(7));
        let copy = entry.clone();
        assert!(Arc::ptr_eq(&entry.snapshot().unwrap(), &copy.snapshot().unwrap()));
        assert!(WatchEntry::<i32>::Empty.snapshot().is_none());
    }
}
