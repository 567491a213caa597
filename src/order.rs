//! OrderedSlots: generational storage that remembers insertion order.
//!
//! Entries live in a `SlotMap` and are threaded on a doubly linked list,
//! so appending and unlinking are O(1) and iteration follows insertion
//! order even after slots are freed and reused.

use slotmap::{DefaultKey, SlotMap};

/// Stable reference to an entry. Stale handles never resolve, even when
/// the physical slot is reused (generational keys).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Handle(DefaultKey);

#[derive(Debug)]
struct Node<T> {
    item: T,
    prev: Option<DefaultKey>,
    next: Option<DefaultKey>,
}

#[derive(Debug)]
pub struct OrderedSlots<T> {
    slots: SlotMap<DefaultKey, Node<T>>,
    head: Option<DefaultKey>,
    tail: Option<DefaultKey>,
}

impl<T> Default for OrderedSlots<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> OrderedSlots<T> {
    pub fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
            head: None,
            tail: None,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Append `item` after the current last entry.
    pub fn push_back(&mut self, item: T) -> Handle {
        let prev = self.tail;
        let k = self.slots.insert(Node {
            item,
            prev,
            next: None,
        });
        match prev.and_then(|p| self.slots.get_mut(p)) {
            Some(p) => p.next = Some(k),
            None => self.head = Some(k),
        }
        self.tail = Some(k);
        Handle(k)
    }

    /// Unlink and return the entry; neighbours keep their relative order.
    pub fn remove(&mut self, handle: Handle) -> Option<T> {
        let node = self.slots.remove(handle.0)?;
        match node.prev.and_then(|p| self.slots.get_mut(p)) {
            Some(p) => p.next = node.next,
            None => self.head = node.next,
        }
        match node.next.and_then(|n| self.slots.get_mut(n)) {
            Some(n) => n.prev = node.prev,
            None => self.tail = node.prev,
        }
        Some(node.item)
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.slots.get(handle.0).map(|n| &n.item)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.slots.get_mut(handle.0).map(|n| &mut n.item)
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            slots: &self.slots,
            cursor: self.head,
            remaining: self.slots.len(),
        }
    }
}

/// Iterator over entries in insertion order.
pub struct Iter<'a, T> {
    slots: &'a SlotMap<DefaultKey, Node<T>>,
    cursor: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (Handle, &'a T);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let k = self.cursor?;
        let node = self.slots.get(k)?;
        self.cursor = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some((Handle(k), &node.item))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(s: &OrderedSlots<&'static str>) -> Vec<&'static str> {
        s.iter().map(|(_, v)| *v).collect()
    }

    #[test]
    fn iterates_in_insertion_order() {
        let mut s = OrderedSlots::new();
        for v in ["a", "b", "c", "d"] {
            s.push_back(v);
        }
        assert_eq!(items(&s), ["a", "b", "c", "d"]);
        assert_eq!(s.iter().len(), 4);
    }

    #[test]
    fn removal_keeps_relative_order() {
        let mut s = OrderedSlots::new();
        let a = s.push_back("a");
        let b = s.push_back("b");
        let c = s.push_back("c");

        assert_eq!(s.remove(b), Some("b"));
        assert_eq!(items(&s), ["a", "c"]);
        assert_eq!(s.remove(a), Some("a"));
        assert_eq!(items(&s), ["c"]);
        assert_eq!(s.remove(c), Some("c"));
        assert!(s.is_empty());
        assert_eq!(items(&s), Vec::<&str>::new());
    }

    /// Invariant: a reused physical slot goes to the back of the order and
    /// the old handle stays dead.
    #[test]
    fn reused_slot_appends_and_stale_handle_is_dead() {
        let mut s = OrderedSlots::new();
        let a = s.push_back("a");
        s.push_back("b");
        s.remove(a);
        let c = s.push_back("c");
        assert_ne!(a, c);
        assert!(s.get(a).is_none());
        assert!(s.remove(a).is_none());
        assert_eq!(items(&s), ["b", "c"]);
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut s = OrderedSlots::new();
        let a = s.push_back(1);
        let b = s.push_back(2);
        *s.get_mut(a).unwrap() += 10;
        assert_eq!(s.get(a), Some(&11));
        assert_eq!(s.get(b), Some(&2));
        let order: Vec<i32> = s.iter().map(|(_, v)| *v).collect();
        assert_eq!(order, [11, 2]);
    }
}
