//! Chain: ordered, doubly-linked sequence with arena-backed nodes.
//!
//! Nodes live in a `SlotMap`; `prev`/`next` links are generational keys
//! into that arena, so a dangling link resolves to nothing instead of to
//! freed memory. The chain keeps only a `first` key: locating the end is
//! a linear walk.

use crate::error::{Error, Result};
use core::cmp::Ordering;
use core::fmt;
use core::ops::ControlFlow;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    struct NodeKey;
}

/// Where [`Chain::insert_at`] places a new element.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Position {
    /// Before the element currently at this index. Indices at or past the
    /// end behave like [`Position::End`].
    Index(usize),
    /// After the current last element.
    End,
}

/// Per-element destructor invoked on real removal or teardown.
pub type Destructor<T> = Box<dyn FnMut(T)>;

#[derive(Debug)]
struct Node<T> {
    data: T,
    prev: Option<NodeKey>,
    next: Option<NodeKey>,
}

/// Ordered sequence of `T`, addressed by position from the head.
pub struct Chain<T> {
    nodes: SlotMap<NodeKey, Node<T>>,
    first: Option<NodeKey>,
    destroy: Option<Destructor<T>>,
}

impl<T> Default for Chain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Chain<T> {
    /// Empty chain without a destructor; removed elements are dropped.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            first: None,
            destroy: None,
        }
    }

    /// Create an empty chain whose elements are handed to `destroy` when
    /// deleted with [`Chain::delete_at`] or when the chain is dropped.
    pub fn with_destructor<F>(destroy: F) -> Self
    where
        F: FnMut(T) + 'static,
    {
        let mut chain = Self::new();
        chain.destroy = Some(Box::new(destroy));
        chain
    }

    /// Number of linked elements; kept by the arena, so O(1).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn out_of_range(&self, index: usize) -> Error {
        Error::IndexOutOfRange {
            index,
            len: self.len(),
        }
    }

    // Linear walk from `first`; `None` when `index >= len`.
    fn node_at(&self, index: usize) -> Option<NodeKey> {
        if index >= self.len() {
            return None;
        }
        let mut cur = self.first?;
        for _ in 0..index {
            cur = self.nodes.get(cur)?.next?;
        }
        Some(cur)
    }

    fn last(&self) -> Option<NodeKey> {
        let mut cur = self.first?;
        while let Some(next) = self.nodes.get(cur)?.next {
            cur = next;
        }
        Some(cur)
    }

    /// Insert `data` at `position`.
    ///
    /// An empty chain takes `data` as its sole element whatever the
    /// position. Otherwise `Index(n)` with `n < len` splices the new node
    /// in front of the node currently at `n`; any other position appends.
    pub fn insert_at(&mut self, position: Position, data: T) {
        let before = match position {
            Position::Index(index) => self.node_at(index),
            Position::End => None,
        };

        if let Some(cursor) = before {
            let prev = self.nodes[cursor].prev;
            let key = self.nodes.insert(Node {
                data,
                prev,
                next: Some(cursor),
            });
            self.nodes[cursor].prev = Some(key);
            match prev {
                Some(p) => self.nodes[p].next = Some(key),
                None => self.first = Some(key),
            }
            return;
        }

        let last = self.last();
        let key = self.nodes.insert(Node {
            data,
            prev: last,
            next: None,
        });
        match last {
            Some(l) => self.nodes[l].next = Some(key),
            None => self.first = Some(key),
        }
    }

    pub fn prepend(&mut self, data: T) {
        self.insert_at(Position::Index(0), data)
    }

    pub fn append(&mut self, data: T) {
        self.insert_at(Position::End, data)
    }

    fn unlink(&mut self, key: NodeKey) -> Option<T> {
        let node = self.nodes.remove(key)?;
        match node.prev {
            Some(p) => self.nodes[p].next = node.next,
            None => self.first = node.next,
        }
        if let Some(n) = node.next {
            self.nodes[n].prev = node.prev;
        }
        Some(node.data)
    }

    /// Unlink the element at `index` and return it. The destructor is not
    /// invoked; the caller now owns the element.
    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        let err = self.out_of_range(index);
        self.node_at(index)
            .and_then(|key| self.unlink(key))
            .ok_or(err)
    }

    /// Unlink the element at `index` and hand it to the destructor, or
    /// drop it when none is registered.
    pub fn delete_at(&mut self, index: usize) -> Result<()> {
        let data = self.remove_at(index)?;
        match self.destroy.as_mut() {
            Some(destroy) => destroy(data),
            None => drop(data),
        }
        Ok(())
    }

    pub fn get(&self, index: usize) -> Result<&T> {
        match self.node_at(index) {
            Some(key) => Ok(&self.nodes[key].data),
            None => Err(self.out_of_range(index)),
        }
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        match self.node_at(index) {
            Some(key) => Ok(&mut self.nodes[key].data),
            None => Err(self.out_of_range(index)),
        }
    }

    /// Overwrite the element at `index` and return the previous one.
    /// The destructor is not invoked on the returned value.
    pub fn set(&mut self, index: usize, data: T) -> Result<T> {
        let slot = self.get_mut(index)?;
        Ok(core::mem::replace(slot, data))
    }

    /// Index of the first element for which `cmp` reports `Equal`.
    pub fn find<F>(&self, cmp: F) -> Option<usize>
    where
        F: FnMut(&T) -> Ordering,
    {
        self.find_data(cmp).map(|(index, _)| index)
    }

    /// Like [`Chain::find`], also yielding the matching element.
    pub fn find_data<F>(&self, mut cmp: F) -> Option<(usize, &T)>
    where
        F: FnMut(&T) -> Ordering,
    {
        self.iter()
            .enumerate()
            .find(|(_, data)| cmp(*data) == Ordering::Equal)
    }

    /// Visit elements head to tail, stopping as soon as `visit` breaks.
    pub fn foreach<F>(&self, mut visit: F) -> ControlFlow<()>
    where
        F: FnMut(usize, &T) -> ControlFlow<()>,
    {
        self.iter()
            .enumerate()
            .try_for_each(|(index, data)| visit(index, data))
    }

    /// Mutable counterpart of [`Chain::foreach`].
    pub fn foreach_mut<F>(&mut self, mut visit: F) -> ControlFlow<()>
    where
        F: FnMut(usize, &mut T) -> ControlFlow<()>,
    {
        let mut cur = self.first;
        let mut index = 0;
        while let Some(key) = cur {
            let node = &mut self.nodes[key];
            cur = node.next;
            if visit(index, &mut node.data).is_break() {
                return ControlFlow::Break(());
            }
            index += 1;
        }
        ControlFlow::Continue(())
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            nodes: &self.nodes,
            cur: self.first,
            remaining: self.len(),
        }
    }
}

impl<T> Drop for Chain<T> {
    fn drop(&mut self) {
        let Some(mut destroy) = self.destroy.take() else {
            return;
        };
        let mut cur = self.first.take();
        while let Some(key) = cur {
            let Some(node) = self.nodes.remove(key) else {
                break;
            };
            cur = node.next;
            destroy(node.data);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Chain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Borrowing iterator, head to tail.
pub struct Iter<'a, T> {
    nodes: &'a SlotMap<NodeKey, Node<T>>,
    cur: Option<NodeKey>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;
        let node = nodes.get(self.cur?)?;
        self.cur = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some(&node.data)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a Chain<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Consuming iterator. Elements move out to the caller; the destructor is
/// never invoked for them, nor for any left unconsumed.
pub struct IntoIter<T> {
    nodes: SlotMap<NodeKey, Node<T>>,
    front: Option<NodeKey>,
    back: Option<NodeKey>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let key = self.front?;
        let node = self.nodes.remove(key)?;
        if self.back == Some(key) {
            self.front = None;
            self.back = None;
        } else {
            self.front = node.next;
        }
        Some(node.data)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.nodes.len(), Some(self.nodes.len()))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        let key = self.back?;
        let node = self.nodes.remove(key)?;
        if self.front == Some(key) {
            self.front = None;
            self.back = None;
        } else {
            self.back = node.prev;
        }
        Some(node.data)
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> IntoIterator for Chain<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(mut self) -> IntoIter<T> {
        let back = self.last();
        let front = self.first.take();
        self.destroy = None;
        IntoIter {
            nodes: core::mem::take(&mut self.nodes),
            front,
            back,
        }
    }
}
