extern crate alloc;

use alloc::fmt;
use alloc::vec::Vec;
use core::num::NonZeroUsize;

/// Terminator used in place of a slot index at either end of the list.
const NIL: usize = usize::MAX;

/// Upper bound on slots reserved up front; larger lists grow on demand.
pub(crate) const MAX_PREALLOCATED: usize = 1024;

/// Stable handle to a node in a [`List`].
///
/// A handle stays valid until its node is removed. Once removed, the slot may be
/// reused by a later `add`, so callers must drop handles they no longer own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Returns the arena slot this handle points at.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A slot in the list arena.
///
/// `val` is `None` while the slot sits on the free stack.
struct Node<T> {
    val: Option<T>,
    prev: usize,
    next: usize,
}

impl<T> Node<T> {
    fn new(val: T) -> Self {
        Node {
            val: Some(val),
            prev: NIL,
            next: NIL,
        }
    }
}

/// A doubly linked list with fixed capacity, stored in a slot arena.
///
/// Nodes link to each other by slot index rather than by pointer, which keeps
/// the list free of `unsafe` and lets callers hold plain [`NodeId`] handles.
/// Removed slots go onto a free stack and are recycled by later `add` calls,
/// so the arena never grows past `cap` slots.
///
/// # Examples
///
/// ```ignore
/// use guarded_lru::list::List;
/// use core::num::NonZeroUsize;
///
/// let mut list = List::new(NonZeroUsize::new(3).unwrap());
///
/// let node1 = list.add(10).unwrap();
/// let _node2 = list.add(20).unwrap();
///
/// list.move_to_front(node1);
/// assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![10, 20]);
/// ```
pub struct List<T> {
    /// Maximum number of items the list can hold.
    cap: NonZeroUsize,
    /// Current number of linked items.
    len: usize,
    /// Slot of the first (most recently attached) node.
    head: usize,
    /// Slot of the last node.
    tail: usize,
    nodes: Vec<Node<T>>,
    free: Vec<usize>,
}

impl<T> List<T> {
    /// Creates a new List that holds at most `cap` items.
    pub fn new(cap: NonZeroUsize) -> List<T> {
        List {
            cap,
            len: 0,
            head: NIL,
            tail: NIL,
            nodes: Vec::with_capacity(cap.get().min(MAX_PREALLOCATED)),
            free: Vec::new(),
        }
    }

    /// Returns the maximum number of items the list can hold.
    #[cfg(test)]
    pub fn cap(&self) -> NonZeroUsize {
        self.cap
    }

    /// Returns the current number of items in the list.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the list contains no items.
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if the list is at capacity.
    pub fn is_full(&self) -> bool {
        self.len == self.cap.get()
    }

    /// Returns the handle of the first (most recent) node.
    #[cfg(test)]
    pub fn front(&self) -> Option<NodeId> {
        (self.head != NIL).then_some(NodeId(self.head))
    }

    /// Returns the handle of the last (least recent) node.
    pub fn back(&self) -> Option<NodeId> {
        (self.tail != NIL).then_some(NodeId(self.tail))
    }

    fn is_linked(&self, slot: usize) -> bool {
        self.nodes
            .get(slot)
            .map(|node| node.val.is_some())
            .unwrap_or(false)
    }

    /// Unlinks the node in `slot` from its neighbours. The slot keeps its value.
    fn detach(&mut self, slot: usize) {
        let (prev, next) = {
            let node = &self.nodes[slot];
            (node.prev, node.next)
        };

        if prev == NIL {
            self.head = next;
        } else {
            self.nodes[prev].next = next;
        }

        if next == NIL {
            self.tail = prev;
        } else {
            self.nodes[next].prev = prev;
        }

        let node = &mut self.nodes[slot];
        node.prev = NIL;
        node.next = NIL;
    }

    /// Links the node in `slot` in front of the current head.
    fn attach(&mut self, slot: usize) {
        let old_head = self.head;
        {
            let node = &mut self.nodes[slot];
            node.prev = NIL;
            node.next = old_head;
        }

        if old_head == NIL {
            self.tail = slot;
        } else {
            self.nodes[old_head].prev = slot;
        }
        self.head = slot;
    }

    /// Takes the value out of a detached slot and recycles the slot.
    fn release(&mut self, slot: usize) -> Option<T> {
        let val = self.nodes[slot].val.take()?;
        self.free.push(slot);
        self.len -= 1;
        Some(val)
    }

    /// Adds a value to the front of the list.
    ///
    /// Returns the handle of the new node, or `None` if the list is full.
    pub fn add(&mut self, v: T) -> Option<NodeId> {
        if self.is_full() {
            return None;
        }

        let slot = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = Node::new(v);
                slot
            }
            None => {
                self.nodes.push(Node::new(v));
                self.nodes.len() - 1
            }
        };

        self.attach(slot);
        self.len += 1;
        Some(NodeId(slot))
    }

    /// Removes the node behind `node` and returns its value.
    ///
    /// Returns `None` if the handle does not point at a live node.
    pub fn remove(&mut self, node: NodeId) -> Option<T> {
        if !self.is_linked(node.0) {
            return None;
        }
        self.detach(node.0);
        self.release(node.0)
    }

    /// Removes the first (most recently used) item from the list.
    #[cfg(test)]
    pub fn remove_first(&mut self) -> Option<T> {
        let head = self.front()?;
        self.remove(head)
    }

    /// Removes the last (least recently used) item from the list.
    pub fn remove_last(&mut self) -> Option<T> {
        let tail = self.back()?;
        self.remove(tail)
    }

    /// Moves a node to the front of the list.
    ///
    /// Does nothing if the handle is stale or the node is already first.
    pub fn move_to_front(&mut self, node: NodeId) {
        if !self.is_linked(node.0) || self.head == node.0 {
            return;
        }
        self.detach(node.0);
        self.attach(node.0);
    }

    /// Gets a reference to the value stored in `node`.
    pub fn get_value(&self, node: NodeId) -> Option<&T> {
        self.nodes.get(node.0)?.val.as_ref()
    }

    /// Gets a mutable reference to the value stored in `node`.
    pub fn get_value_mut(&mut self, node: NodeId) -> Option<&mut T> {
        self.nodes.get_mut(node.0)?.val.as_mut()
    }

    /// Iterates values from front to back.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
            remaining: self.len,
        }
    }

    /// Iterates values from back to front, returning each node handle as well.
    ///
    /// Used by integrity checks to confirm the `prev` links agree with `next`.
    pub fn iter_rev_with_ids(&self) -> impl Iterator<Item = (NodeId, &T)> + '_ {
        let mut cursor = self.tail;
        let mut remaining = self.len;
        core::iter::from_fn(move || {
            if cursor == NIL || remaining == 0 {
                return None;
            }
            let node = &self.nodes[cursor];
            let id = NodeId(cursor);
            cursor = node.prev;
            remaining -= 1;
            node.val.as_ref().map(|v| (id, v))
        })
    }

    /// Clears the list, removing all entries.
    ///
    /// The arena keeps its allocation so a refill does not reallocate.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.head = NIL;
        self.tail = NIL;
        self.len = 0;
    }
}

/// Front-to-back iterator over a [`List`].
pub struct Iter<'a, T> {
    list: &'a List<T>,
    cursor: usize,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == NIL || self.remaining == 0 {
            return None;
        }
        let node = &self.list.nodes[self.cursor];
        self.cursor = node.next;
        self.remaining -= 1;
        node.val.as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> fmt::Debug for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("List")
            .field("capacity", &self.cap)
            .field("length", &self.len)
            .finish()
    }
}

impl<T> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("remaining", &self.remaining)
            .finish()
    }
}
