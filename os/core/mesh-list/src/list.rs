use crate::item::{Item, Ownership};
use alloc::vec::Vec;
use mesh_status::{Error, Result};

struct Node<'a, T: ?Sized> {
    item: Item<'a, T>,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Doubly linked list of [`Item`]s in insertion order.
pub struct LinkedList<'a, T: ?Sized> {
    slots: Vec<Option<Node<'a, T>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
    cursor: Option<usize>,
}

impl<T: ?Sized> Default for LinkedList<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T: ?Sized> LinkedList<'a, T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
            cursor: None,
        }
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn node(&self, index: usize) -> Option<&Node<'a, T>> {
        self.slots.get(index)?.as_ref()
    }

    fn node_mut(&mut self, index: usize) -> Option<&mut Node<'a, T>> {
        self.slots.get_mut(index)?.as_mut()
    }

    /// Index of the first node carrying `id`, scanning from the head.
    fn position(&self, id: u32) -> Option<usize> {
        let mut cur = self.head;
        while let Some(index) = cur {
            let node = self.node(index)?;
            if node.item.id() == id {
                return Some(index);
            }
            cur = node.next;
        }
        None
    }

    /// Appends `item` at the tail.
    ///
    /// Identifiers need not be unique; lookups find the oldest match.
    ///
    /// # Errors
    /// [`Error::NoMemory`] if the arena cannot grow.
    pub fn add(&mut self, item: Item<'a, T>) -> Result<()> {
        let node = Node {
            item,
            prev: self.tail,
            next: None,
        };
        let index = if let Some(index) = self.free.pop() {
            self.slots[index] = Some(node);
            index
        } else {
            self.slots.try_reserve(1).map_err(|_| Error::NoMemory)?;
            self.slots.push(Some(node));
            self.slots.len() - 1
        };

        match self.tail.and_then(|t| self.node_mut(t)) {
            Some(tail) => tail.next = Some(index),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        self.len += 1;
        Ok(())
    }

    /// # Errors
    /// [`Error::NoDevice`] if no item carries `id`.
    pub fn get(&self, id: u32) -> Result<&T> {
        self.position(id)
            .and_then(|i| self.node(i))
            .map(|n| n.item.data())
            .ok_or(Error::NoDevice)
    }

    /// Mutable access to an owned payload.
    ///
    /// # Errors
    /// - [`Error::NoDevice`] if no item carries `id`.
    /// - [`Error::Permission`] if the payload is borrowed.
    pub fn get_mut(&mut self, id: u32) -> Result<&mut T> {
        let index = self.position(id).ok_or(Error::NoDevice)?;
        self.node_mut(index)
            .ok_or(Error::NoDevice)?
            .item
            .data_mut()
            .ok_or(Error::Permission)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.position(id).is_some()
    }

    /// # Errors
    /// [`Error::NoDevice`] if no item carries `id`.
    pub fn ownership(&self, id: u32) -> Result<Ownership> {
        self.position(id)
            .and_then(|i| self.node(i))
            .map(|n| n.item.ownership())
            .ok_or(Error::NoDevice)
    }

    /// Unlinks the first item carrying `id` and hands it back.
    ///
    /// # Errors
    /// [`Error::NoDevice`] if no item carries `id`; the list is unchanged.
    pub fn take(&mut self, id: u32) -> Result<Item<'a, T>> {
        let index = self.position(id).ok_or(Error::NoDevice)?;
        let node = self.slots[index].take().ok_or(Error::NoDevice)?;

        match node.prev.and_then(|p| self.node_mut(p)) {
            Some(prev) => prev.next = node.next,
            None => self.head = node.next,
        }
        match node.next.and_then(|n| self.node_mut(n)) {
            Some(next) => next.prev = node.prev,
            None => self.tail = node.prev,
        }
        if self.cursor == Some(index) {
            self.cursor = node.next;
        }
        self.free.push(index);
        self.len -= 1;
        Ok(node.item)
    }

    /// Unlinks the first item carrying `id`, dropping an owned payload.
    ///
    /// # Errors
    /// [`Error::NoDevice`] if no item carries `id`; the list is unchanged.
    pub fn remove(&mut self, id: u32) -> Result<()> {
        self.take(id).map(drop)
    }

    /// Visits every item from head to tail with the list's cursor, which
    /// is reset to the head first.
    ///
    /// # Errors
    /// The first error returned by `visit`; the remaining items are not
    /// visited.
    pub fn traverse<F>(&mut self, mut visit: F) -> Result<()>
    where
        F: FnMut(u32, &T) -> Result<()>,
    {
        self.cursor = self.head;
        while let Some(index) = self.cursor {
            let Some(node) = self.slots.get(index).and_then(Option::as_ref) else {
                break;
            };
            self.cursor = node.next;
            visit(node.item.id(), node.item.data())?;
        }
        Ok(())
    }

    /// Removes every item, dropping owned payloads.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.cursor = None;
        self.len = 0;
    }

    pub const fn iter(&self) -> Iter<'_, 'a, T> {
        Iter {
            list: self,
            next: self.head,
        }
    }
}

/// Head-to-tail iterator over `(id, payload)` pairs.
pub struct Iter<'l, 'a, T: ?Sized> {
    list: &'l LinkedList<'a, T>,
    next: Option<usize>,
}

impl<'l, T: ?Sized> Iterator for Iter<'l, '_, T> {
    type Item = (u32, &'l T);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.list.node(self.next?)?;
        self.next = node.next;
        Some((node.item.id(), node.item.data()))
    }
}

impl<'l, 'a, T: ?Sized> IntoIterator for &'l LinkedList<'a, T> {
    type Item = (u32, &'l T);
    type IntoIter = Iter<'l, 'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
