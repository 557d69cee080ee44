use alloc::boxed::Box;

/// Who is responsible for releasing an item's payload.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Ownership {
    /// Released by the list on removal.
    Owned,
    /// Kept alive and released by the caller.
    Borrowed,
}

enum Payload<'a, T: ?Sized> {
    Owned(Box<T>),
    Borrowed(&'a T),
}

/// A payload tagged with its identifier and ownership.
pub struct Item<'a, T: ?Sized> {
    id: u32,
    payload: Payload<'a, T>,
}

impl<'a, T: ?Sized> Item<'a, T> {
    pub fn owned(data: Box<T>, id: u32) -> Self {
        Self {
            id,
            payload: Payload::Owned(data),
        }
    }

    pub const fn borrowed(data: &'a T, id: u32) -> Self {
        Self {
            id,
            payload: Payload::Borrowed(data),
        }
    }

    pub const fn id(&self) -> u32 {
        self.id
    }

    pub const fn ownership(&self) -> Ownership {
        match self.payload {
            Payload::Owned(_) => Ownership::Owned,
            Payload::Borrowed(_) => Ownership::Borrowed,
        }
    }

    pub fn data(&self) -> &T {
        match &self.payload {
            Payload::Owned(b) => b,
            Payload::Borrowed(r) => r,
        }
    }

    pub(crate) fn data_mut(&mut self) -> Option<&mut T> {
        match &mut self.payload {
            Payload::Owned(b) => Some(&mut **b),
            Payload::Borrowed(_) => None,
        }
    }

    /// The owned payload, or `None` for a borrowed one.
    pub fn into_owned(self) -> Option<Box<T>> {
        match self.payload {
            Payload::Owned(b) => Some(b),
            Payload::Borrowed(_) => None,
        }
    }
}

impl Item<'_, [u8]> {
    /// An owned item holding a copy of `data`.
    pub fn copied(data: &[u8], id: u32) -> Self {
        Self::owned(data.into(), id)
    }
}

impl<T: ?Sized + core::fmt::Debug> core::fmt::Debug for Item<'_, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Item")
            .field("id", &self.id)
            .field("ownership", &self.ownership())
            .field("data", &self.data())
            .finish()
    }
}
