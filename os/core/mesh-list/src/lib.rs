//! # Ownership-tagged linked list
//!
//! An ordered list of identifier-addressed items for small registries
//! (pending requests, neighbours, subscriptions). Each item either owns its
//! payload, which the list drops when the item is removed, or borrows it
//! from the caller for the list's lifetime `'a`, in which case the list
//! never touches it beyond reading.
//!
//! Nodes live in an arena and link to each other by index; freed slots are
//! recycled by later insertions. Like the framed queue, the list performs
//! no locking of its own.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

mod item;
mod list;

pub use item::{Item, Ownership};
pub use list::{Iter, LinkedList};
