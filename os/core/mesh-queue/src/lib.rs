//! # Framed byte queue
//!
//! A fixed-capacity ring buffer of variable-length items. Every item is
//! stored as a [`HEADER_SIZE`]-byte little-endian length followed by the
//! payload, both wrapping around the end of the buffer as needed.
//!
//! The queue is a plain data structure: it is not synchronized, and callers
//! that share one between tasks must wrap it in a lock of their own.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

mod frame_queue;

pub use frame_queue::{FrameQueue, HEADER_SIZE};
