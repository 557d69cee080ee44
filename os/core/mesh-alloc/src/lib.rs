//! # DMA-aligned allocation
//!
//! Peripherals with bus-master DMA often require their buffers to start on a
//! power-of-two boundary larger than the heap's natural alignment. This crate
//! over-allocates from any [`mesh_pal::Allocator`] and hands out an address
//! with the requested alignment.
//!
//! ```text
//!  raw                         ptr (aligned)
//!  |<---------- offset ---------->|
//!  [ padding ... ][ offset: usize ][ payload: size bytes ][ slack ]
//! ```
//!
//! The `usize` immediately before `ptr` records the distance back to the
//! allocator's pointer, so [`aligned_free`] needs nothing but `ptr`.
//! Aligned blocks must only be released with [`aligned_free`], and plain
//! allocator blocks never with it.

#![cfg_attr(not(test), no_std)]
#![allow(unsafe_code)]

mod aligned;
mod dma_buffer;

pub use aligned::{HEADER_SIZE, aligned_allocate, aligned_free};
pub use dma_buffer::DmaBuffer;
