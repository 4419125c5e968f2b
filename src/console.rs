// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Bounds-checked view of a CBMEM console descriptor.
//!
//! Layout (little-endian): `size: u32`, `cursor: u32`, then `size` body bytes.
//! The view is built once from the mapped region; every body access is
//! checked against the effective capacity, which never exceeds what was
//! actually mapped.

use alloc::vec::Vec;
use byteorder::{ByteOrder, LittleEndian};

use crate::config::{CONSOLE_HEADER_SIZE, MAX_CONSOLE_SIZE};
use crate::cursor::{Cursor, ReadWindow};
use crate::error::{CbmemcError, Result};
use crate::sink::ByteSink;

/// Snapshot of the descriptor state, for inspection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConsoleStats {
    /// Capacity as written by firmware.
    pub declared_capacity: u32,
    /// Capacity actually used for access.
    pub capacity: usize,
    pub cursor: Cursor,
    /// Bytes a dump would emit.
    pub stored: usize,
}

pub struct CbmemConsole<B> {
    region: B,
    capacity: usize,
    declared_capacity: u32,
}

impl<B: AsRef<[u8]>> CbmemConsole<B> {
    /// Wraps a mapped descriptor. Fails only when the region cannot hold the
    /// header; an oversized `size` field is clamped to the mapped body.
    pub fn new(region: B) -> Result<Self> {
        let bytes = region.as_ref();
        if bytes.len() < CONSOLE_HEADER_SIZE {
            return Err(CbmemcError::RegionTooSmall {
                needed: CONSOLE_HEADER_SIZE,
                available: bytes.len(),
            });
        }

        let declared_capacity = LittleEndian::read_u32(&bytes[0..4]);
        let mapped = bytes.len() - CONSOLE_HEADER_SIZE;
        let capacity = (declared_capacity as usize).min(mapped).min(MAX_CONSOLE_SIZE);
        if capacity < declared_capacity as usize {
            tracing::warn!(
                declared = declared_capacity,
                mapped,
                "CBMEM console size exceeds mapped region, clamping"
            );
        }

        Ok(Self {
            region,
            capacity,
            declared_capacity,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn cursor(&self) -> Cursor {
        Cursor::decode(LittleEndian::read_u32(&self.region.as_ref()[4..8]))
    }

    fn body(&self) -> &[u8] {
        &self.region.as_ref()[CONSOLE_HEADER_SIZE..CONSOLE_HEADER_SIZE + self.capacity]
    }

    pub fn window(&self) -> ReadWindow {
        self.cursor().read_window(self.capacity)
    }

    /// The stored bytes in chronological order, as at most two slices.
    pub fn segments(&self) -> (&[u8], &[u8]) {
        let w = self.window();
        let body = self.body();
        if w.wraps() {
            (&body[w.start..w.len], &body[..w.start])
        } else {
            (&body[..w.len], &[])
        }
    }

    /// Streams the stored bytes oldest first. Returns the number emitted.
    pub fn dump_to<S: ByteSink + ?Sized>(&self, sink: &mut S) -> usize {
        let (older, newer) = self.segments();
        sink.write_bytes(older);
        if !newer.is_empty() {
            sink.write_bytes(newer);
        }
        older.len() + newer.len()
    }

    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.window().len);
        self.dump_to(&mut out);
        out
    }

    pub fn stats(&self) -> ConsoleStats {
        ConsoleStats {
            declared_capacity: self.declared_capacity,
            capacity: self.capacity,
            cursor: self.cursor(),
            stored: self.window().len,
        }
    }

    pub fn into_inner(self) -> B {
        self.region
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> CbmemConsole<B> {
    fn store_cursor(&mut self, cursor: Cursor) {
        LittleEndian::write_u32(&mut self.region.as_mut()[4..8], cursor.encode());
    }

    /// Appends one byte at the cursor, wrapping and setting the overflow
    /// flag at the end of the body. A cursor at or past capacity is left
    /// alone.
    pub fn put(&mut self, byte: u8) {
        let mut cursor = self.cursor();
        let offset = cursor.offset as usize;
        if offset >= self.capacity {
            return;
        }

        self.region.as_mut()[CONSOLE_HEADER_SIZE + offset] = byte;
        let next = offset + 1;
        if next >= self.capacity {
            cursor.offset = 0;
            cursor.overflow = true;
        } else {
            cursor.offset = next as u32;
        }
        self.store_cursor(cursor);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.put(b);
        }
    }
}

impl CbmemConsole<&'static mut [u8]> {
    /// Builds a view over a descriptor at a raw address.
    ///
    /// # Safety
    /// `addr` must point at a CBMEM console descriptor that stays mapped and
    /// writable for the rest of the program, with at least `size` body bytes
    /// following the header, and no other Rust reference may alias it.
    pub unsafe fn from_raw(addr: usize) -> Result<Self> {
        let header = core::slice::from_raw_parts(addr as *const u8, CONSOLE_HEADER_SIZE);
        let size = (LittleEndian::read_u32(header) as usize).min(MAX_CONSOLE_SIZE);
        let region = core::slice::from_raw_parts_mut(addr as *mut u8, CONSOLE_HEADER_SIZE + size);
        Self::new(region)
    }
}
