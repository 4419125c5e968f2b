// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Packed cursor word codec.
//!
//! The descriptor stores the next write offset and the overflow flag in one
//! `u32`. Bits outside [`CURSOR_MASK`] other than [`OVERFLOW`] are reserved;
//! they are carried through every decode/encode pair untouched.

use crate::config::{CURSOR_MASK, OVERFLOW};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Cursor {
    /// Next write position in the body.
    pub offset: u32,
    /// Set once the writer has wrapped at least once.
    pub overflow: bool,
    /// Reserved high bits, excluding the overflow bit.
    pub reserved: u32,
}

/// Chronological layout of the stored bytes for a given cursor and capacity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadWindow {
    /// Index of the oldest surviving byte.
    pub start: usize,
    /// Number of valid bytes.
    pub len: usize,
}

impl ReadWindow {
    /// True when the content is split across the end of the body.
    pub fn wraps(&self) -> bool {
        self.start > 0
    }
}

impl Cursor {
    pub fn new(offset: u32, overflow: bool) -> Self {
        Self {
            offset: offset & CURSOR_MASK,
            overflow,
            reserved: 0,
        }
    }

    pub fn decode(word: u32) -> Self {
        Self {
            offset: word & CURSOR_MASK,
            overflow: word & OVERFLOW != 0,
            reserved: word & !CURSOR_MASK & !OVERFLOW,
        }
    }

    pub fn encode(&self) -> u32 {
        let mut word = self.reserved | (self.offset & CURSOR_MASK);
        if self.overflow {
            word |= OVERFLOW;
        }
        word
    }

    /// Validated read layout. A corrupted offset never yields a start or
    /// length outside `[0, capacity]`.
    pub fn read_window(&self, capacity: usize) -> ReadWindow {
        let offset = self.offset as usize;
        let len = if !self.overflow && offset < capacity {
            offset
        } else {
            capacity
        };
        let start = if self.overflow && offset <= len {
            offset
        } else {
            0
        };
        ReadWindow { start, len }
    }
}
