// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Byte sink used to play back console content.

use alloc::vec::Vec;

/// Receives raw console bytes. Implementations must not filter or
/// transform the data.
pub trait ByteSink {
    fn write_bytes(&mut self, bytes: &[u8]);
}

impl<F> ByteSink for F
where
    F: FnMut(&[u8]),
{
    fn write_bytes(&mut self, bytes: &[u8]) {
        self(bytes)
    }
}

impl ByteSink for Vec<u8> {
    fn write_bytes(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}
