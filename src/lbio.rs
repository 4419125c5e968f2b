// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Coreboot table ("LBIO") discovery and iteration.

use alloc::vec;
use alloc::vec::Vec;
use byteorder::{ByteOrder, LittleEndian};
use core::ops::ControlFlow;

use crate::config::{
    LB_HEADER_SIZE, LB_RECORD_HEADER_SIZE, LB_SCAN_STEP, LB_SCAN_WINDOWS, LB_SIGNATURE,
    LB_TAG_FORWARD, MAX_FORWARDS, MAX_TABLE_BYTES,
};
use crate::error::{CbmemcError, Result};

/// Read access to physical memory.
pub trait PhysMemory {
    fn read_phys(&mut self, addr: u64, buf: &mut [u8]) -> Result<()>;
}

impl<M: PhysMemory + ?Sized> PhysMemory for &mut M {
    fn read_phys(&mut self, addr: u64, buf: &mut [u8]) -> Result<()> {
        (**self).read_phys(addr, buf)
    }
}

/// One record of the firmware table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableEntry<'a> {
    pub tag: u32,
    /// Record size including the 8-byte record header.
    pub size: u32,
    /// Bytes following the record header.
    pub payload: &'a [u8],
}

impl TableEntry<'_> {
    /// Little-endian `u64` stored right after the record header.
    pub fn address(&self) -> Option<u64> {
        if self.payload.len() < 8 {
            return None;
        }
        Some(LittleEndian::read_u64(&self.payload[0..8]))
    }
}

/// Source of firmware table records. The visitor returns `Break` to stop.
pub trait TableSource {
    fn for_each_entry(
        &mut self,
        visitor: &mut dyn FnMut(TableEntry<'_>) -> ControlFlow<()>,
    ) -> Result<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LbHeader {
    pub signature: [u8; 4],
    pub header_bytes: u32,
    pub header_checksum: u32,
    pub table_bytes: u32,
    pub table_checksum: u32,
    pub table_entries: u32,
}

impl LbHeader {
    pub fn parse(buf: &[u8; LB_HEADER_SIZE]) -> Self {
        let mut signature = [0u8; 4];
        signature.copy_from_slice(&buf[0..4]);
        Self {
            signature,
            header_bytes: LittleEndian::read_u32(&buf[4..8]),
            header_checksum: LittleEndian::read_u32(&buf[8..12]),
            table_bytes: LittleEndian::read_u32(&buf[12..16]),
            table_checksum: LittleEndian::read_u32(&buf[16..20]),
            table_entries: LittleEndian::read_u32(&buf[20..24]),
        }
    }

    pub fn to_bytes(&self) -> [u8; LB_HEADER_SIZE] {
        let mut buf = [0u8; LB_HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.signature);
        LittleEndian::write_u32(&mut buf[4..8], self.header_bytes);
        LittleEndian::write_u32(&mut buf[8..12], self.header_checksum);
        LittleEndian::write_u32(&mut buf[12..16], self.table_bytes);
        LittleEndian::write_u32(&mut buf[16..20], self.table_checksum);
        LittleEndian::write_u32(&mut buf[20..24], self.table_entries);
        buf
    }

    /// Signature, size and checksum of the raw header bytes.
    fn is_valid(raw: &[u8; LB_HEADER_SIZE]) -> bool {
        let header = Self::parse(raw);
        header.signature == LB_SIGNATURE
            && header.header_bytes as usize == LB_HEADER_SIZE
            && ip_checksum(raw) == 0
    }
}

/// RFC 1071 internet checksum over little-endian 16-bit words, as used by
/// coreboot. Summing a block that embeds its own checksum yields 0.
pub fn ip_checksum(data: &[u8]) -> u32 {
    let mut sum: u32 = 0;
    for (i, &b) in data.iter().enumerate() {
        let mut v = b as u32;
        if i & 1 == 1 {
            v <<= 8;
        }
        sum += v;
        if sum > 0xFFFF {
            sum = (sum + (sum >> 16)) & 0xFFFF;
        }
    }
    !sum & 0xFFFF
}

/// Coreboot table located through [`PhysMemory`].
pub struct LbTable<M> {
    mem: M,
    header_addr: Option<u64>,
}

impl<M: PhysMemory> LbTable<M> {
    pub fn new(mem: M) -> Self {
        Self {
            mem,
            header_addr: None,
        }
    }

    /// Uses a known header address instead of scanning low memory.
    pub fn at(mem: M, header_addr: u64) -> Self {
        Self {
            mem,
            header_addr: Some(header_addr),
        }
    }

    /// Address of the header the last iteration ended up using, after
    /// forward records were followed.
    pub fn header_addr(&self) -> Option<u64> {
        self.header_addr
    }

    pub fn into_inner(self) -> M {
        self.mem
    }

    fn read_header(&mut self, addr: u64) -> Result<Option<LbHeader>> {
        let mut raw = [0u8; LB_HEADER_SIZE];
        self.mem.read_phys(addr, &mut raw)?;
        if LbHeader::is_valid(&raw) {
            Ok(Some(LbHeader::parse(&raw)))
        } else {
            Ok(None)
        }
    }

    /// Scans the low-memory windows for a valid header.
    pub fn scan(&mut self) -> Result<u64> {
        for (start, end) in LB_SCAN_WINDOWS {
            let mut addr = start;
            while addr + LB_HEADER_SIZE as u64 <= end {
                // Unbacked parts of a window are simply skipped.
                if let Ok(Some(_)) = self.read_header(addr) {
                    tracing::debug!("found coreboot table at {:#x}", addr);
                    return Ok(addr);
                }
                addr += LB_SCAN_STEP;
            }
        }
        Err(CbmemcError::TableNotFound)
    }

    fn read_table(&mut self, addr: u64) -> Result<(LbHeader, Vec<u8>)> {
        let header = self.read_header(addr)?.ok_or(CbmemcError::TableNotFound)?;
        let len = header.table_bytes as usize;
        if len > MAX_TABLE_BYTES {
            return Err(CbmemcError::TableTooLarge(len));
        }

        let mut body = vec![0u8; len];
        self.mem.read_phys(addr + header.header_bytes as u64, &mut body)?;
        let found = ip_checksum(&body);
        if found != header.table_checksum {
            return Err(CbmemcError::BadTableChecksum {
                expected: header.table_checksum,
                found,
            });
        }
        Ok((header, body))
    }
}

enum Walk {
    Done,
    Forward(u64),
}

fn walk(
    header: &LbHeader,
    body: &[u8],
    visitor: &mut dyn FnMut(TableEntry<'_>) -> ControlFlow<()>,
) -> Walk {
    let mut offset = 0usize;
    for _ in 0..header.table_entries {
        if offset + LB_RECORD_HEADER_SIZE > body.len() {
            break;
        }
        let tag = LittleEndian::read_u32(&body[offset..offset + 4]);
        let size = LittleEndian::read_u32(&body[offset + 4..offset + 8]);
        let end = offset.saturating_add(size as usize);
        if (size as usize) < LB_RECORD_HEADER_SIZE || end > body.len() {
            tracing::warn!(tag, size, offset, "truncated coreboot table record");
            break;
        }

        let entry = TableEntry {
            tag,
            size,
            payload: &body[offset + LB_RECORD_HEADER_SIZE..end],
        };
        if tag == LB_TAG_FORWARD {
            if let Some(next) = entry.address() {
                return Walk::Forward(next);
            }
        } else if visitor(entry).is_break() {
            return Walk::Done;
        }
        offset = end;
    }
    Walk::Done
}

impl<M: PhysMemory> TableSource for LbTable<M> {
    fn for_each_entry(
        &mut self,
        visitor: &mut dyn FnMut(TableEntry<'_>) -> ControlFlow<()>,
    ) -> Result<()> {
        let mut addr = match self.header_addr {
            Some(addr) => addr,
            None => self.scan()?,
        };

        for _ in 0..=MAX_FORWARDS {
            let (header, body) = self.read_table(addr)?;
            self.header_addr = Some(addr);
            match walk(&header, &body, visitor) {
                Walk::Done => return Ok(()),
                Walk::Forward(next) => {
                    tracing::debug!("following coreboot forward record {:#x} -> {:#x}", addr, next);
                    addr = next;
                }
            }
        }
        Err(CbmemcError::ForwardLoop)
    }
}

/// Physical memory backed by a byte slice starting at `base`.
pub struct PhysWindow<'a> {
    base: u64,
    bytes: &'a [u8],
}

impl<'a> PhysWindow<'a> {
    pub fn new(base: u64, bytes: &'a [u8]) -> Self {
        Self { base, bytes }
    }

    /// Slice of `len` bytes at physical `addr`.
    pub fn slice(&self, addr: u64, len: usize) -> Result<&'a [u8]> {
        let unmapped = CbmemcError::Unmapped { addr, len };
        let start = addr.checked_sub(self.base).ok_or(unmapped.clone())? as usize;
        let end = start.checked_add(len).ok_or(unmapped.clone())?;
        self.bytes.get(start..end).ok_or(unmapped)
    }

    /// Everything from `addr` to the end of the window.
    pub fn tail(&self, addr: u64) -> Result<&'a [u8]> {
        let unmapped = CbmemcError::Unmapped { addr, len: 0 };
        let start = addr.checked_sub(self.base).ok_or(unmapped.clone())? as usize;
        self.bytes.get(start..).ok_or(unmapped)
    }
}

impl PhysMemory for PhysWindow<'_> {
    fn read_phys(&mut self, addr: u64, buf: &mut [u8]) -> Result<()> {
        buf.copy_from_slice(self.slice(addr, buf.len())?);
        Ok(())
    }
}
