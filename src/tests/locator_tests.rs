// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use core::ops::ControlFlow;
use std::vec::Vec;

use crate::config::{LB_TAG_CBMEM_CONSOLE, OVERFLOW};
use crate::error::{CbmemcError, Result};
use crate::lbio::{LbTable, TableEntry, TableSource};
use crate::locator::{find_console, locate, ConsoleMapper};
use crate::tests::support::{addr_payload, MemImage};

const LB_TAG_TIMESTAMPS: u32 = 0x16;

/// Table source over a fixed list of records, counting visits.
struct ListTable {
    entries: Vec<(u32, Vec<u8>)>,
    visited: usize,
}

impl TableSource for ListTable {
    fn for_each_entry(
        &mut self,
        visitor: &mut dyn FnMut(TableEntry<'_>) -> ControlFlow<()>,
    ) -> Result<()> {
        for (tag, payload) in &self.entries {
            self.visited += 1;
            let entry = TableEntry {
                tag: *tag,
                size: 8 + payload.len() as u32,
                payload,
            };
            if visitor(entry).is_break() {
                break;
            }
        }
        Ok(())
    }
}

#[test]
fn test_locate_first_match_and_stop() {
    let mut table = ListTable {
        entries: vec![
            (LB_TAG_TIMESTAMPS, addr_payload(0x1111)),
            (LB_TAG_CBMEM_CONSOLE, addr_payload(0x7fe0_0000)),
            (LB_TAG_CBMEM_CONSOLE, addr_payload(0x2222)),
            (LB_TAG_TIMESTAMPS, vec![]),
        ],
        visited: 0,
    };
    assert_eq!(locate(&mut table).unwrap(), Some(0x7fe0_0000));
    assert_eq!(table.visited, 2);
}

#[test]
fn test_locate_skips_short_record() {
    let mut table = ListTable {
        entries: vec![
            (LB_TAG_CBMEM_CONSOLE, vec![1, 2, 3]),
            (LB_TAG_CBMEM_CONSOLE, addr_payload(0x4000)),
        ],
        visited: 0,
    };
    assert_eq!(locate(&mut table).unwrap(), Some(0x4000));
}

#[test]
fn test_locate_absent() {
    let mut table = ListTable {
        entries: vec![(LB_TAG_TIMESTAMPS, addr_payload(0x1111))],
        visited: 0,
    };
    assert_eq!(locate(&mut table).unwrap(), None);
}

#[test]
fn test_find_console_in_image() {
    let mut img = MemImage::new(0, 0x3000);
    img.write_table(0x500, &[(LB_TAG_CBMEM_CONSOLE, addr_payload(0x2000))]);
    img.write_console(0x2000, 16, OVERFLOW | 4, b"EFGHIJKLMNOPABCD");

    let mut table = LbTable::new(img.window());
    let mut mapper = img.window();
    let console = find_console(&mut table, &mut mapper).unwrap();
    assert_eq!(console.capacity(), 16);
    assert_eq!(console.to_vec(), b"IJKLMNOPABCDEFGH");
}

#[test]
fn test_console_running_off_window_is_clamped() {
    let mut img = MemImage::new(0, 0x1010);
    img.write_table(0x100, &[(LB_TAG_CBMEM_CONSOLE, addr_payload(0x1000))]);
    // Header says 0x10000 bytes, only 8 body bytes exist past the header
    img.write_console(0x1000, 8, 3, b"abc");
    img.bytes[0x1000..0x1004].copy_from_slice(&0x10000u32.to_le_bytes());

    let mut mapper = img.window();
    let console = mapper.map_console(0x1000).unwrap();
    assert_eq!(console.capacity(), 8);
    assert_eq!(console.to_vec(), b"abc");
}

#[test]
fn test_find_console_unmapped_address() {
    let mut img = MemImage::new(0, 0x1000);
    img.write_table(0x500, &[(LB_TAG_CBMEM_CONSOLE, addr_payload(0xdead_0000))]);

    let mut table = LbTable::new(img.window());
    let mut mapper = img.window();
    assert!(find_console(&mut table, &mut mapper).is_none());

    match mapper.map_console(0xdead_0000) {
        Err(CbmemcError::Unmapped { addr: 0xdead_0000, .. }) => (),
        _ => panic!("Expected Unmapped"),
    }
}

#[test]
fn test_find_console_without_table() {
    let img = MemImage::new(0, 0x1000);
    let mut table = LbTable::new(img.window());
    let mut mapper = img.window();
    assert!(find_console(&mut table, &mut mapper).is_none());
}
