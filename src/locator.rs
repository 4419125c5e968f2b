// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Finds the CBMEM console record in the firmware table.

use byteorder::{ByteOrder, LittleEndian};
use core::ops::ControlFlow;

use crate::config::{CONSOLE_HEADER_SIZE, LB_TAG_CBMEM_CONSOLE};
use crate::console::CbmemConsole;
use crate::error::Result;
use crate::lbio::{PhysWindow, TableSource};

/// Turns a descriptor address found in the table into a usable view.
pub trait ConsoleMapper {
    type Backing: AsRef<[u8]>;

    fn map_console(&mut self, addr: u64) -> Result<CbmemConsole<Self::Backing>>;
}

impl<'a> ConsoleMapper for PhysWindow<'a> {
    type Backing = &'a [u8];

    fn map_console(&mut self, addr: u64) -> Result<CbmemConsole<&'a [u8]>> {
        let size = LittleEndian::read_u32(self.slice(addr, CONSOLE_HEADER_SIZE)?) as usize;
        // A body running off the window is clamped by the console view.
        let region = match self.slice(addr, CONSOLE_HEADER_SIZE + size) {
            Ok(region) => region,
            Err(_) => self.tail(addr)?,
        };
        CbmemConsole::new(region)
    }
}

/// Address of the first CBMEM console descriptor in `table`, if any.
/// Iteration stops at the first match.
pub fn locate<T: TableSource + ?Sized>(table: &mut T) -> Result<Option<u64>> {
    let mut found = None;
    table.for_each_entry(&mut |entry| {
        if entry.tag != LB_TAG_CBMEM_CONSOLE {
            return ControlFlow::Continue(());
        }
        match entry.address() {
            Some(addr) => {
                found = Some(addr);
                ControlFlow::Break(())
            }
            None => {
                tracing::warn!(size = entry.size, "CBMEM console record too short, skipping");
                ControlFlow::Continue(())
            }
        }
    })?;

    if let Some(addr) = found {
        tracing::info!("CBMEM console descriptor at {:#x}", addr);
    }
    Ok(found)
}

/// Locates and maps the console. Absence, or any table or mapping failure,
/// yields `None`; callers surface that later as `NoConsole`.
pub fn find_console<T, M>(table: &mut T, mapper: &mut M) -> Option<CbmemConsole<M::Backing>>
where
    T: TableSource + ?Sized,
    M: ConsoleMapper + ?Sized,
{
    let addr = match locate(table) {
        Ok(Some(addr)) => addr,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!("coreboot table unavailable: {}", e);
            return None;
        }
    };

    match mapper.map_console(addr) {
        Ok(console) => Some(console),
        Err(e) => {
            tracing::warn!("cannot map CBMEM console at {:#x}: {}", addr, e);
            None
        }
    }
}
