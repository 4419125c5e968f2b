pub mod append;
pub mod dump;
pub mod info;

use cbmemc::lbio::LbTable;
use cbmemc::locator::locate;
use cbmemc::CbmemcError;

use crate::config::CliConfig;
use crate::memory::PhysMem;

/// Where the table and the console descriptor were found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Located {
    pub table_addr: u64,
    pub console_addr: u64,
}

/// Walks the coreboot table and returns the console descriptor address.
pub fn find(mem: &mut PhysMem, cfg: &CliConfig) -> anyhow::Result<Located> {
    let mut table = match cfg.table_addr {
        Some(addr) => LbTable::at(&mut *mem, addr),
        None => LbTable::new(&mut *mem),
    };
    let console_addr = locate(&mut table)?.ok_or(CbmemcError::NoConsole)?;
    let table_addr = table.header_addr().unwrap_or_default();
    Ok(Located {
        table_addr,
        console_addr,
    })
}
