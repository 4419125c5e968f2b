// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
#![no_std]

//! cbmemc: reader and writer for the coreboot CBMEM console ring buffer.

extern crate alloc;

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod config;
pub mod error;
pub mod cursor;
pub mod sink;
pub mod console;
pub mod slot;
pub mod lbio;
pub mod locator;
pub mod term;
pub mod module;

pub use console::{CbmemConsole, ConsoleStats};
pub use cursor::Cursor;
pub use error::{CbmemcError, ErrorClass, Result};
pub use module::CbmemcModule;
pub use slot::ConsoleSlot;

#[cfg(test)]
pub mod tests;
