// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Error types.

use thiserror::Error;

/// Coarse classification used when mapping errors onto command status codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// Device or buffer unavailable.
    Io,
    /// Firmware-provided metadata is malformed.
    BadData,
    /// An address falls outside the accessible memory.
    OutOfRange,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CbmemcError {
    #[error("no CBMEM console found")]
    NoConsole,

    #[error("memory region too small: need {needed} bytes, have {available}")]
    RegionTooSmall { needed: usize, available: usize },

    #[error("address {addr:#x} (+{len}) is not mapped")]
    Unmapped { addr: u64, len: usize },

    #[error("coreboot table not found")]
    TableNotFound,

    #[error("coreboot table checksum mismatch: expected {expected:#06x}, found {found:#06x}")]
    BadTableChecksum { expected: u32, found: u32 },

    #[error("coreboot table too large: {0} bytes")]
    TableTooLarge(usize),

    #[error("too many coreboot forward records")]
    ForwardLoop,
}

impl CbmemcError {
    pub fn class(&self) -> ErrorClass {
        match self {
            CbmemcError::NoConsole => ErrorClass::Io,
            CbmemcError::Unmapped { .. } => ErrorClass::OutOfRange,
            CbmemcError::RegionTooSmall { .. }
            | CbmemcError::TableNotFound
            | CbmemcError::BadTableChecksum { .. }
            | CbmemcError::TableTooLarge(_)
            | CbmemcError::ForwardLoop => ErrorClass::BadData,
        }
    }
}

pub type Result<T> = core::result::Result<T, CbmemcError>;
