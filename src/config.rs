// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Configuration constants.

/// Low 28 bits of the cursor word hold the next write offset.
pub const CURSOR_MASK: u32 = (1 << 28) - 1;

/// Sticky bit set once the write cursor has wrapped.
pub const OVERFLOW: u32 = 1 << 31;

/// Size of the descriptor header (`size` + `cursor`) preceding the body.
pub const CONSOLE_HEADER_SIZE: usize = 8;

/// Largest body a descriptor can address through the cursor word.
pub const MAX_CONSOLE_SIZE: usize = CURSOR_MASK as usize;

/// Coreboot table tag of a forward record pointing at the real table.
pub const LB_TAG_FORWARD: u32 = 0x11;

/// Coreboot table tag of the CBMEM console record.
pub const LB_TAG_CBMEM_CONSOLE: u32 = 0x17;

/// Coreboot table header signature.
pub const LB_SIGNATURE: [u8; 4] = *b"LBIO";

/// Size of the coreboot table header.
pub const LB_HEADER_SIZE: usize = 24;

/// Size of a table entry header (`tag` + `size`).
pub const LB_RECORD_HEADER_SIZE: usize = 8;

/// Upper bound for a coreboot table body we are willing to read.
pub const MAX_TABLE_BYTES: usize = 64 * 1024;

/// Forward records followed before giving up on a table chain.
pub const MAX_FORWARDS: usize = 4;

/// Low-memory windows scanned for the table header, 16-byte aligned.
pub const LB_SCAN_WINDOWS: [(u64, u64); 2] = [(0x0, 0x1000), (0xf0000, 0x10_0000)];

/// Scan stride inside [`LB_SCAN_WINDOWS`].
pub const LB_SCAN_STEP: u64 = 16;

/// Name of the terminal output device and of the dump command.
pub const CBMEMC_NAME: &str = "cbmemc";

/// One-line help for the dump command.
pub const CBMEMC_SUMMARY: &str = "Show CBMEM console content.";

/// Default geometry reported by the terminal adapter.
pub const TERM_WIDTH: u16 = 80;
pub const TERM_HEIGHT: u16 = 24;
