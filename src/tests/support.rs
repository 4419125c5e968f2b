//! Helpers for building descriptors and memory images.
#![allow(dead_code)]

use std::boxed::Box;
use std::vec::Vec;

use byteorder::{ByteOrder, LittleEndian};

use crate::config::{CONSOLE_HEADER_SIZE, LB_HEADER_SIZE, LB_SIGNATURE};
use crate::console::CbmemConsole;
use crate::error::Result;
use crate::lbio::{ip_checksum, LbHeader, PhysWindow};
use crate::locator::ConsoleMapper;
use crate::module::{CommandId, CommandRegistry, TerminalRegistry};
use crate::term::TermOutput;

/// Descriptor bytes: header followed by a zeroed body.
pub fn region(capacity: u32, cursor: u32) -> Vec<u8> {
    let mut buf = vec![0u8; CONSOLE_HEADER_SIZE + capacity as usize];
    LittleEndian::write_u32(&mut buf[0..4], capacity);
    LittleEndian::write_u32(&mut buf[4..8], cursor);
    buf
}

pub fn console(capacity: u32) -> CbmemConsole<Vec<u8>> {
    CbmemConsole::new(region(capacity, 0)).unwrap()
}

/// Encodes table records as `tag, size, payload`.
pub fn records(entries: &[(u32, Vec<u8>)]) -> Vec<u8> {
    let mut out = Vec::new();
    for (tag, payload) in entries {
        let mut head = [0u8; 8];
        LittleEndian::write_u32(&mut head[0..4], *tag);
        LittleEndian::write_u32(&mut head[4..8], (8 + payload.len()) as u32);
        out.extend_from_slice(&head);
        out.extend_from_slice(payload);
    }
    out
}

pub fn addr_payload(addr: u64) -> Vec<u8> {
    addr.to_le_bytes().to_vec()
}

/// Flat physical memory starting at `base`.
pub struct MemImage {
    pub base: u64,
    pub bytes: Vec<u8>,
}

impl MemImage {
    pub fn new(base: u64, len: usize) -> Self {
        Self {
            base,
            bytes: vec![0u8; len],
        }
    }

    pub fn write(&mut self, addr: u64, data: &[u8]) {
        let start = (addr - self.base) as usize;
        self.bytes[start..start + data.len()].copy_from_slice(data);
    }

    /// Writes a checksummed coreboot table at `addr`.
    pub fn write_table(&mut self, addr: u64, entries: &[(u32, Vec<u8>)]) {
        let body = records(entries);
        let mut header = LbHeader {
            signature: LB_SIGNATURE,
            header_bytes: LB_HEADER_SIZE as u32,
            header_checksum: 0,
            table_bytes: body.len() as u32,
            table_checksum: ip_checksum(&body),
            table_entries: entries.len() as u32,
        };
        header.header_checksum = ip_checksum(&header.to_bytes());
        self.write(addr, &header.to_bytes());
        self.write(addr + LB_HEADER_SIZE as u64, &body);
    }

    pub fn write_console(&mut self, addr: u64, capacity: u32, cursor: u32, body: &[u8]) {
        let mut desc = region(capacity, cursor);
        desc[CONSOLE_HEADER_SIZE..CONSOLE_HEADER_SIZE + body.len()].copy_from_slice(body);
        self.write(addr, &desc);
    }

    pub fn window(&self) -> PhysWindow<'_> {
        PhysWindow::new(self.base, &self.bytes)
    }
}

/// Maps consoles out of a window into owned, writable buffers.
pub struct CopyMapper<'a> {
    pub window: PhysWindow<'a>,
}

impl ConsoleMapper for CopyMapper<'_> {
    type Backing = Vec<u8>;

    fn map_console(&mut self, addr: u64) -> Result<CbmemConsole<Vec<u8>>> {
        let mapped = self.window.map_console(addr)?;
        CbmemConsole::new(mapped.into_inner().to_vec())
    }
}

#[derive(Default)]
pub struct TestTerms {
    pub outputs: Vec<Box<dyn TermOutput>>,
}

impl TestTerms {
    pub fn get(&mut self, name: &str) -> Option<&mut Box<dyn TermOutput>> {
        self.outputs.iter_mut().find(|t| t.name() == name)
    }
}

impl TerminalRegistry for TestTerms {
    fn register_output(&mut self, term: Box<dyn TermOutput>) {
        self.outputs.push(term);
    }

    fn unregister_output(&mut self, name: &str) {
        self.outputs.retain(|t| t.name() != name);
    }
}

#[derive(Default)]
pub struct TestCommands {
    pub next: u32,
    pub commands: Vec<(CommandId, &'static str, &'static str)>,
}

impl CommandRegistry for TestCommands {
    fn register_command(&mut self, name: &'static str, summary: &'static str) -> CommandId {
        let id = CommandId(self.next);
        self.next += 1;
        self.commands.push((id, name, summary));
        id
    }

    fn unregister_command(&mut self, id: CommandId) {
        self.commands.retain(|(c, _, _)| *c != id);
    }
}
