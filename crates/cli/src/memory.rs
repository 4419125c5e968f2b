//! Physical memory access through a file (`/dev/mem` or an image).

use std::fs::{File, OpenOptions};
use std::os::unix::fs::FileExt;
use std::path::Path;

use anyhow::Context;
use byteorder::{ByteOrder, LittleEndian};
use cbmemc::config::{CONSOLE_HEADER_SIZE, MAX_CONSOLE_SIZE};
use cbmemc::lbio::PhysMemory;
use cbmemc::{CbmemConsole, CbmemcError};
use memmap2::{Mmap, MmapMut, MmapOptions};

pub struct PhysMem {
    file: File,
    base: u64,
    /// Known for regular files; character devices report no length.
    len: Option<u64>,
}

impl PhysMem {
    pub fn open(path: impl AsRef<Path>, base: u64, writable: bool) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(writable)
            .open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let meta = file.metadata()?;
        let len = meta.is_file().then(|| meta.len());
        tracing::debug!(path = %path.display(), base, ?len, writable, "opened physical memory");
        Ok(Self { file, base, len })
    }

    fn file_offset(&self, addr: u64, len: usize) -> cbmemc::Result<u64> {
        let unmapped = CbmemcError::Unmapped { addr, len };
        let offset = addr.checked_sub(self.base).ok_or(unmapped.clone())?;
        if let Some(file_len) = self.len {
            if offset.checked_add(len as u64).map_or(true, |end| end > file_len) {
                return Err(unmapped);
            }
        }
        Ok(offset)
    }

    /// Length of the descriptor region at `addr`, clamped to the file.
    fn console_len(&mut self, addr: u64) -> cbmemc::Result<(u64, usize)> {
        let mut header = [0u8; CONSOLE_HEADER_SIZE];
        self.read_phys(addr, &mut header)?;
        let offset = self.file_offset(addr, CONSOLE_HEADER_SIZE)?;
        let declared = (LittleEndian::read_u32(&header[0..4]) as usize).min(MAX_CONSOLE_SIZE);
        let mut len = CONSOLE_HEADER_SIZE + declared;
        if let Some(file_len) = self.len {
            len = len.min((file_len - offset) as usize);
        }
        Ok((offset, len))
    }

    pub fn console(&mut self, addr: u64) -> cbmemc::Result<CbmemConsole<Mmap>> {
        let (offset, len) = self.console_len(addr)?;
        // SAFETY: read-only view; firmware may still append, which only
        // changes the bytes we copy out.
        let map = unsafe { MmapOptions::new().offset(offset).len(len).map(&self.file) }
            .map_err(|e| {
                tracing::warn!("mmap of {:#x} failed: {}", addr, e);
                CbmemcError::Unmapped { addr, len }
            })?;
        CbmemConsole::new(map)
    }

    pub fn console_mut(&mut self, addr: u64) -> cbmemc::Result<CbmemConsole<MmapMut>> {
        let (offset, len) = self.console_len(addr)?;
        // SAFETY: this process is the only writer while the mapping lives.
        let map = unsafe { MmapOptions::new().offset(offset).len(len).map_mut(&self.file) }
            .map_err(|e| {
                tracing::warn!("writable mmap of {:#x} failed: {}", addr, e);
                CbmemcError::Unmapped { addr, len }
            })?;
        CbmemConsole::new(map)
    }
}

impl PhysMemory for PhysMem {
    fn read_phys(&mut self, addr: u64, buf: &mut [u8]) -> cbmemc::Result<()> {
        let len = buf.len();
        let offset = self.file_offset(addr, len)?;
        self.file.read_exact_at(buf, offset).map_err(|e| {
            tracing::trace!("read of {:#x} failed: {}", addr, e);
            CbmemcError::Unmapped { addr, len }
        })
    }
}
