//! Synthetic physical memory images for tests and demos.

use std::fs;
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, WriteBytesExt};
use cbmemc::config::{LB_HEADER_SIZE, LB_SIGNATURE, LB_TAG_CBMEM_CONSOLE, LB_TAG_FORWARD};
use cbmemc::lbio::{ip_checksum, LbHeader};

/// Coreboot table tag carrying the coreboot version string.
const LB_TAG_VERSION: u32 = 0x04;

pub struct ImageSpec {
    pub len: usize,
    pub table_addr: u64,
    /// Puts the real table here and leaves a forward record at `table_addr`.
    pub forward_to: Option<u64>,
    pub console_addr: Option<u64>,
    pub capacity: u32,
    pub cursor: u32,
    pub body: Vec<u8>,
}

impl Default for ImageSpec {
    fn default() -> Self {
        Self {
            len: 0x4000,
            table_addr: 0x500,
            forward_to: None,
            console_addr: Some(0x2000),
            capacity: 256,
            cursor: 0,
            body: Vec::new(),
        }
    }
}

/// Encodes a checksummed coreboot table.
pub fn encode_table(entries: &[(u32, Vec<u8>)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (tag, payload) in entries {
        body.write_u32::<LittleEndian>(*tag).unwrap();
        body.write_u32::<LittleEndian>((8 + payload.len()) as u32).unwrap();
        body.extend_from_slice(payload);
    }

    let mut header = LbHeader {
        signature: LB_SIGNATURE,
        header_bytes: LB_HEADER_SIZE as u32,
        header_checksum: 0,
        table_bytes: body.len() as u32,
        table_checksum: ip_checksum(&body),
        table_entries: entries.len() as u32,
    };
    header.header_checksum = ip_checksum(&header.to_bytes());

    let mut out = header.to_bytes().to_vec();
    out.extend_from_slice(&body);
    out
}

/// Descriptor header followed by `capacity` body bytes.
pub fn encode_console(capacity: u32, cursor: u32, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(8 + capacity as usize);
    out.write_u32::<LittleEndian>(capacity).unwrap();
    out.write_u32::<LittleEndian>(cursor).unwrap();
    out.extend_from_slice(body);
    out.resize(8 + capacity as usize, 0);
    out
}

fn place(image: &mut [u8], addr: u64, data: &[u8]) {
    let start = addr as usize;
    image[start..start + data.len()].copy_from_slice(data);
}

pub fn build_image(spec: &ImageSpec) -> Vec<u8> {
    let mut image = vec![0u8; spec.len];

    let version = (LB_TAG_VERSION, b"4.22\0\0\0\0".to_vec());
    let mut entries = vec![version];
    if let Some(addr) = spec.console_addr {
        entries.push((LB_TAG_CBMEM_CONSOLE, addr.to_le_bytes().to_vec()));
        place(&mut image, addr, &encode_console(spec.capacity, spec.cursor, &spec.body));
    }

    match spec.forward_to {
        Some(real) => {
            let forward = vec![(LB_TAG_FORWARD, real.to_le_bytes().to_vec())];
            place(&mut image, spec.table_addr, &encode_table(&forward));
            place(&mut image, real, &encode_table(&entries));
        }
        None => place(&mut image, spec.table_addr, &encode_table(&entries)),
    }
    image
}

pub fn write_image(path: &Path, spec: &ImageSpec) -> std::io::Result<PathBuf> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir)?;
        }
    }
    fs::write(path, build_image(spec))?;
    Ok(path.to_path_buf())
}
