use std::io::Write;

use anyhow::Context;

use crate::commands::find;
use crate::config::CliConfig;
use crate::memory::PhysMem;

/// Writes the console content, oldest byte first, to `out`.
pub fn run<W: Write>(cfg: &CliConfig, out: &mut W) -> anyhow::Result<usize> {
    let mut mem = PhysMem::open(&cfg.mem_path, cfg.base, false)?;
    let located = find(&mut mem, cfg)?;
    let console = mem.console(located.console_addr)?;

    let mut written = Ok(());
    let emitted = console.dump_to(&mut |bytes: &[u8]| {
        if written.is_ok() {
            written = out.write_all(bytes);
        }
    });
    written.context("Failed to write console content")?;
    out.flush()?;

    tracing::info!(emitted, "dumped CBMEM console at {:#x}", located.console_addr);
    Ok(emitted)
}
