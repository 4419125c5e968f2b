use anyhow::Context;

use crate::commands::find;
use crate::config::CliConfig;
use crate::memory::PhysMem;

/// Appends `text` to the console, as firmware or a bootloader would.
pub fn run(cfg: &CliConfig, text: &str, newline: bool) -> anyhow::Result<usize> {
    let mut mem = PhysMem::open(&cfg.mem_path, cfg.base, true)?;
    let located = find(&mut mem, cfg)?;
    let mut console = mem.console_mut(located.console_addr)?;

    console.write_bytes(text.as_bytes());
    let mut written = text.len();
    if newline {
        console.put(b'\n');
        written += 1;
    }

    let cursor = console.cursor();
    console
        .into_inner()
        .flush()
        .context("Failed to flush console mapping")?;

    tracing::info!(
        written,
        offset = cursor.offset,
        overflow = cursor.overflow,
        "appended to CBMEM console"
    );
    Ok(written)
}
