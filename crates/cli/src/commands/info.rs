use std::io::Write;

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use serde::Serialize;

use crate::commands::find;
use crate::config::CliConfig;
use crate::memory::PhysMem;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConsoleReport {
    pub table_addr: u64,
    pub console_addr: u64,
    pub declared_capacity: u32,
    pub capacity: usize,
    pub offset: u32,
    pub overflow: bool,
    pub stored: usize,
}

pub fn report(cfg: &CliConfig) -> anyhow::Result<ConsoleReport> {
    let mut mem = PhysMem::open(&cfg.mem_path, cfg.base, false)?;
    let located = find(&mut mem, cfg)?;
    let stats = mem.console(located.console_addr)?.stats();

    Ok(ConsoleReport {
        table_addr: located.table_addr,
        console_addr: located.console_addr,
        declared_capacity: stats.declared_capacity,
        capacity: stats.capacity,
        offset: stats.cursor.offset,
        overflow: stats.cursor.overflow,
        stored: stats.stored,
    })
}

pub fn run<W: Write>(cfg: &CliConfig, json: bool, out: &mut W) -> anyhow::Result<ConsoleReport> {
    let report = report(cfg)?;

    if json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
        return Ok(report);
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Field", "Value"]);

    let capacity = if report.capacity as u64 == report.declared_capacity as u64 {
        report.capacity.to_string()
    } else {
        format!("{} (declared {})", report.capacity, report.declared_capacity)
    };

    table.add_row(vec!["Coreboot table".to_string(), format!("{:#x}", report.table_addr)]);
    table.add_row(vec!["Console descriptor".to_string(), format!("{:#x}", report.console_addr)]);
    table.add_row(vec!["Capacity".to_string(), capacity]);
    table.add_row(vec!["Cursor".to_string(), report.offset.to_string()]);
    table.add_row(vec![
        "Wrapped".to_string(),
        if report.overflow { "yes" } else { "no" }.to_string(),
    ]);
    table.add_row(vec!["Stored bytes".to_string(), report.stored.to_string()]);

    writeln!(out, "\nCBMEM Console\n")?;
    writeln!(out, "{table}\n")?;

    Ok(report)
}
