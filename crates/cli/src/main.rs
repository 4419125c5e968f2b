use clap::{Parser, Subcommand};
use std::path::PathBuf;

use cbmemc_cli::commands::{append, dump, info};
use cbmemc_cli::config::{parse_addr, CliConfig};
use cbmemc_cli::telemetry;

#[derive(Parser)]
#[command(name = "cbmemc")]
#[command(about = "Show and append to the coreboot CBMEM console", long_about = None)]
struct Cli {
    /// Physical memory source: /dev/mem or a raw memory image
    #[arg(long, short, global = true, default_value = "/dev/mem")]
    mem: PathBuf,

    /// Physical address of offset 0 in the memory source
    #[arg(long, global = true, default_value = "0", value_parser = parse_addr)]
    base: u64,

    /// Coreboot table header address (skips the low-memory scan)
    #[arg(long, global = true, value_parser = parse_addr)]
    table: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the console content, oldest first (default)
    Dump,
    /// Show where the console lives and its cursor state
    Info {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Append text to the console
    Append {
        text: String,

        /// Do not terminate the text with a newline
        #[arg(long, short = 'n')]
        no_newline: bool,
    },
}

fn main() -> anyhow::Result<()> {
    telemetry::init_logging();

    let cli = Cli::parse();
    let cfg = CliConfig {
        mem_path: cli.mem,
        base: cli.base,
        table_addr: cli.table,
    };

    let mut stdout = std::io::stdout().lock();
    match cli.command.unwrap_or(Commands::Dump) {
        Commands::Dump => dump::run(&cfg, &mut stdout).map(|_| ()),
        Commands::Info { json } => info::run(&cfg, json, &mut stdout).map(|_| ()),
        Commands::Append { text, no_newline } => append::run(&cfg, &text, !no_newline).map(|_| ()),
    }
}
