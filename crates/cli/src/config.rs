use std::path::PathBuf;

/// Where physical memory comes from and how to find the table in it.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// `/dev/mem` or a raw memory image.
    pub mem_path: PathBuf,
    /// Physical address of file offset 0.
    pub base: u64,
    /// Skip the low-memory scan and read the table header here.
    pub table_addr: Option<u64>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            mem_path: PathBuf::from("/dev/mem"),
            base: 0,
            table_addr: None,
        }
    }
}

/// Parses `0x`-prefixed hex or plain decimal addresses.
pub fn parse_addr(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16),
        None => s.replace('_', "").parse::<u64>(),
    };
    parsed.map_err(|e| format!("invalid address '{}': {}", s, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_addr() {
        assert_eq!(parse_addr("0x7fe0_0000"), Ok(0x7fe0_0000));
        assert_eq!(parse_addr("4096"), Ok(4096));
        assert!(parse_addr("0xzz").is_err());
    }
}
