use tempfile::tempdir;

use cbmemc::config::OVERFLOW;
use cbmemc::CbmemcError;
use cbmemc_cli::commands::{append, dump, info};
use cbmemc_cli::config::CliConfig;
use cbmemc_cli::fixtures::{write_image, ImageSpec};

fn config_for(path: std::path::PathBuf) -> CliConfig {
    CliConfig {
        mem_path: path,
        ..CliConfig::default()
    }
}

#[test]
fn test_dump_workflow() {
    let dir = tempdir().unwrap();
    let spec = ImageSpec {
        body: b"coreboot-4.22 Sat Jan 1 bootblock starting\n".to_vec(),
        cursor: 43,
        ..ImageSpec::default()
    };
    let path = write_image(&dir.path().join("mem.img"), &spec).unwrap();
    let cfg = config_for(path);

    let mut out: Vec<u8> = Vec::new();
    let emitted = dump::run(&cfg, &mut out).unwrap();
    assert_eq!(emitted, 43);
    assert_eq!(out, b"coreboot-4.22 Sat Jan 1 bootblock starting\n");

    // Dumping again yields the same bytes
    let mut again: Vec<u8> = Vec::new();
    dump::run(&cfg, &mut again).unwrap();
    assert_eq!(out, again);
}

#[test]
fn test_dump_wrapped_console() {
    let dir = tempdir().unwrap();
    let spec = ImageSpec {
        capacity: 8,
        cursor: OVERFLOW | 3,
        body: b"IJKDEFGH".to_vec(),
        ..ImageSpec::default()
    };
    let path = write_image(&dir.path().join("mem.img"), &spec).unwrap();

    let mut out: Vec<u8> = Vec::new();
    dump::run(&config_for(path), &mut out).unwrap();
    assert_eq!(out, b"DEFGHIJK");
}

#[test]
fn test_append_then_dump() {
    let dir = tempdir().unwrap();
    let spec = ImageSpec {
        capacity: 16,
        body: b"boot\n".to_vec(),
        cursor: 5,
        ..ImageSpec::default()
    };
    let path = write_image(&dir.path().join("mem.img"), &spec).unwrap();
    let cfg = config_for(path);

    let written = append::run(&cfg, "GRUB loading", true).unwrap();
    assert_eq!(written, 13);

    // 5 + 13 = 18 bytes through a 16 byte ring: oldest 2 are gone
    let mut out: Vec<u8> = Vec::new();
    dump::run(&cfg, &mut out).unwrap();
    assert_eq!(out, b"ot\nGRUB loading\n");

    let report = info::report(&cfg).unwrap();
    assert!(report.overflow);
    assert_eq!(report.offset, 2);
    assert_eq!(report.stored, 16);
}

#[test]
fn test_info_follows_forward_record() {
    let dir = tempdir().unwrap();
    let spec = ImageSpec {
        table_addr: 0x20,
        forward_to: Some(0x3000),
        cursor: 4,
        body: b"ram\n".to_vec(),
        ..ImageSpec::default()
    };
    let path = write_image(&dir.path().join("mem.img"), &spec).unwrap();
    let cfg = config_for(path);

    let mut out: Vec<u8> = Vec::new();
    let report = info::run(&cfg, false, &mut out).unwrap();
    assert_eq!(report.table_addr, 0x3000);
    assert_eq!(report.console_addr, 0x2000);
    assert_eq!(report.capacity, 256);
    assert_eq!(report.stored, 4);
    assert!(String::from_utf8(out).unwrap().contains("0x2000"));

    let mut json: Vec<u8> = Vec::new();
    info::run(&cfg, true, &mut json).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
    assert_eq!(value["console_addr"], 0x2000);
    assert_eq!(value["overflow"], false);
}

#[test]
fn test_missing_console() {
    let dir = tempdir().unwrap();
    let spec = ImageSpec {
        console_addr: None,
        ..ImageSpec::default()
    };
    let path = write_image(&dir.path().join("mem.img"), &spec).unwrap();

    let mut out: Vec<u8> = Vec::new();
    let err = dump::run(&config_for(path), &mut out).unwrap_err();
    assert_eq!(err.downcast_ref::<CbmemcError>(), Some(&CbmemcError::NoConsole));
    assert_eq!(err.to_string(), "no CBMEM console found");
    assert!(out.is_empty());
}

#[test]
fn test_explicit_table_address_and_base() {
    let dir = tempdir().unwrap();
    let spec = ImageSpec {
        table_addr: 0x100,
        console_addr: Some(0x800),
        cursor: 3,
        body: b"hi\n".to_vec(),
        ..ImageSpec::default()
    };
    let image = cbmemc_cli::fixtures::build_image(&spec);
    let path = dir.path().join("high.img");
    std::fs::write(&path, &image).unwrap();

    let cfg = CliConfig {
        mem_path: path,
        base: 0,
        table_addr: Some(0x100),
    };
    let mut out: Vec<u8> = Vec::new();
    dump::run(&cfg, &mut out).unwrap();
    assert_eq!(out, b"hi\n");

    // Table found at the rebased address, but the console pointer it holds
    // now falls below the image
    let shifted = CliConfig {
        base: 0x10000,
        table_addr: Some(0x10100),
        ..cfg
    };
    assert!(dump::run(&shifted, &mut Vec::<u8>::new()).is_err());
}
