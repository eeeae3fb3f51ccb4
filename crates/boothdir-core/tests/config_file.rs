use boothdir_core::config::{BoothConfig, rewrite_key_on_disk};
use std::fs;
use tempfile::TempDir;

const SAMPLE: &str = "\
# booth settings
[GENERAL]
language = en
directory = \"/data/photos\"

[CAMERA]
iso = 100
";

#[test]
fn rewrite_replaces_value_and_preserves_the_rest() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("booth.cfg");
    fs::write(&path, SAMPLE).unwrap();

    let changed = rewrite_key_on_disk(&path, "GENERAL", "directory", "\"/data/new\"").unwrap();
    assert!(changed);

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("directory = \"/data/new\""));
    assert!(text.contains("# booth settings"));
    assert!(text.contains("language = en"));
    assert!(text.contains("iso = 100"));
    assert!(!text.contains("/data/photos"));
}

#[test]
fn rewrite_skips_when_value_already_matches() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("booth.cfg");
    fs::write(&path, SAMPLE).unwrap();

    let changed =
        rewrite_key_on_disk(&path, "GENERAL", "directory", "\"/data/photos\"").unwrap();
    assert!(!changed);
    assert_eq!(fs::read_to_string(&path).unwrap(), SAMPLE);
}

#[test]
fn rewrite_inserts_missing_key_under_its_section() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("booth.cfg");
    fs::write(&path, SAMPLE).unwrap();

    rewrite_key_on_disk(&path, "CAMERA", "flash", "on").unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("[CAMERA]\nflash = on\niso = 100"));
}

#[test]
fn rewrite_appends_missing_section() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("booth.cfg");
    fs::write(&path, SAMPLE).unwrap();

    rewrite_key_on_disk(&path, "DATE_FOLDER", "start_hour", "10").unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.ends_with("[DATE_FOLDER]\nstart_hour = 10\n"));
    assert!(text.starts_with("# booth settings"));
}

#[test]
fn rewrite_creates_a_missing_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("booth.cfg");

    let changed = rewrite_key_on_disk(&path, "GENERAL", "directory", "\"/data\"").unwrap();
    assert!(changed);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "[GENERAL]\ndirectory = \"/data\"\n"
    );
}

#[test]
fn save_round_trips_without_spurious_writes() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("booth.cfg");
    fs::write(&path, SAMPLE).unwrap();

    let cfg = BoothConfig::load(&path).unwrap();
    cfg.save().unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), SAMPLE);
}

#[test]
fn save_writes_in_memory_changes_surgically() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("booth.cfg");
    fs::write(&path, SAMPLE).unwrap();

    let mut cfg = BoothConfig::load(&path).unwrap();
    cfg.set("GENERAL", "language", "de");
    cfg.save().unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("language = de"));
    assert!(text.contains("# booth settings"));
    assert!(text.contains("directory = \"/data/photos\""));
}

#[test]
fn save_without_backing_file_fails() {
    let cfg = BoothConfig::from_text(SAMPLE);
    assert!(cfg.save().is_err());
}
