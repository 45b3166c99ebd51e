//! Integration tests for archive probing functionality.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;
use zipguard::{probe, ExtractError};

/// Helper function to create a test archive directory
fn setup_test_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// Helper function to create a ZIP archive
fn create_zip_archive(archive_path: &PathBuf, files: &[(&str, &str)]) -> std::io::Result<()> {
    let file = File::create(archive_path)?;
    let mut zip = zip::ZipWriter::new(file);

    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    for (name, content) in files {
        if name.ends_with('/') {
            zip.add_directory(*name, options)?;
        } else {
            zip.start_file(*name, options)?;
            zip.write_all(content.as_bytes())?;
        }
    }

    zip.finish()?;
    Ok(())
}

#[test]
fn test_probe_zip_archive() {
    let temp_dir = setup_test_dir();
    let archive_path = temp_dir.path().join("test.zip");

    create_zip_archive(
        &archive_path,
        &[
            ("docs/", ""),
            ("docs/readme.txt", "Hello, World!"),
            ("data.json", "{\"key\": \"value\"}"),
        ],
    )
    .expect("Failed to create ZIP");

    // Probe the archive
    let info = probe(&archive_path).expect("Failed to probe archive");

    assert_eq!(info.entries, 3);
    assert!(!info.encrypted);
    assert_eq!(info.uncompressed_estimate, 13 + 16);
    assert_eq!(
        info.compressed_bytes,
        std::fs::metadata(&archive_path).unwrap().len()
    );

    let names: Vec<&str> = info.entry_list.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["docs/", "docs/readme.txt", "data.json"]);
    assert!(info.entry_list[0].is_directory);
    assert!(!info.entry_list[1].is_directory);
    assert_eq!(info.entry_list[1].size, 13);
}

#[test]
fn test_probe_reports_hostile_names_without_extracting() {
    let temp_dir = setup_test_dir();
    let archive_path = temp_dir.path().join("outside.zip");

    create_zip_archive(&archive_path, &[("../../evil.txt", "escaped")])
        .expect("Failed to create ZIP");

    // Listing is harmless; only extraction sanitizes
    let info = probe(&archive_path).expect("Failed to probe archive");
    assert_eq!(info.entry_list[0].name, "../../evil.txt");
    assert!(!temp_dir.path().join("evil.txt").exists());
}

#[test]
fn test_probe_empty_archive() {
    let temp_dir = setup_test_dir();
    let archive_path = temp_dir.path().join("empty.zip");

    create_zip_archive(&archive_path, &[]).expect("Failed to create empty ZIP");

    // Probe the archive
    let info = probe(&archive_path).expect("Failed to probe empty archive");

    assert_eq!(info.entries, 0);
    assert_eq!(info.uncompressed_estimate, 0);
    assert!(info.entry_list.is_empty());
}

#[test]
fn test_probe_nonexistent_archive() {
    let temp_dir = setup_test_dir();
    let archive_path = temp_dir.path().join("missing.zip");

    let result = probe(&archive_path);
    assert!(matches!(result, Err(ExtractError::NotFound(_))));
}

#[test]
fn test_probe_not_a_zip() {
    let temp_dir = setup_test_dir();
    let archive_path = temp_dir.path().join("notes.zip");
    std::fs::write(&archive_path, "this is plain text, not a zip archive\n".repeat(64))
        .expect("Failed to write file");

    let result = probe(&archive_path);
    assert!(result.is_err());
}

#[test]
fn test_probe_info_serializes() {
    let temp_dir = setup_test_dir();
    let archive_path = temp_dir.path().join("test.zip");

    create_zip_archive(&archive_path, &[("a.txt", "alpha")]).expect("Failed to create ZIP");

    let info = probe(&archive_path).expect("Failed to probe archive");
    let json = serde_json::to_value(&info).expect("Failed to serialize");

    assert_eq!(json["entries"], 1);
    assert_eq!(json["entry_list"][0]["name"], "a.txt");
    assert_eq!(json["entry_list"][0]["size"], 5);
}
