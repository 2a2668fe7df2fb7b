//! Archive unpacking
//!
//! Turns an upload into a flat list of named byte blobs. A `.zip` upload is
//! expanded in memory and every contained file is yielded regardless of
//! nesting depth; anything else passes through as a single entry. Entries are
//! sorted lexicographically by name so downstream prompt assembly is
//! reproducible across runs.

use std::io::{Cursor, Read};

use tracing::debug;

use crate::types::{AppError, AppResult};

/// Maximum decompressed bytes accepted from a single archive entry
/// (zip-bomb protection).
pub const MAX_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

/// One file produced by unpacking an upload. Request-scoped; dropped as soon
/// as its summary has been taken.
#[derive(Debug, Clone)]
pub struct ExtractedEntry {
    pub name: String,
    pub bytes: Vec<u8>,
}

pub fn is_archive(name: &str) -> bool {
    name.to_lowercase().ends_with(".zip")
}

/// Expands an upload into its constituent entries.
///
/// A corrupt file behind a `.zip` name fails the whole request with
/// [`AppError::Archive`]; the extension is caller-controlled, so a mismatch
/// is a caller error rather than something to paper over.
pub fn unpack(name: &str, bytes: Vec<u8>) -> AppResult<Vec<ExtractedEntry>> {
    if !is_archive(name) {
        return Ok(vec![ExtractedEntry {
            name: name.to_string(),
            bytes,
        }]);
    }

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| AppError::Archive(format!("failed to open archive: {e}")))?;

    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let entry = archive
            .by_index(i)
            .map_err(|e| AppError::Archive(format!("failed to read archive entry: {e}")))?;
        if entry.is_dir() {
            continue;
        }

        // Directory structure is flattened: only the final path component
        // identifies the entry, matching how summaries are keyed.
        let raw_name = entry.name().to_string();
        let entry_name = raw_name
            .rsplit('/')
            .next()
            .unwrap_or(raw_name.as_str())
            .to_string();

        let mut data = Vec::new();
        entry
            .take(MAX_ENTRY_BYTES)
            .read_to_end(&mut data)
            .map_err(|e| AppError::Archive(format!("failed to read {raw_name}: {e}")))?;
        if data.len() as u64 >= MAX_ENTRY_BYTES {
            return Err(AppError::Archive(format!(
                "entry {raw_name} exceeds the {MAX_ENTRY_BYTES} byte limit"
            )));
        }

        entries.push(ExtractedEntry {
            name: entry_name,
            bytes: data,
        });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    debug!(count = entries.len(), archive = %name, "archive expanded");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn make_zip(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, bytes) in files {
            writer.start_file(*name, options).unwrap();
            writer.write_all(bytes).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn non_archive_passes_through() {
        let entries = unpack("data.csv", b"a,b\n1,2\n".to_vec()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "data.csv");
        assert_eq!(entries[0].bytes, b"a,b\n1,2\n");
    }

    #[test]
    fn no_upload_is_represented_by_the_caller_as_empty() {
        // unpack is only called when an upload exists; this documents the
        // single-entry contract for the smallest input.
        let entries = unpack("note.txt", Vec::new()).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].bytes.is_empty());
    }

    #[test]
    fn zip_expands_nested_files_and_sorts_by_name() {
        let bytes = make_zip(&[
            ("deep/dir/zeta.csv", b"x\n1\n"),
            ("alpha.csv", b"y\n2\n"),
            ("mid/beta.txt", b"hello"),
        ]);
        let entries = unpack("bundle.zip", bytes).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["alpha.csv", "beta.txt", "zeta.csv"]);
        assert_eq!(entries[2].bytes, b"x\n1\n");
    }

    #[test]
    fn zip_skips_directory_entries() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .add_directory("empty_dir", SimpleFileOptions::default())
            .unwrap();
        writer
            .start_file("data.csv", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"a\n1\n").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let entries = unpack("bundle.zip", bytes).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "data.csv");
    }

    #[test]
    fn corrupt_archive_is_a_request_level_error() {
        let err = unpack("broken.zip", b"this is not a zip".to_vec()).unwrap_err();
        assert!(matches!(err, AppError::Archive(_)));
        assert!(err.to_string().contains("failed to open archive"));
    }

    #[test]
    fn archive_extension_check_is_case_insensitive() {
        assert!(is_archive("DATA.ZIP"));
        assert!(is_archive("data.zip"));
        assert!(!is_archive("data.csv"));
        assert!(!is_archive("zipfile.txt"));
    }
}
