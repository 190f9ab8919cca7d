//! Zip packaging of directory subtrees for bulk download.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use uuid::Uuid;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use cloudstore_core::result::AppResult;

/// A collision-free archive file name, e.g.
/// `download-20240101-120000123456-<hex>.zip`.
pub fn artifact_name() -> String {
    format!(
        "download-{}-{}.zip",
        Utc::now().format("%Y%m%d-%H%M%S%6f"),
        Uuid::new_v4().simple()
    )
}

/// Write every entry under `source` into a new zip file at `dest`.
///
/// Entry names are relative to `source`. Blocking; run it off the async
/// runtime. Returns the number of files written.
pub fn zip_directory(source: &Path, dest: &Path) -> AppResult<u64> {
    let file = File::create(dest)?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut files = 0u64;
    let mut pending: Vec<PathBuf> = vec![source.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let mut entries = fs::read_dir(&dir)?.collect::<Result<Vec<_>, io::Error>>()?;
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let path = entry.path();
            let name = entry_name(source, &path);
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                writer.add_directory(format!("{name}/"), options)?;
                pending.push(path);
            } else if file_type.is_file() {
                writer.start_file(name, options)?;
                let mut input = File::open(&path)?;
                io::copy(&mut input, &mut writer)?;
                files += 1;
            }
        }
    }

    writer.finish()?;
    Ok(files)
}

fn entry_name(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
