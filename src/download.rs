use crate::constants::{EXPORT_FILE_EXTENSION, EXPORT_FILE_PREFIX};
use crate::errors::{AppError, AppResult};
use chrono::NaiveDate;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Persists an exported spreadsheet.
///
/// The browser only knows this one operation; how the bytes reach the user (a file in
/// a directory here) is up to the implementation.
pub trait FileDownloader: Send + Sync {
    /// Saves `bytes` under `filename` and returns where they ended up.
    fn save(&self, bytes: &[u8], filename: &str) -> AppResult<PathBuf>;
}

/// Name of the export file for a given local date: `subastas_boe_<YYYY-MM-DD>.xlsx`.
///
/// ```
/// use chrono::NaiveDate;
/// use subastas_cli::download::export_filename;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
/// assert_eq!(export_filename(date), "subastas_boe_2024-03-07.xlsx");
/// ```
pub fn export_filename(date: NaiveDate) -> String {
    format!(
        "{EXPORT_FILE_PREFIX}{}.{EXPORT_FILE_EXTENSION}",
        date.format("%Y-%m-%d")
    )
}

/// Writes exports into a directory.
///
/// # Behavior
///
/// - **Atomic saves**: bytes are staged in a temporary file inside the target directory
///   and renamed into place once fully written.
/// - **No leftovers**: the staging file is removed on every failure path (it is dropped
///   before being persisted), so repeated failed exports do not accumulate files.
/// - **Overwrite**: a second export on the same day replaces the earlier file.
#[derive(Debug, Clone)]
pub struct DirectoryDownloader {
    dir: PathBuf,
}

impl DirectoryDownloader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl FileDownloader for DirectoryDownloader {
    fn save(&self, bytes: &[u8], filename: &str) -> AppResult<PathBuf> {
        if filename.is_empty() || Path::new(filename).file_name().is_none() {
            return Err(AppError::InvalidInput(format!(
                "Invalid export filename: '{filename}'"
            )));
        }

        // Create directory if it doesn't exist
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|e| {
                AppError::Io(format!(
                    "Failed to create directory {}: {e}",
                    self.dir.display()
                ))
            })?;
        }

        let target = self.dir.join(filename);
        let mut staged = NamedTempFile::new_in(&self.dir).map_err(|e| {
            AppError::Io(format!(
                "Failed to create temp file in {}: {e}",
                self.dir.display()
            ))
        })?;
        debug!(temp_file = %staged.path().display(), "Staging export");

        staged
            .write_all(bytes)
            .and_then(|_| staged.flush())
            .map_err(|e| AppError::Io(format!("Failed to write export: {e}")))?;

        staged.persist(&target).map_err(|e| {
            AppError::Io(format!(
                "Failed to move export to {}: {}",
                target.display(),
                e.error
            ))
        })?;

        info!(
            file = %target.display(),
            bytes = bytes.len(),
            "Export saved"
        );
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn export_filename_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(export_filename(date), "subastas_boe_2024-03-07.xlsx");
    }

    #[test]
    fn save_writes_file_and_creates_directory() {
        let tmp = TempDir::new().unwrap();
        let downloader = DirectoryDownloader::new(tmp.path().join("exports"));

        let path = downloader.save(b"PK\x03\x04", "subastas_boe_2024-03-07.xlsx").unwrap();

        assert_eq!(path, tmp.path().join("exports/subastas_boe_2024-03-07.xlsx"));
        assert_eq!(std::fs::read(&path).unwrap(), b"PK\x03\x04");
    }

    #[test]
    fn repeated_saves_leave_a_single_file() {
        let tmp = TempDir::new().unwrap();
        let downloader = DirectoryDownloader::new(tmp.path());

        downloader.save(b"first", "export.xlsx").unwrap();
        downloader.save(b"second", "export.xlsx").unwrap();

        let entries: Vec<_> = std::fs::read_dir(tmp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(
            std::fs::read(tmp.path().join("export.xlsx")).unwrap(),
            b"second"
        );
    }

    #[test]
    fn failed_save_leaves_no_temp_file() {
        let tmp = TempDir::new().unwrap();
        // A directory squatting on the target name makes the final rename fail
        std::fs::create_dir(tmp.path().join("export.xlsx")).unwrap();
        std::fs::write(tmp.path().join("export.xlsx/keep"), b"x").unwrap();
        let downloader = DirectoryDownloader::new(tmp.path());

        let result = downloader.save(b"data", "export.xlsx");

        assert!(matches!(result, Err(AppError::Io(_))));
        let entries: Vec<_> = std::fs::read_dir(tmp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn empty_filename_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let downloader = DirectoryDownloader::new(tmp.path());
        assert!(matches!(
            downloader.save(b"data", ""),
            Err(AppError::InvalidInput(_))
        ));
    }
}
