//! Upload validation and the on-disk lifetime of an uploaded résumé.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use bytes::Bytes;
use regex::Regex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::AppError;

const ALLOWED_EXTENSIONS: &[&str] = &["pdf"];
const FALLBACK_FILENAME: &str = "resume.pdf";

static UNSAFE_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("filename pattern is valid"));

/// A received file part: declared filename plus raw bytes.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub bytes: Bytes,
}

/// True when the text after the last '.' is an allowed extension
/// (case-insensitive). Names without a '.' are rejected.
pub fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| {
            let ext = ext.to_lowercase();
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Reduces a client-supplied filename to a safe single path component.
///
/// Path separators become whitespace, whitespace runs become `_`, anything
/// outside `[A-Za-z0-9_.-]` is dropped and leading/trailing `.` or `_` are
/// trimmed. Returns `resume.pdf` when nothing survives.
pub fn secure_filename(filename: &str) -> String {
    let spaced: String = filename
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let stripped = UNSAFE_CHARS_RE.replace_all(&joined, "");
    let trimmed = stripped.trim_matches(|c| c == '.' || c == '_');

    if trimmed.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// A saved upload. The file is removed by `cleanup`, or on drop if the
/// request unwinds before reaching it.
#[derive(Debug)]
pub struct SavedUpload {
    path: PathBuf,
    removed: bool,
}

impl SavedUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn cleanup(mut self) {
        self.removed = true;
        let result = tokio::fs::remove_file(&self.path).await;
        log_removal(&self.path, result);
    }
}

impl Drop for SavedUpload {
    fn drop(&mut self) {
        if !self.removed {
            self.removed = true;
            log_removal(&self.path, std::fs::remove_file(&self.path));
        }
    }
}

fn log_removal(path: &Path, result: std::io::Result<()>) {
    match result {
        Ok(()) => info!("Deleted file: {}", path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("Upload already gone: {}", path.display())
        }
        Err(e) => warn!("Failed to delete {}: {e}", path.display()),
    }
}

/// Writes the upload into `dir` under a per-request unique name
/// (`<uuid>-<sanitized filename>`).
pub async fn save_upload(dir: &Path, upload: &Upload) -> Result<SavedUpload, AppError> {
    let filename = format!("{}-{}", Uuid::new_v4(), secure_filename(&upload.filename));
    let path = dir.join(filename);

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| AppError::Upload(e.to_string()))?;

    // Guard first so a partial write is removed too.
    let saved = SavedUpload {
        path,
        removed: false,
    };
    info!("Saving file to: {}", saved.path.display());
    tokio::fs::write(&saved.path, &upload.bytes)
        .await
        .map_err(|e| AppError::Upload(e.to_string()))?;

    info!(
        "Saved uploaded file: {} ({} bytes)",
        upload.filename,
        upload.bytes.len()
    );
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_file_accepts_pdf_any_case() {
        assert!(allowed_file("resume.pdf"));
        assert!(allowed_file("resume.PDF"));
        assert!(allowed_file("resume.Pdf"));
        assert!(allowed_file("my.final.resume.pdf"));
    }

    #[test]
    fn test_allowed_file_rejects_other_extensions() {
        assert!(!allowed_file("resume.docx"));
        assert!(!allowed_file("resume.pdf.exe"));
        assert!(!allowed_file("resume.pdfx"));
        assert!(!allowed_file("resume."));
    }

    #[test]
    fn test_allowed_file_rejects_names_without_dot() {
        assert!(!allowed_file("resume"));
        assert!(!allowed_file("pdf"));
        assert!(!allowed_file(""));
    }

    #[test]
    fn test_secure_filename_strips_paths() {
        assert_eq!(secure_filename("../../etc/passwd.pdf"), "etc_passwd.pdf");
        assert_eq!(secure_filename("C:\\Users\\me\\cv.pdf"), "C_Users_me_cv.pdf");
    }

    #[test]
    fn test_secure_filename_whitespace_and_symbols() {
        assert_eq!(secure_filename("My Resume (2024).pdf"), "My_Resume_2024.pdf");
        assert_eq!(secure_filename("  résumé final.pdf "), "rsum_final.pdf");
    }

    #[test]
    fn test_secure_filename_fallback_when_empty() {
        assert_eq!(secure_filename("..."), "resume.pdf");
        assert_eq!(secure_filename("ñññ"), "resume.pdf");
    }

    #[tokio::test]
    async fn test_save_upload_writes_unique_files_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let upload = Upload {
            filename: "cv.pdf".to_string(),
            bytes: Bytes::from_static(b"%PDF-1.4"),
        };

        let first = save_upload(dir.path(), &upload).await.unwrap();
        let second = save_upload(dir.path(), &upload).await.unwrap();
        assert_ne!(first.path(), second.path());
        assert!(first.path().exists());
        assert_eq!(std::fs::read(first.path()).unwrap(), b"%PDF-1.4");
        assert!(first
            .path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .ends_with("-cv.pdf"));

        let first_path = first.path().to_path_buf();
        first.cleanup().await;
        assert!(!first_path.exists());

        let second_path = second.path().to_path_buf();
        drop(second);
        assert!(!second_path.exists());
    }

    #[tokio::test]
    async fn test_save_upload_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("uploads");
        let upload = Upload {
            filename: "cv.pdf".to_string(),
            bytes: Bytes::from_static(b"data"),
        };
        let saved = save_upload(&nested, &upload).await.unwrap();
        assert!(saved.path().starts_with(&nested));
        saved.cleanup().await;
        assert_eq!(std::fs::read_dir(&nested).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_cleanup_tolerates_file_removed_elsewhere() {
        let dir = tempfile::tempdir().unwrap();
        let upload = Upload {
            filename: "cv.pdf".to_string(),
            bytes: Bytes::from_static(b"data"),
        };
        let saved = save_upload(dir.path(), &upload).await.unwrap();
        std::fs::remove_file(saved.path()).unwrap();

        saved.cleanup().await;
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
