//! Loading local files as inline attachments.

use std::path::Path;

use anyhow::{Context, Result};
use chota_core::Attachment;
use tracing::debug;

/// Read `path` and encode it as a data-URI attachment.
///
/// The MIME type is guessed from the extension, falling back to
/// `application/octet-stream`.
pub fn load_attachment(path: &Path) -> Result<Attachment> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    debug!(path = %path.display(), mime = %mime, bytes = bytes.len(), "attachment loaded");
    Ok(Attachment::from_bytes(&bytes, mime.essence_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guesses_mime_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cat.png");
        std::fs::write(&path, b"foo").unwrap();

        let att = load_attachment(&path).unwrap();
        assert_eq!(att.mime_type, "image/png");
        assert_eq!(att.payload().unwrap(), "Zm9v");
    }

    #[test]
    fn unknown_extension_is_octet_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.zzqx");
        std::fs::write(&path, b"\x00\x01").unwrap();

        let att = load_attachment(&path).unwrap();
        assert_eq!(att.mime_type, "application/octet-stream");
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_attachment(Path::new("/nonexistent/chota.png")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/chota.png"));
    }
}
