// src/documents/mod.rs
//
// Document renderers for export requests, plus the media store the
// generated artifacts are written to.

pub mod pdf;
pub mod ppt;
pub mod schema;

use std::path::{Path, PathBuf};

/// Generated artifacts live under `<media_root>/<subdir>/` and are served
/// back to clients under `<media_url><subdir>/`.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    url_prefix: String,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        let mut url_prefix = url_prefix.into();
        if !url_prefix.ends_with('/') {
            url_prefix.push('/');
        }
        Self {
            root: root.into(),
            url_prefix,
        }
    }

    /// Writes the artifact to disk, creating the directory if absent, and
    /// returns its public URL.
    pub fn store(&self, subdir: &str, filename: &str, bytes: &[u8]) -> std::io::Result<String> {
        let dir = self.root.join(subdir);
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(filename);
        std::fs::write(&path, bytes)?;
        tracing::info!("wrote {} bytes to {}", bytes.len(), path.display());
        Ok(format!("{}{}/{}", self.url_prefix, subdir, filename))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Random 8-hex-char suffix keeps concurrent exports from colliding.
pub fn artifact_filename(prefix: &str, user_id: i32, extension: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}_{}.{}", prefix, user_id, &suffix[..8], extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_filename_shape() {
        let name = artifact_filename("pdf", 42, "pdf");
        assert!(name.starts_with("pdf_42_"));
        assert!(name.ends_with(".pdf"));

        let suffix = name
            .trim_start_matches("pdf_42_")
            .trim_end_matches(".pdf");
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_url_prefix_gets_trailing_slash() {
        let store = MediaStore::new("media", "/media");
        assert_eq!(store.url_prefix, "/media/");
    }
}
