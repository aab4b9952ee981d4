//! Raw files attached to content nodes.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// How the platform should treat an attached file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilePreset {
    /// PDF document
    Document,

    /// Zipped interactive package
    H5p,

    /// Playable video
    Video,
}

impl std::fmt::Display for FilePreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilePreset::Document => write!(f, "document"),
            FilePreset::H5p => write!(f, "h5p"),
            FilePreset::Video => write!(f, "video"),
        }
    }
}

/// A file on disk plus the metadata the uploader needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeFile {
    pub preset: FilePreset,

    /// Location on disk
    pub path: PathBuf,

    pub language: String,

    /// SHA256 of the file contents (hex)
    pub checksum: String,

    /// Size in bytes
    pub size: u64,
}

impl NodeFile {
    /// Describe a file, hashing its contents
    pub fn from_path(preset: FilePreset, path: impl Into<PathBuf>, language: &str) -> io::Result<Self> {
        let path = path.into();
        let (checksum, size) = hash_file(&path)?;
        Ok(Self {
            preset,
            path,
            language: language.to_string(),
            checksum,
            size,
        })
    }
}

/// Stream a file through SHA256, returning (hex digest, byte count)
pub fn hash_file(path: &Path) -> io::Result<(String, u64)> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    let mut size = 0u64;

    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        size += n as u64;
    }

    Ok((hex::encode(hasher.finalize()), size))
}

/// Namespace for ids minted under a source domain
pub fn domain_namespace(source_domain: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_DNS, source_domain.as_bytes())
}

/// Stable content id for a source id within a domain namespace
pub fn content_id(namespace: &Uuid, source_id: &str) -> Uuid {
    Uuid::new_v5(namespace, source_id.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_hash_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("guia.pdf");
        std::fs::write(&path, b"hello").unwrap();

        let (checksum, size) = hash_file(&path).unwrap();
        assert_eq!(size, 5);
        assert_eq!(
            checksum,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_node_file_from_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Guia.PDF");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        let file = NodeFile::from_path(FilePreset::Document, &path, "es").unwrap();
        assert_eq!(file.size, 8);
        assert_eq!(file.language, "es");
        assert_eq!(file.checksum.len(), 64);
    }

    #[test]
    fn test_missing_file_is_error() {
        let result = NodeFile::from_path(FilePreset::Video, "/nonexistent/clip.mp4", "es");
        assert!(result.is_err());
    }

    #[test]
    fn test_content_id_is_stable() {
        let ns = domain_namespace("www.aiep.cl");
        let a = content_id(&ns, "Unidad 1/guia.pdf");
        let b = content_id(&ns, "Unidad 1/guia.pdf");
        let c = content_id(&ns, "Unidad 2/guia.pdf");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(ns, domain_namespace("example.org"));
    }
}
