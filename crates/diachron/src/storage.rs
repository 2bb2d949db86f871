//! .dcor binary file format reader/writer for corpus containers.

use std::io::{Read, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::container::Container;
use crate::types::{CorpusError, CorpusResult};

/// Magic bytes: "DCOR"
const DCOR_MAGIC: u32 = 0x44434F52;

/// Current format version.
const FORMAT_VERSION: u16 = 1;

/// Header size in bytes.
const HEADER_SIZE: usize = 32;

/// Writer for .dcor files.
pub struct CorpusWriter;

/// Reader for .dcor files.
pub struct CorpusReader;

impl CorpusWriter {
    /// Write a container to a file.
    pub fn write_to_file<T: Serialize>(container: &Container<T>, path: &Path) -> CorpusResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = std::fs::File::create(path)?;
        Self::write_to(container, &mut file)
    }

    /// Write a container to any writer.
    pub fn write_to<T: Serialize, W: Write>(
        container: &Container<T>,
        writer: &mut W,
    ) -> CorpusResult<()> {
        let payload = serde_json::to_vec(container)
            .map_err(|e| CorpusError::Storage(format!("Serialization failed: {e}")))?;

        let mut header = [0u8; HEADER_SIZE];
        write_u32(&mut header[0..4], DCOR_MAGIC);
        write_u16(&mut header[4..6], FORMAT_VERSION);
        write_u16(&mut header[6..8], 0); // flags
        write_u64(&mut header[8..16], payload.len() as u64);

        writer.write_all(&header)?;
        writer.write_all(&payload)?;

        tracing::debug!(bytes = payload.len(), "container written");
        Ok(())
    }
}

impl CorpusReader {
    /// Read a container from a file.
    pub fn read_from_file<T: DeserializeOwned>(path: &Path) -> CorpusResult<Container<T>> {
        let mut file = std::fs::File::open(path)?;
        Self::read_from(&mut file)
    }

    /// Read a container from any reader.
    pub fn read_from<T: DeserializeOwned, R: Read>(reader: &mut R) -> CorpusResult<Container<T>> {
        let mut header = [0u8; HEADER_SIZE];
        reader.read_exact(&mut header)?;

        let magic = read_u32(&header[0..4]);
        if magic != DCOR_MAGIC {
            return Err(CorpusError::Storage(format!(
                "Invalid magic: expected 0x{DCOR_MAGIC:08X}, got 0x{magic:08X}"
            )));
        }

        let version = read_u16(&header[4..6]);
        if version != FORMAT_VERSION {
            return Err(CorpusError::Storage(format!(
                "Unsupported version: {version}"
            )));
        }

        let payload_len = read_u64(&header[8..16]) as usize;
        let mut payload = vec![0u8; payload_len];
        reader.read_exact(&mut payload)?;

        serde_json::from_slice(&payload)
            .map_err(|e| CorpusError::Storage(format!("Deserialization failed: {e}")))
    }
}

// Little-endian byte helpers
fn write_u16(buf: &mut [u8], val: u16) {
    buf[..2].copy_from_slice(&val.to_le_bytes());
}
fn write_u32(buf: &mut [u8], val: u32) {
    buf[..4].copy_from_slice(&val.to_le_bytes());
}
fn write_u64(buf: &mut [u8], val: u64) {
    buf[..8].copy_from_slice(&val.to_le_bytes());
}
fn read_u16(buf: &[u8]) -> u16 {
    u16::from_le_bytes([buf[0], buf[1]])
}
fn read_u32(buf: &[u8]) -> u32 {
    u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]])
}
fn read_u64(buf: &[u8]) -> u64 {
    u64::from_le_bytes([buf[0], buf[1], buf[2], buf[3], buf[4], buf[5], buf[6], buf[7]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Corpus;
    use crate::diachronic::DiachronicCorpus;
    use crate::embeddings::{Embeddings, Vocabulary};
    use ndarray::array;

    fn embedded_corpus(name: &str, beginning: i32, end: i32) -> Container<Embeddings> {
        let space = Embeddings::new(
            Vocabulary::new(vec!["cat", "dog"]).unwrap(),
            array![[0.25, -1.5], [3.0, 0.125]],
        )
        .unwrap();

        Corpus::new(space)
            .with_name(name)
            .with_lang("en")
            .with_period(beginning, end)
            .unwrap()
            .into()
    }

    #[test]
    fn test_roundtrip_leaf() {
        let container = embedded_corpus("coha", 1810, 1860);

        let mut buf = Vec::new();
        CorpusWriter::write_to(&container, &mut buf).unwrap();
        let loaded: Container<Embeddings> = CorpusReader::read_from(&mut &buf[..]).unwrap();

        assert_eq!(loaded, container);

        // the payload restores more than the equality rule checks
        let leaf = loaded.as_synchronic().unwrap();
        assert_eq!(leaf.name.as_deref(), Some("coha"));
        assert_eq!(leaf.lang.as_deref(), Some("en"));
        assert!(leaf.content_eq(container.as_synchronic().unwrap()));
    }

    #[test]
    fn test_roundtrip_composite() {
        let composite = DiachronicCorpus::from_corpora(vec![
            embedded_corpus("a", 1800, 1850),
            embedded_corpus("b", 1850, 1900),
        ])
        .unwrap()
        .with_name("coha-by-period");
        let container: Container<Embeddings> = composite.into();

        let mut buf = Vec::new();
        CorpusWriter::write_to(&container, &mut buf).unwrap();
        let loaded: Container<Embeddings> = CorpusReader::read_from(&mut &buf[..]).unwrap();

        assert_eq!(loaded, container);
        let composite = loaded.as_diachronic().unwrap();
        assert_eq!(composite.periods(), &[(1800, 1850), (1850, 1900)]);
        assert_eq!(composite.period().bounds(), Some((1800, 1900)));
    }

    #[test]
    fn test_invalid_magic() {
        let buf = [0u8; HEADER_SIZE + 10];
        let result = CorpusReader::read_from::<Embeddings, _>(&mut &buf[..]);
        assert!(matches!(result, Err(CorpusError::Storage(_))));
    }

    #[test]
    fn test_unsupported_version() {
        let container = embedded_corpus("coha", 1810, 1860);
        let mut buf = Vec::new();
        CorpusWriter::write_to(&container, &mut buf).unwrap();
        buf[4] = 0xFF;

        let result = CorpusReader::read_from::<Embeddings, _>(&mut &buf[..]);
        assert!(matches!(result, Err(CorpusError::Storage(_))));
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.dcor");

        let container = embedded_corpus("coha", 1810, 1860);
        CorpusWriter::write_to_file(&container, &path).unwrap();
        let loaded: Container<Embeddings> = CorpusReader::read_from_file(&path).unwrap();

        assert_eq!(loaded, container);
    }
}
