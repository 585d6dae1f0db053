//! Generated spreadsheet file held in memory

use std::path::Path;

use chrono::{DateTime, TimeZone};

use crate::error::Result;

/// MIME type of an `.xlsx` file
pub const MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Extension used for suggested file names
pub const FILE_EXTENSION: &str = "xlsx";

/// Complete `.xlsx` bytes produced by one successful execution
#[derive(Clone, PartialEq, Eq)]
pub struct Artifact {
    bytes: Vec<u8>,
}

impl Artifact {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn mime_type(&self) -> &'static str {
        MIME_TYPE
    }

    /// `<prefix>_<HHMMSS>.xlsx`, so repeated downloads do not overwrite each other
    pub fn suggested_file_name<Tz: TimeZone>(prefix: &str, at: &DateTime<Tz>) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        format!("{}_{}.{}", prefix, at.format("%H%M%S"), FILE_EXTENSION)
    }

    /// Write the bytes to disk
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }
}

impl std::fmt::Debug for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Artifact").field("len", &self.bytes.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    #[test]
    fn test_suggested_file_name() {
        let at = Utc.with_ymd_and_hms(2025, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(Artifact::suggested_file_name("excel_gen", &at), "excel_gen_140507.xlsx");
    }

    #[test]
    fn test_write_to_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out").join("sheet.xlsx");
        let artifact = Artifact::new(b"PK\x03\x04".to_vec());

        artifact.write_to(&path).unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"PK\x03\x04");
    }

    #[test]
    fn test_accessors() {
        let artifact = Artifact::new(vec![1, 2, 3]);
        assert_eq!(artifact.len(), 3);
        assert!(!artifact.is_empty());
        assert_eq!(artifact.mime_type(), MIME_TYPE);
        assert_eq!(format!("{:?}", artifact), "Artifact { len: 3 }");
        assert_eq!(artifact.into_bytes(), vec![1, 2, 3]);
    }
}
