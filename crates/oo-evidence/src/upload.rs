//! Uploaded file payloads

use bytes::Bytes;
use oo_contracts::files::{extension_of, UploadedFile};

/// A file received from a client, held in memory until stored
#[derive(Debug, Clone)]
pub struct EvidenceUpload {
    pub original_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl EvidenceUpload {
    pub fn new(original_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            original_name: original_name.into(),
            content_type: None,
            data: data.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Lowercased client extension, `bin` when the name has none
    pub fn extension(&self) -> String {
        extension_of(&self.original_name).unwrap_or_else(|| "bin".to_string())
    }
}

impl UploadedFile for EvidenceUpload {
    fn original_name(&self) -> &str {
        &self.original_name
    }

    fn size(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension() {
        assert_eq!(EvidenceUpload::new("Photo.JPG", "x").extension(), "jpg");
        assert_eq!(EvidenceUpload::new("README", "x").extension(), "bin");
    }

    #[test]
    fn test_size_reports_payload_length() {
        let upload = EvidenceUpload::new("a.png", vec![0u8; 42]);
        assert_eq!(upload.size(), 42);
    }
}
