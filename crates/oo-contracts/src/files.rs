//! Upload rules shared by evidence and visitor images

use oo_core::error::ValidationErrors;
use std::path::Path;

/// What a contract needs to know about an uploaded file
pub trait UploadedFile {
    /// Client-side file name
    fn original_name(&self) -> &str;
    /// Size in bytes
    fn size(&self) -> usize;
}

/// Lowercased extension of a client file name
pub fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Size and type limits for one kind of upload
#[derive(Debug, Clone)]
pub struct FileRules {
    pub max_size: usize,
    pub allowed_extensions: Vec<String>,
}

impl FileRules {
    pub fn new(max_size: usize, allowed_extensions: &[String]) -> Self {
        Self {
            max_size,
            allowed_extensions: allowed_extensions
                .iter()
                .map(|ext| ext.to_ascii_lowercase())
                .collect(),
        }
    }

    /// Records every violation of `file` under `field`
    pub fn check(&self, field: &str, file: &dyn UploadedFile, errors: &mut ValidationErrors) {
        if file.size() == 0 {
            errors.add(field, format!("{} is empty", file.original_name()));
        }
        if file.size() > self.max_size {
            errors.add(
                field,
                format!(
                    "{} must be at most {} KB",
                    file.original_name(),
                    self.max_size / 1024
                ),
            );
        }
        match extension_of(file.original_name()) {
            Some(ext) if self.allowed_extensions.contains(&ext) => {}
            _ => errors.add(
                field,
                format!(
                    "{} must be a file of type: {}",
                    file.original_name(),
                    self.allowed_extensions.join(", ")
                ),
            ),
        }
    }
}
