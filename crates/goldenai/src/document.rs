use std::path::Path;

#[cfg(test)]
use mockall::automock;

use crate::errors::{LlmError, LlmResult};

/// Raw bytes of a document together with what we know about them
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDocument {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub filename: Option<String>,
}

/// Source of document payloads referenced by path
#[cfg_attr(test, automock)]
pub trait DocumentLoader: Send + Sync {
    fn read(&self, path: &Path) -> LlmResult<LoadedDocument>;
}

/// Reads documents from the local filesystem, inferring the mime type from the extension
#[derive(Debug, Default, Clone, Copy)]
pub struct FsDocumentLoader;

impl DocumentLoader for FsDocumentLoader {
    fn read(&self, path: &Path) -> LlmResult<LoadedDocument> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .unwrap_or_default();

        let mime_type = mime_type_for_extension(&extension).ok_or_else(|| {
            LlmError::UnsupportedContentKind(format!(
                "unsupported file type '.{}' for {}",
                extension,
                path.display()
            ))
        })?;

        let bytes = std::fs::read(path).map_err(|source| LlmError::Document {
            path: path.display().to_string(),
            source,
        })?;

        tracing::debug!(path = %path.display(), mime_type, size = bytes.len(), "loaded document");

        Ok(LoadedDocument {
            bytes,
            mime_type: mime_type.to_string(),
            filename: path
                .file_name()
                .and_then(|name| name.to_str())
                .map(String::from),
        })
    }
}

pub fn mime_type_for_extension(extension: &str) -> Option<&'static str> {
    let mime_type = match extension {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "tiff" | "tif" => "image/tiff",
        "heic" | "heif" => "image/heic",
        "pdf" => "application/pdf",
        _ => return None,
    };
    Some(mime_type)
}
