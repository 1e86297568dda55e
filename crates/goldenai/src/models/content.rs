use std::path::Path;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

use super::provider::ProviderKind;
use crate::document::{DocumentLoader, FsDocumentLoader, LoadedDocument};
use crate::errors::{LlmError, LlmResult};

const PDF_MIME_TYPE: &str = "application/pdf";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Image,
    Pdf,
}

/// A base64 encoded image or PDF, optionally pinned to the provider it was prepared for.
///
/// Deserialization runs the same checks as [`Content::from_document_bytes`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDocument")]
pub struct DocumentContent {
    kind: DocumentKind,
    mime_type: String,
    data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider: Option<ProviderKind>,
}

impl DocumentContent {
    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Base64 payload
    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn provider(&self) -> Option<ProviderKind> {
        self.provider
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    pub(crate) fn decoded(&self) -> Option<Vec<u8>> {
        BASE64.decode(&self.data).ok()
    }

    /// Fails unless this document can be encoded for `target`
    pub(crate) fn check_target(&self, target: ProviderKind) -> LlmResult<()> {
        if let Some(hint) = self.provider {
            if hint != target {
                return Err(LlmError::UnsupportedContentKind(format!(
                    "document prepared for {} cannot be sent to {}",
                    hint, target
                )));
            }
        }
        check_kind_for(self.kind, &self.mime_type, target)
    }
}

/// Serialized form of [`DocumentContent`], not yet validated
#[derive(Deserialize)]
struct RawDocument {
    kind: DocumentKind,
    mime_type: String,
    data: String,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    provider: Option<ProviderKind>,
}

impl TryFrom<RawDocument> for DocumentContent {
    type Error = LlmError;

    fn try_from(raw: RawDocument) -> LlmResult<Self> {
        let bytes = BASE64.decode(&raw.data).map_err(|e| {
            LlmError::UnsupportedContentKind(format!("document data is not base64: {}", e))
        })?;
        let content =
            Content::from_document_bytes(&bytes, &raw.mime_type, raw.filename, raw.provider)?;
        match content {
            Content::Document(document) if document.kind == raw.kind => Ok(document),
            _ => Err(LlmError::UnsupportedContentKind(format!(
                "document kind does not match mime type {}",
                raw.mime_type
            ))),
        }
    }
}

fn check_kind_for(kind: DocumentKind, mime_type: &str, target: ProviderKind) -> LlmResult<()> {
    match (target, kind) {
        (ProviderKind::Anthropic, _) => Ok(()),
        (ProviderKind::OpenAi, DocumentKind::Pdf) => Ok(()),
        (ProviderKind::OpenAi, DocumentKind::Image) => Err(LlmError::UnsupportedContentKind(
            format!("openai requests only accept PDF documents, got {}", mime_type),
        )),
        (ProviderKind::Ollama, _) => Err(LlmError::UnsupportedContentKind(
            "ollama requests take images through the request `image` option, not as content"
                .to_string(),
        )),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
/// Content passed to an LLM
pub enum Content {
    Text(TextContent),
    Document(DocumentContent),
}

impl Content {
    pub fn from_text<S: Into<String>>(text: S) -> Self {
        Content::Text(TextContent { text: text.into() })
    }

    /// Load a document from disk for the given provider family.
    ///
    /// `llm = None` builds a neutral document that any family able to encode its kind
    /// will accept. OpenAI only takes PDFs, and Ollama never takes document content.
    pub fn from_document<P: AsRef<Path>>(path: P, llm: Option<ProviderKind>) -> LlmResult<Self> {
        Self::from_document_with(&FsDocumentLoader, path, llm)
    }

    pub fn from_document_with<P: AsRef<Path>>(
        loader: &dyn DocumentLoader,
        path: P,
        llm: Option<ProviderKind>,
    ) -> LlmResult<Self> {
        let LoadedDocument {
            bytes,
            mime_type,
            filename,
        } = loader.read(path.as_ref())?;
        Self::from_document_bytes(&bytes, &mime_type, filename, llm)
    }

    pub fn from_document_bytes(
        bytes: &[u8],
        mime_type: &str,
        filename: Option<String>,
        llm: Option<ProviderKind>,
    ) -> LlmResult<Self> {
        let kind = if mime_type == PDF_MIME_TYPE {
            DocumentKind::Pdf
        } else if mime_type.starts_with("image/") {
            DocumentKind::Image
        } else {
            return Err(LlmError::UnsupportedContentKind(format!(
                "unsupported mime type {}",
                mime_type
            )));
        };

        if let Some(target) = llm {
            check_kind_for(kind, mime_type, target)?;
        }

        Ok(Content::Document(DocumentContent {
            kind,
            mime_type: mime_type.to_string(),
            data: BASE64.encode(bytes),
            filename,
            provider: llm,
        }))
    }

    /// Get the text content if this is a TextContent variant
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(text) => Some(&text.text),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&DocumentContent> {
        match self {
            Content::Document(document) => Some(document),
            _ => None,
        }
    }

    pub(crate) fn check_target(&self, target: ProviderKind) -> LlmResult<()> {
        match self {
            Content::Text(_) => Ok(()),
            Content::Document(document) => document.check_target(target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MockDocumentLoader;
    use mockall::predicate::*;
    use std::path::PathBuf;

    #[test]
    fn test_from_text() {
        let content = Content::from_text("Hello, Claude!");
        assert_eq!(content.as_text(), Some("Hello, Claude!"));
        assert!(content.as_document().is_none());
    }

    #[test]
    fn test_pdf_for_openai() {
        let content = Content::from_document_bytes(
            b"%PDF-1.7",
            "application/pdf",
            Some("invoice.pdf".to_string()),
            Some(ProviderKind::OpenAi),
        )
        .unwrap();

        let document = content.as_document().unwrap();
        assert_eq!(document.kind(), DocumentKind::Pdf);
        assert_eq!(document.data(), BASE64.encode(b"%PDF-1.7"));
        assert_eq!(document.filename(), Some("invoice.pdf"));
        assert_eq!(document.provider(), Some(ProviderKind::OpenAi));
        assert!(document
            .data_url()
            .starts_with("data:application/pdf;base64,"));
    }

    #[test]
    fn test_image_for_openai_is_rejected() {
        let err = Content::from_document_bytes(b"png", "image/png", None, Some(ProviderKind::OpenAi))
            .unwrap_err();
        assert!(matches!(err, LlmError::UnsupportedContentKind(_)));
    }

    #[test]
    fn test_any_document_for_ollama_is_rejected() {
        let err = Content::from_document_bytes(b"png", "image/png", None, Some(ProviderKind::Ollama))
            .unwrap_err();
        assert!(matches!(err, LlmError::UnsupportedContentKind(_)));
    }

    #[test]
    fn test_unknown_mime_is_rejected() {
        let err = Content::from_document_bytes(b"a,b", "text/csv", None, None).unwrap_err();
        assert!(matches!(err, LlmError::UnsupportedContentKind(_)));
    }

    #[test]
    fn test_hinted_document_is_not_reused_elsewhere() {
        let content = Content::from_document_bytes(
            b"%PDF",
            "application/pdf",
            None,
            Some(ProviderKind::Anthropic),
        )
        .unwrap();
        assert!(content.check_target(ProviderKind::Anthropic).is_ok());
        assert!(matches!(
            content.check_target(ProviderKind::OpenAi),
            Err(LlmError::UnsupportedContentKind(_))
        ));
    }

    #[test]
    fn test_neutral_image_only_fits_anthropic() {
        let content = Content::from_document_bytes(b"jpg", "image/jpeg", None, None).unwrap();
        assert!(content.check_target(ProviderKind::Anthropic).is_ok());
        assert!(content.check_target(ProviderKind::OpenAi).is_err());
        assert!(content.check_target(ProviderKind::Ollama).is_err());
    }

    #[test]
    fn test_deserialize_revalidates_documents() {
        let forged = serde_json::json!({
            "type": "document",
            "kind": "pdf",
            "mime_type": "image/png",
            "data": BASE64.encode(b"png"),
        });
        assert!(serde_json::from_value::<Content>(forged).is_err());

        let not_base64 = serde_json::json!({
            "type": "document",
            "kind": "pdf",
            "mime_type": "application/pdf",
            "data": "not base64!!",
        });
        assert!(serde_json::from_value::<Content>(not_base64).is_err());

        let image_for_openai = serde_json::json!({
            "type": "document",
            "kind": "image",
            "mime_type": "image/png",
            "data": BASE64.encode(b"png"),
            "provider": "openai",
        });
        assert!(serde_json::from_value::<Content>(image_for_openai).is_err());

        let pdf = Content::from_document_bytes(
            b"%PDF-1.7",
            "application/pdf",
            Some("invoice.pdf".to_string()),
            Some(ProviderKind::OpenAi),
        )
        .unwrap();
        let value = serde_json::to_value(&pdf).unwrap();
        assert_eq!(serde_json::from_value::<Content>(value).unwrap(), pdf);
    }

    #[test]
    fn test_from_document_with_loader() {
        let mut loader = MockDocumentLoader::new();
        loader
            .expect_read()
            .with(eq(PathBuf::from("white.jpg")))
            .times(1)
            .returning(|_| {
                Ok(LoadedDocument {
                    bytes: vec![0xff, 0xd8],
                    mime_type: "image/jpeg".to_string(),
                    filename: Some("white.jpg".to_string()),
                })
            });

        let content = Content::from_document_with(&loader, "white.jpg", None).unwrap();
        let document = content.as_document().unwrap();
        assert_eq!(document.kind(), DocumentKind::Image);
        assert_eq!(document.mime_type(), "image/jpeg");
        assert_eq!(document.decoded().unwrap(), vec![0xff, 0xd8]);
    }
}
