use thiserror::Error;
use url::Url;

//
// ─── RICH TEXT ─────────────────────────────────────────────────────────────────
//

/// Unvalidated rich-text body as it arrives from the editor surface.
///
/// The editor's internal document model is external to this crate; what we
/// store is the serialized body plus the public URLs of any embedded images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RichTextDraft {
    pub body: String,
    pub image_urls: Vec<String>,
}

/// Validated rich-text content ready for persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RichText {
    body: String,
    images: Vec<Url>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RichTextError {
    #[error("content body cannot be empty")]
    EmptyBody,

    #[error("embedded image URL is not a valid absolute URL: {0}")]
    InvalidImageUrl(String),
}

impl RichTextDraft {
    pub fn new(body: impl Into<String>, image_urls: Vec<String>) -> Self {
        Self {
            body: body.into(),
            image_urls,
        }
    }

    pub fn text_only(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            image_urls: Vec::new(),
        }
    }

    /// Validate the draft into persistable content.
    ///
    /// # Errors
    ///
    /// Returns `RichTextError::EmptyBody` when the body is blank, or
    /// `RichTextError::InvalidImageUrl` when an embedded image reference does
    /// not parse as an absolute URL.
    pub fn validate(self) -> Result<RichText, RichTextError> {
        if self.body.trim().is_empty() {
            return Err(RichTextError::EmptyBody);
        }

        let mut images = Vec::with_capacity(self.image_urls.len());
        for raw in self.image_urls {
            let parsed = Url::parse(&raw).map_err(|_| RichTextError::InvalidImageUrl(raw))?;
            images.push(parsed);
        }

        Ok(RichText {
            body: self.body,
            images,
        })
    }
}

impl RichText {
    /// Rebuild content from already-persisted values.
    ///
    /// # Errors
    ///
    /// Returns `RichTextError` if the stored values no longer validate.
    pub fn from_persisted(body: String, image_urls: Vec<String>) -> Result<Self, RichTextError> {
        RichTextDraft::new(body, image_urls).validate()
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn images(&self) -> &[Url] {
        &self.images
    }

    pub fn has_images(&self) -> bool {
        !self.images.is_empty()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
