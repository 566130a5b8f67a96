//! Document resolver over HTTP object storage.
//!
//! Documents uploaded by the frontend carry a `storagePath` inside a bucket;
//! older records only carry a download `url`, which must point at the
//! storage host. Either way the bytes are downloaded and sent inline to the
//! model.

use base64::prelude::*;
use futures_util::StreamExt;
use futures_util::future::try_join_all;
use reqwest::Url;

use emissary_core::document::DocumentResolver;
use emissary_types::config::StorageSettings;
use emissary_types::content::{Blob, ContentPart, ContentUnit, Role};
use emissary_types::document::{DEFAULT_MIME_TYPE, DocumentRef, is_text_mime};
use emissary_types::error::DocumentError;

/// Downloads document bytes and turns each document into one user unit.
#[derive(Debug, Clone)]
pub struct StorageDocumentResolver {
    client: reqwest::Client,
    base_url: String,
    max_document_bytes: u64,
}

impl StorageDocumentResolver {
    pub fn new(settings: &StorageSettings) -> Self {
        Self::with_client(reqwest::Client::new(), settings)
    }

    pub fn with_client(client: reqwest::Client, settings: &StorageSettings) -> Self {
        Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            max_document_bytes: settings.max_document_bytes,
        }
    }

    /// Where to download `doc` from.
    ///
    /// A storage path wins over the document's own url; the path is sent as a
    /// single percent-encoded object name. A plain url must share the storage
    /// base url's origin.
    pub fn download_url(&self, doc: &DocumentRef, bucket: &str) -> Result<Url, DocumentError> {
        let fetch_error = |message: String| DocumentError::Fetch {
            name: doc.name.clone(),
            message,
        };
        let base = Url::parse(&self.base_url)
            .map_err(|e| fetch_error(format!("invalid storage base url: {e}")))?;

        match doc.storage_path.as_deref().filter(|p| !p.is_empty()) {
            Some(path) => {
                let mut url = base;
                url.path_segments_mut()
                    .map_err(|()| fetch_error("storage base url cannot be a base".to_string()))?
                    .pop_if_empty()
                    .extend(["v0", "b", bucket, "o", path]);
                url.query_pairs_mut().append_pair("alt", "media");
                Ok(url)
            }
            None if !doc.url.is_empty() => {
                let url =
                    Url::parse(&doc.url).map_err(|e| fetch_error(format!("invalid url: {e}")))?;
                if url.origin() != base.origin() {
                    return Err(DocumentError::DisallowedUrl {
                        name: doc.name.clone(),
                        url: doc.url.clone(),
                    });
                }
                Ok(url)
            }
            None => Err(DocumentError::MissingLocation {
                name: doc.name.clone(),
            }),
        }
    }

    async fn fetch(&self, doc: &DocumentRef, bucket: &str) -> Result<ContentUnit, DocumentError> {
        let url = self.download_url(doc, bucket)?;
        let fetch_error = |message: String| DocumentError::Fetch {
            name: doc.name.clone(),
            message,
        };

        tracing::debug!(document = %doc.name, "Downloading document");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DocumentError::NotFound {
                name: doc.name.clone(),
            });
        }
        if !status.is_success() {
            return Err(fetch_error(format!("HTTP {}", status.as_u16())));
        }

        if let Some(size) = response.content_length() {
            self.check_size(doc, size)?;
        }

        let mime_type = match doc.mime_type() {
            DEFAULT_MIME_TYPE => response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .unwrap_or(DEFAULT_MIME_TYPE)
                .to_string(),
            known => known.to_string(),
        };

        // The declared length may be missing or wrong, so count what arrives.
        let mut body = response.bytes_stream();
        let mut bytes = Vec::new();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| fetch_error(e.to_string()))?;
            self.check_size(doc, (bytes.len() + chunk.len()) as u64)?;
            bytes.extend_from_slice(&chunk);
        }

        tracing::debug!(
            document = %doc.name,
            mime_type = %mime_type,
            bytes = bytes.len(),
            "Document downloaded"
        );

        let file_part = if is_text_mime(&mime_type) {
            ContentPart::Text(String::from_utf8_lossy(&bytes).into_owned())
        } else {
            ContentPart::InlineData(Blob {
                mime_type: mime_type.clone(),
                data: BASE64_STANDARD.encode(&bytes),
            })
        };

        Ok(ContentUnit {
            role: Role::User,
            parts: vec![
                file_part,
                ContentPart::Text(format!(
                    "You have been given the ability to work with file {} with mime_type {}",
                    doc.name, mime_type
                )),
            ],
        })
    }

    fn check_size(&self, doc: &DocumentRef, size: u64) -> Result<(), DocumentError> {
        if size > self.max_document_bytes {
            return Err(DocumentError::TooLarge {
                name: doc.name.clone(),
                size,
                limit: self.max_document_bytes,
            });
        }
        Ok(())
    }
}

impl DocumentResolver for StorageDocumentResolver {
    async fn resolve(
        &self,
        documents: &[DocumentRef],
        storage: &str,
    ) -> Result<Vec<ContentUnit>, DocumentError> {
        // try_join_all keeps input order and fails on the first error.
        try_join_all(documents.iter().map(|doc| self.fetch(doc, storage))).await
    }
}
