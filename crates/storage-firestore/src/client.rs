//! Firestore REST client implementing the core document store.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::{Map, Value};

use reliefmap_core::errors::Result;
use reliefmap_core::store::{CollectionPath, Document, DocumentPath, DocumentStore};

use crate::errors::{IntoCoreResult, Operation, StorageError};
use crate::fields::{decode_fields, encode_fields};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Public endpoint of the Firestore REST v1 API.
pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Page size for collection listings.
const LIST_PAGE_SIZE: u32 = 300;

/// Supplies the OAuth bearer token attached to every request.
///
/// The signed-in user's token comes from the platform sign-in flow and
/// is refreshed outside this crate, so the client asks for it per
/// request rather than holding a copy.
#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    async fn access_token(&self) -> std::result::Result<String, StorageError>;
}

/// Token source with a fixed token, for tooling and tests.
pub struct StaticTokenSource {
    token: String,
}

impl StaticTokenSource {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl AccessTokenSource for StaticTokenSource {
    async fn access_token(&self) -> std::result::Result<String, StorageError> {
        Ok(self.token.clone())
    }
}

/// Client for one Firestore database, addressing documents relative to
/// its `documents` root.
pub struct FirestoreDocumentStore {
    client: reqwest::Client,
    base_url: String,
    documents_root: String,
    token_source: Box<dyn AccessTokenSource>,
}

impl FirestoreDocumentStore {
    /// Creates a client for the default database of `project_id`.
    ///
    /// `base_url` is [`DEFAULT_BASE_URL`] in production; tests point it
    /// at an emulator.
    pub fn new(
        base_url: &str,
        project_id: &str,
        token_source: impl AccessTokenSource + 'static,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            documents_root: format!("projects/{project_id}/databases/(default)/documents"),
            token_source: Box::new(token_source),
        }
    }

    /// Create headers for an API request.
    async fn headers(&self) -> std::result::Result<HeaderMap, StorageError> {
        let token = self.token_source.access_token().await?;
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let auth_value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| StorageError::api(401, "Invalid access token format"))?;
        headers.insert(AUTHORIZATION, auth_value);
        Ok(headers)
    }

    /// Parse a JSON response body.
    async fn parse_response(
        response: reqwest::Response,
    ) -> std::result::Result<Value, StorageError> {
        let status = response.status();
        let body = response.text().await?;
        debug!("Firestore response ({status}): {body}");

        if !status.is_success() {
            // Error payloads look like {"error": {"code": .., "message": ..}}.
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|parsed| {
                    parsed
                        .pointer("/error/message")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
                .unwrap_or(body);
            return Err(StorageError::api(status.as_u16(), message));
        }

        Ok(serde_json::from_str(&body)?)
    }

    fn document_url(&self, path: &DocumentPath) -> String {
        format!(
            "{}/{}/{}/{}",
            self.base_url,
            self.documents_root,
            path.collection().as_str(),
            urlencoding::encode(path.id())
        )
    }

    fn collection_url(&self, collection: &CollectionPath) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            self.documents_root,
            collection.as_str()
        )
    }

    async fn get_document(&self, path: &DocumentPath) -> std::result::Result<Document, StorageError> {
        let response = self
            .client
            .get(self.document_url(path))
            .headers(self.headers().await?)
            .send()
            .await?;
        let body = Self::parse_response(response).await?;
        decode_document_fields(&body)
    }

    async fn patch_document(
        &self,
        path: &DocumentPath,
        fields: Document,
        mask: Option<Vec<(&'static str, String)>>,
    ) -> std::result::Result<(), StorageError> {
        let body = serde_json::json!({"fields": encode_fields(&fields)?});
        let mut request = self
            .client
            .patch(self.document_url(path))
            .headers(self.headers().await?)
            .json(&body);
        if let Some(mask) = mask {
            request = request.query(&mask);
        }
        let response = request.send().await?;
        Self::parse_response(response).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FirestoreDocumentStore {
    async fn get(&self, path: &DocumentPath) -> Result<Document> {
        self.get_document(path).await.into_core(Operation::Read)
    }

    async fn set(&self, path: &DocumentPath, fields: Document) -> Result<()> {
        // A patch with no field mask replaces the whole document.
        self.patch_document(path, fields, None)
            .await
            .into_core(Operation::Write)
    }

    async fn merge(&self, path: &DocumentPath, fields: Document) -> Result<()> {
        let mask = fields
            .keys()
            .map(|name| ("updateMask.fieldPaths", mask_field_path(name)))
            .collect();
        self.patch_document(path, fields, Some(mask))
            .await
            .into_core(Operation::Write)
    }

    async fn add(&self, collection: &CollectionPath, fields: Document) -> Result<String> {
        let run = async {
            let body = serde_json::json!({"fields": encode_fields(&fields)?});
            let response = self
                .client
                .post(self.collection_url(collection))
                .headers(self.headers().await?)
                .json(&body)
                .send()
                .await?;
            let created = Self::parse_response(response).await?;
            // The response's `name` is the new document's full resource
            // path; its last segment is the generated id.
            created
                .get("name")
                .and_then(Value::as_str)
                .and_then(|name| name.rsplit('/').next())
                .map(str::to_string)
                .ok_or_else(|| {
                    StorageError::Value("created document has no resource name".to_string())
                })
        };
        run.await.into_core(Operation::Write)
    }

    async fn delete(&self, path: &DocumentPath) -> Result<()> {
        let run = async {
            let response = self
                .client
                .delete(self.document_url(path))
                .headers(self.headers().await?)
                .send()
                .await?;
            // Deleting an absent document returns success with an empty
            // body, matching the trait's idempotent contract.
            Self::parse_response(response).await?;
            Ok(())
        };
        run.await.into_core(Operation::Delete)
    }

    async fn list(&self, collection: &CollectionPath) -> Result<Vec<(String, Document)>> {
        let run = async {
            let mut documents = Vec::new();
            let mut page_token: Option<String> = None;
            loop {
                let mut query = vec![("pageSize", LIST_PAGE_SIZE.to_string())];
                if let Some(token) = &page_token {
                    query.push(("pageToken", token.clone()));
                }
                let response = self
                    .client
                    .get(self.collection_url(collection))
                    .headers(self.headers().await?)
                    .query(&query)
                    .send()
                    .await?;
                let body = Self::parse_response(response).await?;
                for entry in body
                    .get("documents")
                    .and_then(Value::as_array)
                    .into_iter()
                    .flatten()
                {
                    let id = entry
                        .get("name")
                        .and_then(Value::as_str)
                        .and_then(|name| name.rsplit('/').next())
                        .ok_or_else(|| {
                            StorageError::Value("listed document has no resource name".to_string())
                        })?;
                    documents.push((id.to_string(), decode_document_fields(entry)?));
                }
                page_token = body
                    .get("nextPageToken")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                if page_token.is_none() {
                    break;
                }
            }
            Ok(documents)
        };
        run.await.into_core(Operation::Read)
    }
}

fn decode_document_fields(document: &Value) -> std::result::Result<Document, StorageError> {
    // Documents with no fields at all omit the `fields` key entirely.
    match document.get("fields") {
        Some(fields) => {
            let map: &Map<String, Value> = fields.as_object().ok_or_else(|| {
                StorageError::Value("document fields are not an object".to_string())
            })?;
            decode_fields(map)
        }
        None => Ok(Document::new()),
    }
}

/// Quotes a top-level field name for use in an `updateMask` field path.
/// Names that are not plain identifiers must be backtick-quoted.
fn mask_field_path(name: &str) -> String {
    let plain = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        name.to_string()
    } else {
        format!("`{}`", name.replace('\\', "\\\\").replace('`', "\\`"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reliefmap_core::store::StoreRoot;

    fn store() -> FirestoreDocumentStore {
        FirestoreDocumentStore::new(
            DEFAULT_BASE_URL,
            "mapping-crisis",
            StaticTokenSource::new("token"),
        )
    }

    #[test]
    fn test_document_urls_address_the_default_database() {
        let path = StoreRoot::production()
            .disaster_metadata()
            .doc("2017-harvey");
        assert_eq!(
            store().document_url(&path),
            "https://firestore.googleapis.com/v1/projects/mapping-crisis/databases/(default)/documents/disaster-metadata/2017-harvey"
        );
    }

    #[test]
    fn test_scratch_roots_nest_under_the_test_document() {
        let collection = StoreRoot::test_scratch("run-123").user_shapes();
        assert_eq!(
            store().collection_url(&collection),
            "https://firestore.googleapis.com/v1/projects/mapping-crisis/databases/(default)/documents/test/run-123/usershapes"
        );
    }

    #[test]
    fn test_document_ids_are_url_encoded() {
        let path = StoreRoot::production().user_shapes().doc("a b#c");
        assert!(store().document_url(&path).ends_with("/usershapes/a%20b%23c"));
    }

    #[test]
    fn test_mask_field_paths_quote_non_identifiers() {
        assert_eq!(mask_field_path("asset_data"), "asset_data");
        assert_eq!(mask_field_path("layers"), "layers");
        assert_eq!(mask_field_path("display-name"), "`display-name`");
        assert_eq!(mask_field_path("0start"), "`0start`");
    }

    #[test]
    fn test_documents_without_fields_decode_empty() {
        let document = serde_json::json!({
            "name": "projects/p/databases/(default)/documents/usershapes/abc",
            "createTime": "2020-01-01T00:00:00Z",
        });
        assert!(decode_document_fields(&document).unwrap().is_empty());
    }
}
