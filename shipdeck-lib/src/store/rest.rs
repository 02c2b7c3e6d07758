//! PostgREST-style HTTP store

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::RequestBuilder;
use reqwest::Response;
use serde::Deserialize;
use url::Url;

use super::CatalogSource;
use super::RecordStore;
use crate::error::StoreError;
use crate::hooks::CommitEvent;
use crate::hooks::CommitHook;
use crate::model::FieldPatch;
use crate::model::Record;
use crate::model::RecordId;
use crate::model::RecordKind;
use crate::model::Value;
use crate::model::fields;

/// HTTP store speaking the PostgREST dialect of the console backend.
///
/// Rows live under `{base}/rest/v1/{table}`, catalogs under
/// `{base}/api/catalogos/{name}`. Shipment fields are translated to their
/// snake-case columns on the way out and back on the way in.
///
/// This client is cheap to clone (uses `Arc` internally).
///
/// # Example
///
/// ```ignore
/// use shipdeck_lib::store::RestStore;
///
/// let store = RestStore::builder()
///     .url("https://project.supabase.co")
///     .api_key("anon-key")
///     .timeout(Duration::from_secs(15))
///     .build()?;
///
/// let shipments = store.load(RecordKind::Shipment).await?;
/// ```
#[derive(Clone)]
pub struct RestStore {
    inner: Arc<RestStoreInner>,
}

struct RestStoreInner {
    base_url: Url,
    api_key: String,
    http_client: Client,
    timeout: Option<Duration>,
}

/// Error body returned by PostgREST.
#[derive(Debug, Deserialize)]
struct RestErrorBody {
    message: Option<String>,
    code: Option<String>,
}

impl RestStore {
    /// Creates a new builder for constructing a store.
    pub fn builder() -> RestStoreBuilder<Missing, Missing> {
        RestStoreBuilder::new()
    }

    /// Returns the base URL of the backend.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, StoreError> {
        self.inner
            .base_url
            .join(path)
            .map_err(|e| StoreError::InvalidUrl(format!("{path}: {e}")))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request
            .header("apikey", &self.inner.api_key)
            .bearer_auth(&self.inner.api_key);
        match self.inner.timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(match serde_json::from_str::<RestErrorBody>(&body) {
            Ok(detail) => StoreError::Http {
                status,
                message: detail.message.unwrap_or(body),
                code: detail.code,
            },
            Err(_) => StoreError::http(status, body),
        })
    }

    fn map_transport_error(&self, error: reqwest::Error) -> StoreError {
        match (error.is_timeout(), self.inner.timeout) {
            (true, Some(timeout)) => StoreError::Timeout(timeout),
            _ => StoreError::Network(error),
        }
    }

    /// Records one field change in the shipment history.
    ///
    /// Calls the `crear_historial_manual` procedure; nulls are sent as the
    /// literal `NULL` token the history table expects.
    pub async fn record_history(
        &self,
        id: &RecordId,
        field: &str,
        previous: &Value,
        current: &Value,
    ) -> Result<(), StoreError> {
        let url = self.endpoint("rest/v1/rpc/crear_historial_manual")?;
        let body = serde_json::json!({
            "registro_uuid": id.as_str(),
            "campo": field,
            "valor_anterior": history_token(previous),
            "valor_nuevo": history_token(current),
        });
        self.send(self.inner.http_client.post(url).json(&body))
            .await?;
        Ok(())
    }
}

fn history_token(value: &Value) -> String {
    if value.is_blank() {
        "NULL".to_string()
    } else {
        value.to_text()
    }
}

#[async_trait]
impl RecordStore for RestStore {
    async fn load(&self, kind: RecordKind) -> Result<Vec<Record>, StoreError> {
        let mut url = self.endpoint(&format!("rest/v1/{}", kind.table()))?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("deleted_at", "is.null");

        let response = self.send(self.inner.http_client.get(url)).await?;
        let body = response.text().await?;
        let rows: Vec<serde_json::Value> = serde_json::from_str(&body)
            .map_err(|e| StoreError::parse_with_body(e.to_string(), body.clone()))?;

        rows.into_iter()
            .map(|row| Record::from_json(kind, rename_row(kind, row)))
            .collect()
    }

    async fn update(
        &self,
        kind: RecordKind,
        id: &RecordId,
        patch: &FieldPatch,
    ) -> Result<(), StoreError> {
        let mut url = self.endpoint(&format!("rest/v1/{}", kind.table()))?;
        url.query_pairs_mut()
            .append_pair("id", &format!("eq.{id}"));

        let mut body = serde_json::Map::with_capacity(patch.len() + 1);
        for (field, value) in patch.iter() {
            let value = serde_json::to_value(value)
                .map_err(|e| StoreError::parse(e.to_string()))?;
            body.insert(fields::storage_column(kind, field), value);
        }
        body.insert(
            fields::UPDATED_AT.to_string(),
            serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
        );

        let request = self
            .inner
            .http_client
            .patch(url)
            .header("Prefer", "return=minimal")
            .json(&body);
        self.send(request).await?;
        log::debug!("updated {kind} {id}: {} field(s)", patch.len());
        Ok(())
    }
}

#[async_trait]
impl CatalogSource for RestStore {
    async fn fetch_catalog(&self, name: &str) -> Result<Vec<String>, StoreError> {
        let url = self.endpoint(&format!("api/catalogos/{name}"))?;
        let response = self.send(self.inner.http_client.get(url)).await?;
        let body = response.text().await?;
        let json: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| StoreError::parse_with_body(e.to_string(), body.clone()))?;

        let options = json
            .get(name)
            .and_then(|v| v.as_array())
            .ok_or_else(|| StoreError::parse_with_body(format!("missing \"{name}\" list"), body.clone()))?;
        Ok(options
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect())
    }
}

fn rename_row(kind: RecordKind, row: serde_json::Value) -> serde_json::Value {
    match row {
        serde_json::Value::Object(obj) => serde_json::Value::Object(
            obj.into_iter()
                .map(|(column, value)| (fields::console_field(kind, &column), value))
                .collect(),
        ),
        other => other,
    }
}

/// Writes a history entry for every field of a committed shipment patch,
/// whether or not the commit is a refresh commit.
///
/// Wrap it in an `Arc` and register it as a commit hook.
pub struct RestHistory {
    store: RestStore,
}

impl RestHistory {
    /// Creates a history hook over the given store.
    pub fn new(store: RestStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CommitHook for RestHistory {
    fn name(&self) -> &str {
        "history"
    }

    fn applies_to(&self, event: &CommitEvent) -> bool {
        event.kind == RecordKind::Shipment
    }

    async fn after_commit(&self, event: &CommitEvent) -> Result<(), StoreError> {
        for (field, value) in event.patch.iter() {
            self.store
                .record_history(event.current.id(), field, event.previous.value(field), value)
                .await?;
        }
        Ok(())
    }
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing a [`RestStore`].
///
/// # Required Fields
///
/// - `url` - The backend base URL
/// - `api_key` - The project API key
pub struct RestStoreBuilder<U, K> {
    url: U,
    api_key: K,
    timeout: Option<Duration>,
    http_client: Option<Client>,
}

impl RestStoreBuilder<Missing, Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            url: Missing,
            api_key: Missing,
            timeout: None,
            http_client: None,
        }
    }
}

impl Default for RestStoreBuilder<Missing, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> RestStoreBuilder<Missing, K> {
    /// Sets the backend base URL.
    pub fn url(self, url: impl Into<String>) -> RestStoreBuilder<Set<String>, K> {
        RestStoreBuilder {
            url: Set(url.into()),
            api_key: self.api_key,
            timeout: self.timeout,
            http_client: self.http_client,
        }
    }
}

impl<U> RestStoreBuilder<U, Missing> {
    /// Sets the API key sent as `apikey` and bearer token.
    pub fn api_key(self, key: impl Into<String>) -> RestStoreBuilder<U, Set<String>> {
        RestStoreBuilder {
            url: self.url,
            api_key: Set(key.into()),
            timeout: self.timeout,
            http_client: self.http_client,
        }
    }
}

impl<U, K> RestStoreBuilder<U, K> {
    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl RestStoreBuilder<Set<String>, Set<String>> {
    /// Builds the [`RestStore`].
    ///
    /// Fails if the URL does not parse.
    pub fn build(self) -> Result<RestStore, StoreError> {
        let Set(raw_url) = self.url;
        let Set(api_key) = self.api_key;

        // Url::join drops the last segment unless the base ends with a slash
        let normalized = format!("{}/", raw_url.trim_end_matches('/'));
        let base_url =
            Url::parse(&normalized).map_err(|e| StoreError::InvalidUrl(format!("{raw_url}: {e}")))?;

        Ok(RestStore {
            inner: Arc::new(RestStoreInner {
                base_url,
                api_key,
                http_client: self.http_client.unwrap_or_default(),
                timeout: self.timeout,
            }),
        })
    }
}
