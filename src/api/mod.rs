use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    config::Config,
    dto::{CreateNoteRequest, FetchNotesResponse, Note, NotesQuery, Tag},
};

pub const DEFAULT_BASE_URL: &str = "https://notehub-public.goit.study/api/notes/";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Note not found: {0}")]
    NotFound(i64),

    #[error("Notes service returned {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("Failed to reach notes service: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode notes service response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Operations offered by the remote notes service.
#[allow(async_fn_in_trait)]
pub trait NotesApi {
    async fn list(&self, query: &NotesQuery) -> Result<FetchNotesResponse, ApiError>;

    async fn get_by_id(&self, id: i64) -> Result<Note, ApiError>;

    async fn create(&self, note: &CreateNoteRequest) -> Result<Note, ApiError>;

    async fn delete(&self, id: i64) -> Result<Note, ApiError>;
}

/// Query string of a list request. Field order is the order on the wire.
#[derive(Debug, Serialize)]
struct ListParams<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    search: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag: Option<Tag>,
    page: u32,
    #[serde(rename = "perPage")]
    per_page: u32,
}

impl<'a> From<&'a NotesQuery> for ListParams<'a> {
    fn from(query: &'a NotesQuery) -> Self {
        Self {
            search: query.search_term(),
            tag: query.tag,
            page: query.page,
            per_page: query.per_page,
        }
    }
}

/// HTTP client for the NoteHub notes service.
#[derive(Clone)]
pub struct NoteHubClient {
    base_url: String,
    token: Option<String>,
    client: Client,
}

impl NoteHubClient {
    /// # Errors
    ///
    /// Fails when the underlying HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let mut base_url = config.base_url.clone();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        if config.token.is_none() {
            tracing::warn!("No bearer token configured, requests to {} are unauthenticated", base_url);
        }

        Ok(Self {
            base_url,
            token: config.token.clone(),
            client,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn note_url(&self, id: i64) -> String {
        format!("{}{id}", self.base_url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Sends the request and decodes a 2xx body. A 404 on a single-note
    /// request becomes `ApiError::NotFound`.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        note_id: Option<i64>,
    ) -> Result<T, ApiError> {
        let response = self.authorize(request).send().await?;

        let status = response.status();
        tracing::debug!("Notes service response status: {}", status);

        if let Some(id) = note_id
            && status == StatusCode::NOT_FOUND
        {
            return Err(ApiError::NotFound(id));
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, message });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl NotesApi for NoteHubClient {
    async fn list(&self, query: &NotesQuery) -> Result<FetchNotesResponse, ApiError> {
        tracing::debug!(?query, "Fetching notes page");
        let request = self
            .client
            .get(&self.base_url)
            .query(&ListParams::from(query));
        self.send(request, None).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Note, ApiError> {
        tracing::debug!(id, "Fetching note");
        let request = self.client.get(self.note_url(id));
        self.send(request, Some(id)).await
    }

    async fn create(&self, note: &CreateNoteRequest) -> Result<Note, ApiError> {
        tracing::debug!(title = %note.title, tag = %note.tag, "Creating note");
        let request = self.client.post(&self.base_url).json(note);
        self.send(request, None).await
    }

    async fn delete(&self, id: i64) -> Result<Note, ApiError> {
        tracing::debug!(id, "Deleting note");
        let request = self.client.delete(self.note_url(id));
        self.send(request, Some(id)).await
    }
}
