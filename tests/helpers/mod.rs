#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Path, RawQuery, State},
    http::{HeaderMap, Method, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::Value;
use tokio::task::JoinHandle;

use std::sync::{Arc, Mutex};

use notehub::{
    config::Config,
    dto::{FetchNotesResponse, Note, Tag},
};

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

#[derive(Clone, Default)]
struct MockState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    notes: Arc<Mutex<Vec<Note>>>,
    fail: bool,
}

impl MockState {
    fn record(
        &self,
        method: Method,
        path: String,
        query: Option<String>,
        headers: &HeaderMap,
        body: Option<Value>,
    ) {
        let authorization = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            path,
            query,
            authorization,
            body,
        });
    }
}

/// In-process stand-in for the NoteHub notes service.
pub struct MockNoteHub {
    pub base_url: String,
    state: MockState,
    handle: JoinHandle<()>,
}

impl MockNoteHub {
    pub async fn start(notes: Vec<Note>) -> Self {
        Self::spawn(notes, false).await
    }

    /// A service answering every request with 500.
    pub async fn failing() -> Self {
        Self::spawn(Vec::new(), true).await
    }

    async fn spawn(notes: Vec<Note>, fail: bool) -> Self {
        let state = MockState {
            notes: Arc::new(Mutex::new(notes)),
            fail,
            ..MockState::default()
        };

        let router = Router::new()
            .route("/api/notes/", get(list_notes).post(create_note))
            .route("/api/notes/{id}", get(get_note).delete(delete_note))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}/api/notes/"),
            state,
            handle,
        }
    }

    pub fn config(&self, token: Option<&str>) -> Config {
        Config {
            base_url: self.base_url.clone(),
            ..Config::default()
        }
        .with_token(token.map(str::to_string))
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn requests_with(&self, method: &Method) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.method == method)
            .collect()
    }

    pub fn notes(&self) -> Vec<Note> {
        self.state.notes.lock().unwrap().clone()
    }
}

impl Drop for MockNoteHub {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn note(id: i64, title: &str, content: &str, tag: Tag) -> Note {
    Note {
        id,
        title: title.to_string(),
        content: content.to_string(),
        tag,
        created_at: None,
        updated_at: None,
    }
}

fn failure() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}

async fn list_notes(
    State(state): State<MockState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    state.record(Method::GET, "/api/notes/".to_string(), query, &headers, None);
    if state.fail {
        return failure();
    }

    let notes = state.notes.lock().unwrap().clone();
    Json(FetchNotesResponse {
        notes,
        total_pages: 1,
    })
    .into_response()
}

async fn create_note(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record(
        Method::POST,
        "/api/notes/".to_string(),
        None,
        &headers,
        Some(body.clone()),
    );
    if state.fail {
        return failure();
    }

    let mut notes = state.notes.lock().unwrap();
    let id = notes.iter().map(|note| note.id).max().unwrap_or(0) + 1;
    let note = Note {
        id,
        title: body["title"].as_str().unwrap_or_default().to_string(),
        content: body["content"].as_str().unwrap_or_default().to_string(),
        tag: body["tag"]
            .as_str()
            .and_then(|tag| tag.parse().ok())
            .unwrap_or(Tag::Todo),
        created_at: None,
        updated_at: None,
    };
    notes.push(note.clone());
    (StatusCode::CREATED, Json(note)).into_response()
}

async fn get_note(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    state.record(Method::GET, format!("/api/notes/{id}"), None, &headers, None);
    if state.fail {
        return failure();
    }

    let notes = state.notes.lock().unwrap();
    match notes.iter().find(|note| note.id == id) {
        Some(note) => Json(note.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "Note not found").into_response(),
    }
}

async fn delete_note(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    state.record(Method::DELETE, format!("/api/notes/{id}"), None, &headers, None);
    if state.fail {
        return failure();
    }

    let mut notes = state.notes.lock().unwrap();
    match notes.iter().position(|note| note.id == id) {
        Some(index) => Json(notes.remove(index)).into_response(),
        None => (StatusCode::NOT_FOUND, "Note not found").into_response(),
    }
}
