use std::time::Duration;

use crate::{
    api::{ApiError, NotesApi},
    cache::{DehydratedState, QueryClient, QueryKey},
    dto::{FetchNotesResponse, Note, NotesQuery},
};

pub const NOT_FOUND_TITLE: &str = "Oh no, not that! 404 - Page not found";
pub const NOT_FOUND_DESCRIPTION: &str = "Sorry, but you are come to the wrong place!";

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("Note not found: {0}")]
    NotFound(i64),

    #[error(transparent)]
    Api(ApiError),
}

impl From<ApiError> for PageError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::NotFound(id) => Self::NotFound(id),
            e => Self::Api(e),
        }
    }
}

/// Server side of the notes list page: fetches the page into `client` and
/// returns the snapshot for the rendering side.
pub async fn prefetch_notes<A: NotesApi>(
    client: &QueryClient,
    api: &A,
    query: NotesQuery,
) -> DehydratedState {
    let key = QueryKey::notes_page(query.clone());
    client.prefetch_query(key, || api.list(&query)).await;
    client.dehydrate()
}

/// Server side of the note details page.
///
/// Unlike the list, a missing note aborts the page so the caller can show
/// the not-found view. Other failures are left for the rendering side.
///
/// # Errors
///
/// Returns `PageError::NotFound` when the service has no such note.
pub async fn prefetch_note<A: NotesApi>(
    client: &QueryClient,
    api: &A,
    id: i64,
) -> Result<DehydratedState, PageError> {
    match client
        .fetch_query(QueryKey::Note(id), || api.get_by_id(id))
        .await
    {
        Ok(_) => {}
        Err(ApiError::NotFound(id)) => return Err(PageError::NotFound(id)),
        Err(e) => tracing::warn!(id, "Prefetch of note failed: {e}"),
    }
    Ok(client.dehydrate())
}

/// Rendering-side cache seeded with the server snapshot.
#[must_use]
pub fn hydration_boundary(state: DehydratedState, stale_time: Duration) -> QueryClient {
    let client = QueryClient::new(stale_time);
    client.hydrate(state);
    client
}

/// Reads the notes page, reusing hydrated data while it is fresh.
///
/// # Errors
///
/// Propagates the service error when the page has to be refetched and fails.
pub async fn load_notes<A: NotesApi>(
    client: &QueryClient,
    api: &A,
    query: NotesQuery,
) -> Result<FetchNotesResponse, PageError> {
    let key = QueryKey::notes_page(query.clone());
    client
        .fetch_query(key, || api.list(&query))
        .await
        .map_err(Into::into)
}

/// Reads one note, reusing hydrated data while it is fresh.
///
/// # Errors
///
/// Returns `PageError::NotFound` for unknown ids.
pub async fn load_note<A: NotesApi>(
    client: &QueryClient,
    api: &A,
    id: i64,
) -> Result<Note, PageError> {
    client
        .fetch_query(QueryKey::Note(id), || api.get_by_id(id))
        .await
        .map_err(Into::into)
}
