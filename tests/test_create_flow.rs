mod helpers;

use std::time::Duration;

use axum::http::Method;
use helpers::{MockNoteHub, note};
use notehub::{
    api::NoteHubClient,
    cache::{QueryClient, QueryKey},
    dto::{NotesQuery, Tag},
    pages,
    service::{FormState, Navigator, NoteForm, SubmitOutcome},
    store::{DraftStore, DraftUpdate, NoteDraft},
    validation::Field,
};
use serde_json::json;

#[derive(Default)]
struct Backs(u32);

impl Navigator for Backs {
    fn back(&mut self) {
        self.0 += 1;
    }
}

#[tokio::test]
async fn given_valid_draft_when_submitting_then_creates_once_and_refreshes_list() {
    let hub = MockNoteHub::start(vec![note(1, "Standup", "", Tag::Meeting)]).await;
    let api = NoteHubClient::new(&hub.config(Some("secret"))).unwrap();
    let cache = QueryClient::new(Duration::from_secs(60));
    let draft = DraftStore::new();
    let mut backs = Backs::default();

    // Visit the list so it is cached before composing
    let before = pages::load_notes(&cache, &api, NotesQuery::default()).await.unwrap();
    assert_eq!(before.notes.len(), 1);

    draft.set_draft(
        DraftUpdate::default()
            .title("Groceries")
            .content("Milk, eggs")
            .tag("Shopping"),
    );

    let mut form = NoteForm::new(api.clone(), cache.clone(), draft.clone(), &mut backs);
    let outcome = form.submit().await;
    assert!(matches!(form.state(), FormState::Success(_)));
    drop(form);

    assert!(matches!(outcome, SubmitOutcome::Created(ref created) if created.id == 2));
    let posts = hub.requests_with(&Method::POST);
    assert_eq!(posts.len(), 1);
    assert_eq!(
        posts[0].body,
        Some(json!({"title": "Groceries", "content": "Milk, eggs", "tag": "Shopping"}))
    );
    assert_eq!(draft.draft(), NoteDraft::default());
    assert_eq!(backs.0, 1);
    assert!(cache.is_stale(&QueryKey::notes_page(NotesQuery::default())));

    // Back on the list, the invalidated page is fetched again
    let after = pages::load_notes(&cache, &api, NotesQuery::default()).await.unwrap();
    assert_eq!(after.notes.len(), 2);
    assert_eq!(hub.requests_with(&Method::GET).len(), 2);
}

#[tokio::test]
async fn given_invalid_draft_when_submitting_then_no_request_is_sent() {
    let hub = MockNoteHub::start(Vec::new()).await;
    let api = NoteHubClient::new(&hub.config(Some("secret"))).unwrap();
    let draft = DraftStore::new();
    draft.set_draft(DraftUpdate::default().title("ab").tag("Holiday"));

    let mut form = NoteForm::new(
        api,
        QueryClient::new(Duration::from_secs(60)),
        draft.clone(),
        Backs::default(),
    );
    let outcome = form.submit().await;

    assert!(matches!(outcome, SubmitOutcome::Invalid(_)));
    assert_eq!(
        form.error(Field::Title),
        Some("Too short title, min 3 symbols")
    );
    assert!(form.error(Field::Tag).is_some());
    assert_eq!(form.error(Field::Content), None);
    assert!(hub.requests().is_empty());
    assert_eq!(draft.draft().title, "ab");
}

#[tokio::test]
async fn given_service_failure_when_submitting_then_submission_error_is_kept() {
    let hub = MockNoteHub::failing().await;
    let api = NoteHubClient::new(&hub.config(Some("secret"))).unwrap();
    let cache = QueryClient::new(Duration::from_secs(60));
    let draft = DraftStore::new();
    draft.set_draft(DraftUpdate::default().title("Groceries").tag("Shopping"));

    let mut form = NoteForm::new(api, cache, draft.clone(), Backs::default());
    let outcome = form.submit().await;

    assert!(matches!(outcome, SubmitOutcome::Failed(_)));
    assert_eq!(hub.requests_with(&Method::POST).len(), 1);
    assert!(form.submission_error().is_some());
    assert!(form.errors().is_empty());
    assert!(!form.is_submitting());
    assert_eq!(draft.draft().title, "Groceries");
}

#[tokio::test]
async fn given_persistent_draft_when_created_then_saved_draft_is_cleared() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("draft.json");
    DraftStore::persistent(&path).set_draft(
        DraftUpdate::default()
            .title("Weekly plan")
            .tag("Personal"),
    );

    let hub = MockNoteHub::start(Vec::new()).await;
    let api = NoteHubClient::new(&hub.config(Some("secret"))).unwrap();
    let draft = DraftStore::persistent(&path);
    assert_eq!(draft.draft().title, "Weekly plan");

    let mut form = NoteForm::new(
        api,
        QueryClient::new(Duration::from_secs(60)),
        draft,
        Backs::default(),
    );
    form.submit().await;

    assert_eq!(hub.notes()[0].title, "Weekly plan");
    assert_eq!(DraftStore::persistent(&path).draft(), NoteDraft::default());
}
