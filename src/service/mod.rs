use crate::{
    api::{ApiError, NotesApi},
    cache::{QueryCache, QueryKey},
    dto::Note,
    store::{DraftStore, DraftUpdate, NoteDraft},
    validation::{self, Field, ValidationErrors},
};

/// Moves the user away from the form.
pub trait Navigator {
    fn back(&mut self);
}

impl<N: Navigator + ?Sized> Navigator for &mut N {
    fn back(&mut self) {
        (**self).back();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Validating,
    Submitting,
    Success(Note),
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Created(Note),
    Invalid(ValidationErrors),
    Failed(ApiError),
}

/// Create-note form bound to the shared draft.
///
/// A submit validates the draft, creates the note with exactly one request,
/// and only after that request succeeds invalidates the cached notes lists,
/// clears the draft and navigates back.
pub struct NoteForm<A, C, N> {
    api: A,
    cache: C,
    draft: DraftStore,
    navigator: N,
    state: FormState,
    errors: ValidationErrors,
    submission_error: Option<String>,
}

impl<A, C, N> NoteForm<A, C, N>
where
    A: NotesApi,
    C: QueryCache,
    N: Navigator,
{
    pub fn new(api: A, cache: C, draft: DraftStore, navigator: N) -> Self {
        Self {
            api,
            cache,
            draft,
            navigator,
            state: FormState::Idle,
            errors: ValidationErrors::default(),
            submission_error: None,
        }
    }

    #[must_use]
    pub fn draft(&self) -> NoteDraft {
        self.draft.draft()
    }

    pub fn handle_change(&self, field: Field, value: impl Into<String>) {
        let update = DraftUpdate::default();
        let update = match field {
            Field::Title => update.title(value),
            Field::Content => update.content(value),
            Field::Tag => update.tag(value),
        };
        self.draft.set_draft(update);
    }

    #[must_use]
    pub const fn state(&self) -> &FormState {
        &self.state
    }

    #[must_use]
    pub const fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    #[must_use]
    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors.get(field)
    }

    #[must_use]
    pub fn submission_error(&self) -> Option<&str> {
        self.submission_error.as_deref()
    }

    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        matches!(self.state, FormState::Submitting)
    }

    #[must_use]
    pub const fn submit_label(&self) -> &'static str {
        if self.is_submitting() {
            "Creating note..."
        } else {
            "Create note"
        }
    }

    pub fn cancel(&mut self) {
        self.navigator.back();
    }

    pub async fn submit(&mut self) -> SubmitOutcome {
        self.errors = ValidationErrors::default();
        self.submission_error = None;
        self.state = FormState::Validating;

        let request = match validation::validate_note(&self.draft.draft()) {
            Ok(request) => request,
            Err(errors) => {
                tracing::debug!("Note draft rejected: {errors}");
                self.errors = errors.clone();
                self.state = FormState::Idle;
                return SubmitOutcome::Invalid(errors);
            }
        };

        self.state = FormState::Submitting;
        let result = self.api.create(&request).await;

        match result {
            Ok(note) => {
                tracing::info!(id = note.id, "Note created");
                self.cache.invalidate(&QueryKey::notes());
                self.draft.clear_draft();
                self.navigator.back();
                self.state = FormState::Success(note.clone());
                SubmitOutcome::Created(note)
            }
            Err(e) => {
                tracing::error!("Failed to create note: {e}");
                self.submission_error = Some(format!("Failed to create note: {e}"));
                self.state = FormState::Idle;
                SubmitOutcome::Failed(e)
            }
        }
    }
}
