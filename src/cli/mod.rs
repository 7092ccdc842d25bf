pub mod args;

use std::{error::Error, process::ExitCode};

use crate::{
    api::{NoteHubClient, NotesApi},
    cache::{QueryCache, QueryClient, QueryKey},
    config::Config,
    dto::{FetchNotesResponse, Note, NotesQuery},
    pages::{self, PageError},
    service::{Navigator, NoteForm, SubmitOutcome},
    store::{DraftStore, DraftUpdate, NoteDraft},
};

use args::{Args, Command, DraftCommand};

/// Records a request to leave the form for the notes list.
#[derive(Debug, Default)]
struct ListNavigator {
    back_requested: bool,
}

impl Navigator for ListNavigator {
    fn back(&mut self) {
        self.back_requested = true;
    }
}

/// Executes one CLI command against the notes service.
///
/// # Errors
///
/// Fails when the HTTP client cannot be built or a request fails in a way
/// that has no dedicated view.
pub async fn run(args: Args, config: Config) -> Result<ExitCode, Box<dyn Error>> {
    tracing::debug!(?args, "Running command");

    let api = NoteHubClient::new(&config)?;
    let cache = QueryClient::new(config.stale_time);
    let first_page = NotesQuery::default().with_per_page(config.per_page);

    match args.command {
        Command::List { search, page, tag } => {
            let query = NotesQuery::new(search.unwrap_or_default(), page)
                .with_tag(tag)
                .with_per_page(config.per_page);
            show_list(&api, &cache, query).await
        }
        Command::Show { id } => show_note(&api, &cache, id).await,
        Command::Draft { command } => {
            let draft = DraftStore::persistent(&config.draft_path);
            match command {
                DraftCommand::Show => {
                    print_draft(&draft.draft());
                    Ok(ExitCode::SUCCESS)
                }
                DraftCommand::Set {
                    title,
                    content,
                    tag,
                } => {
                    draft.set_draft(DraftUpdate {
                        title,
                        content,
                        tag,
                    });
                    draft.save()?;
                    print_draft(&draft.draft());
                    Ok(ExitCode::SUCCESS)
                }
                DraftCommand::Clear => {
                    draft.clear_draft();
                    draft.save()?;
                    println!("Draft cleared");
                    Ok(ExitCode::SUCCESS)
                }
                DraftCommand::Submit => submit_draft(&api, &cache, draft, first_page).await,
            }
        }
        Command::Create {
            title,
            content,
            tag,
        } => {
            let draft = DraftStore::persistent(&config.draft_path);
            draft.set_draft(
                DraftUpdate::default()
                    .title(title)
                    .content(content)
                    .tag(tag),
            );
            submit_draft(&api, &cache, draft, first_page).await
        }
        Command::Delete { id } => match api.delete(id).await {
            Ok(note) => {
                cache.invalidate(&QueryKey::Note(id));
                cache.invalidate(&QueryKey::notes());
                println!("Deleted note #{}: {}", note.id, note.title);
                Ok(ExitCode::SUCCESS)
            }
            Err(e) if e.is_not_found() => Ok(not_found()),
            Err(e) => Err(e.into()),
        },
    }
}

async fn show_list<A: NotesApi>(
    api: &A,
    cache: &QueryClient,
    query: NotesQuery,
) -> Result<ExitCode, Box<dyn Error>> {
    let state = pages::prefetch_notes(cache, api, query.clone()).await;
    let view = pages::hydration_boundary(state, cache.stale_time());
    let page = query.page;

    let notes = pages::load_notes(&view, api, query).await?;
    print_notes(&notes, page);
    Ok(ExitCode::SUCCESS)
}

async fn show_note<A: NotesApi>(
    api: &A,
    cache: &QueryClient,
    id: i64,
) -> Result<ExitCode, Box<dyn Error>> {
    let state = match pages::prefetch_note(cache, api, id).await {
        Ok(state) => state,
        Err(PageError::NotFound(_)) => return Ok(not_found()),
        Err(e) => return Err(e.into()),
    };
    let view = pages::hydration_boundary(state, cache.stale_time());

    match pages::load_note(&view, api, id).await {
        Ok(note) => {
            print_note(&note);
            Ok(ExitCode::SUCCESS)
        }
        Err(PageError::NotFound(_)) => Ok(not_found()),
        Err(e) => Err(e.into()),
    }
}

async fn submit_draft(
    api: &NoteHubClient,
    cache: &QueryClient,
    draft: DraftStore,
    back_to: NotesQuery,
) -> Result<ExitCode, Box<dyn Error>> {
    let mut navigator = ListNavigator::default();

    let outcome = {
        let mut form = NoteForm::new(api.clone(), cache.clone(), draft, &mut navigator);
        tracing::info!("{}", form.submit_label());
        form.submit().await
    };

    match outcome {
        SubmitOutcome::Created(note) => {
            println!("Created note:");
            print_note(&note);
            if navigator.back_requested {
                println!();
                show_list(api, cache, back_to).await?;
            }
            Ok(ExitCode::SUCCESS)
        }
        SubmitOutcome::Invalid(errors) => {
            for (field, message) in errors.iter() {
                eprintln!("{field}: {message}");
            }
            Ok(ExitCode::FAILURE)
        }
        SubmitOutcome::Failed(e) => {
            eprintln!("Failed to create note: {e}");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn not_found() -> ExitCode {
    eprintln!("{}", pages::NOT_FOUND_TITLE);
    eprintln!("{}", pages::NOT_FOUND_DESCRIPTION);
    ExitCode::FAILURE
}

fn print_note(note: &Note) {
    println!("#{} [{}] {}", note.id, note.tag, note.title);
    if !note.content.is_empty() {
        println!("    {}", note.content);
    }
}

fn print_notes(response: &FetchNotesResponse, page: u32) {
    if response.notes.is_empty() {
        println!("No notes found");
    }
    for note in &response.notes {
        print_note(note);
    }
    println!("Page {} of {}", page, response.total_pages);
}

fn print_draft(draft: &NoteDraft) {
    println!("Title:   {}", draft.title);
    println!("Content: {}", draft.content);
    println!("Tag:     {}", draft.tag);
}
