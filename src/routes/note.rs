use tracing::{info, instrument};
use warp::http::Uri;
use warp::path::FullPath;

use crate::routes::authentication::require_login;
use crate::store::Store;
use crate::types::account::Session;
use crate::types::note::{Note, NoteForm};

const SUCCESS_URL: &str = "/done";

fn redirect_to_success() -> impl warp::Reply {
    warp::redirect::found(Uri::from_static(SUCCESS_URL))
}

/// Missing notes and foreign notes are the same 404; existence of another
/// user's note is never revealed.
fn authorize_owner(note: Option<Note>, session: &Session) -> Result<Note, handle_errors::Error> {
    match note {
        Some(note) if note.author == session.user_name => Ok(note),
        _ => Err(handle_errors::Error::NoteNotFound),
    }
}

pub async fn home() -> Result<impl warp::Reply, warp::Rejection> {
    Ok(warp::reply::html(
        "<html><body>
            <h1>Notes</h1>
            <p>Your personal notes. <a href='/notes'>Open the list</a>
            or <a href='/auth/login'>log in</a>.</p>
        </body></html>",
    ))
}

pub async fn success_page(
    session: Option<Session>,
    path: FullPath,
) -> Result<impl warp::Reply, warp::Rejection> {
    require_login(session, path.as_str()).map_err(warp::reject::custom)?;
    Ok(warp::reply::html(
        "<html><body><p>Done. <a href='/notes'>Back to the list</a></p></body></html>",
    ))
}

pub async fn list_notes(
    session: Option<Session>,
    path: FullPath,
    store: Store,
) -> Result<impl warp::Reply, warp::Rejection> {
    let session = require_login(session, path.as_str()).map_err(warp::reject::custom)?;
    match store.notes_by_author(&session.user_name).await {
        Ok(notes) => Ok(warp::reply::json(&notes)),
        Err(e) => Err(warp::reject::custom(e)),
    }
}

pub async fn note_detail(
    slug: String,
    session: Option<Session>,
    path: FullPath,
    store: Store,
) -> Result<impl warp::Reply, warp::Rejection> {
    let session = require_login(session, path.as_str()).map_err(warp::reject::custom)?;
    let note = store.get_note(&slug).await.map_err(warp::reject::custom)?;
    let note = authorize_owner(note, &session).map_err(warp::reject::custom)?;
    Ok(warp::reply::json(&note))
}

pub async fn add_note_page(
    session: Option<Session>,
    path: FullPath,
) -> Result<impl warp::Reply, warp::Rejection> {
    require_login(session, path.as_str()).map_err(warp::reject::custom)?;
    Ok(warp::reply::html(note_form_page("Add a note", None)))
}

#[instrument(skip(session, store, form))]
pub async fn add_note(
    session: Option<Session>,
    path: FullPath,
    store: Store,
    form: NoteForm,
) -> Result<impl warp::Reply, warp::Rejection> {
    let session = require_login(session, path.as_str()).map_err(warp::reject::custom)?;
    form.validate().map_err(warp::reject::custom)?;
    let slug = form.resolve_slug().map_err(warp::reject::custom)?;

    if store.slug_exists(&slug).await.map_err(warp::reject::custom)? {
        return Err(warp::reject::custom(handle_errors::Error::SlugExists(slug)));
    }

    let note = Note {
        slug,
        title: form.title,
        text: form.text,
        // Author comes from the session, never from the body.
        author: session.user_name,
    };
    match store.add_note(note).await {
        Ok(note) => {
            info!("created note {} for {}", note.slug, note.author);
            Ok(redirect_to_success())
        }
        Err(e) => Err(warp::reject::custom(e)),
    }
}

pub async fn edit_note_page(
    slug: String,
    session: Option<Session>,
    path: FullPath,
    store: Store,
) -> Result<impl warp::Reply, warp::Rejection> {
    let session = require_login(session, path.as_str()).map_err(warp::reject::custom)?;
    let note = store.get_note(&slug).await.map_err(warp::reject::custom)?;
    let note = authorize_owner(note, &session).map_err(warp::reject::custom)?;
    Ok(warp::reply::html(note_form_page("Edit note", Some(&note))))
}

pub async fn update_note(
    slug: String,
    session: Option<Session>,
    path: FullPath,
    store: Store,
    form: NoteForm,
) -> Result<impl warp::Reply, warp::Rejection> {
    let session = require_login(session, path.as_str()).map_err(warp::reject::custom)?;
    let existing = store.get_note(&slug).await.map_err(warp::reject::custom)?;
    let existing = authorize_owner(existing, &session).map_err(warp::reject::custom)?;

    form.validate().map_err(warp::reject::custom)?;
    let new_slug = form
        .resolve_slug_or(&existing.slug)
        .map_err(warp::reject::custom)?;
    if new_slug != existing.slug
        && store
            .slug_exists(&new_slug)
            .await
            .map_err(warp::reject::custom)?
    {
        return Err(warp::reject::custom(handle_errors::Error::SlugExists(
            new_slug,
        )));
    }

    let note = Note {
        slug: new_slug,
        title: form.title,
        text: form.text,
        author: existing.author,
    };
    match store.update_note(&existing.slug, note).await {
        Ok(note) => {
            info!("updated note {}", note.slug);
            Ok(redirect_to_success())
        }
        Err(e) => Err(warp::reject::custom(e)),
    }
}

pub async fn delete_note_page(
    slug: String,
    session: Option<Session>,
    path: FullPath,
    store: Store,
) -> Result<impl warp::Reply, warp::Rejection> {
    let session = require_login(session, path.as_str()).map_err(warp::reject::custom)?;
    let note = store.get_note(&slug).await.map_err(warp::reject::custom)?;
    let note = authorize_owner(note, &session).map_err(warp::reject::custom)?;
    Ok(warp::reply::html(format!(
        "<html><body>
            <p>Delete note \"{}\"?</p>
            <form method='post' action='/notes/{}/delete'>
                <button type='submit'>Delete</button>
            </form>
        </body></html>",
        note.title, note.slug
    )))
}

pub async fn delete_note(
    slug: String,
    session: Option<Session>,
    path: FullPath,
    store: Store,
) -> Result<impl warp::Reply, warp::Rejection> {
    let session = require_login(session, path.as_str()).map_err(warp::reject::custom)?;
    let note = store.get_note(&slug).await.map_err(warp::reject::custom)?;
    let note = authorize_owner(note, &session).map_err(warp::reject::custom)?;

    match store.delete_note(&note.slug).await {
        Ok(note) => {
            info!("deleted note {}", note.slug);
            Ok(redirect_to_success())
        }
        Err(e) => Err(warp::reject::custom(e)),
    }
}

fn note_form_page(heading: &str, note: Option<&Note>) -> String {
    let (title, text, slug) = match note {
        Some(note) => (note.title.as_str(), note.text.as_str(), note.slug.as_str()),
        None => ("", "", ""),
    };
    format!(
        "<html><body>
            <h1>{heading}</h1>
            <form method='post'>
                <input name='title' value='{title}'>
                <textarea name='text'>{text}</textarea>
                <input name='slug' value='{slug}'>
                <button type='submit'>Save</button>
            </form>
        </body></html>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_for(user_name: &str) -> Session {
        crate::routes::authentication::verify_token(
            crate::routes::authentication::issue_token(user_name.to_string()),
        )
        .expect("valid token")
    }

    fn note_of(author: &str) -> Note {
        Note {
            slug: "author-note".to_string(),
            title: "Заметка автора".to_string(),
            text: "Текст заметки".to_string(),
            author: author.to_string(),
        }
    }

    #[test]
    fn author_passes_the_ownership_check() {
        let note = authorize_owner(Some(note_of("Author")), &session_for("Author"));
        assert_eq!(note.unwrap().author, "Author");
    }

    #[test]
    fn foreign_note_reads_as_not_found() {
        assert!(matches!(
            authorize_owner(Some(note_of("Author")), &session_for("Reader")),
            Err(handle_errors::Error::NoteNotFound)
        ));
    }

    #[test]
    fn missing_note_reads_the_same_as_a_foreign_one() {
        assert!(matches!(
            authorize_owner(None, &session_for("Reader")),
            Err(handle_errors::Error::NoteNotFound)
        ));
    }
}
