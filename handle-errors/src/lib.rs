use argon2::Error as ArgonError;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use tracing::{event, instrument, Level};
#[allow(unused_imports)]
use warp::{
    filters::{body::BodyDeserializeError, cors::CorsForbidden},
    http::StatusCode,
    reject::Reject,
    Rejection, Reply,
};

#[derive(Debug)]
pub enum Error {
    MissingField(&'static str),
    InvalidSlug(String),
    SlugExists(String),
    NoteNotFound,
    LoginRequired(String),
    WrongPassword,
    CannotDecryptToken,
    ArgonLibraryError(ArgonError),
    DatabaseQueryError(sqlx::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Error::MissingField(field) => write!(f, "Missing required field: {}", field),
            Error::InvalidSlug(ref slug) => {
                write!(f, "{} - недопустимый slug", slug)
            }
            Error::SlugExists(ref slug) => {
                write!(f, "{} - такой slug уже существует", slug)
            }
            Error::NoteNotFound => write!(f, "Note not found"),
            Error::LoginRequired(ref next) => write!(f, "Login required to access {}", next),
            Error::WrongPassword => write!(f, "Wrong password"),
            Error::CannotDecryptToken => write!(f, "Cannot decrypt token"),
            Error::ArgonLibraryError(_) => write!(f, "Cannot verify account"),
            Error::DatabaseQueryError(ref e) => {
                write!(f, "Query could not be executed: {}", e)
            }
        }
    }
}

impl Reject for Error {}

const DUPLICATE_KEY: &str = "23505";

// The `next` value keeps its slashes so the redirect target reads as the
// original path; query-breaking characters are escaped.
const NEXT_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'#')
    .add(b'?')
    .add(b'&')
    .add(b'+');

pub const LOGIN_URL: &str = "/auth/login";

fn redirect_to_login(next: &str) -> warp::reply::Response {
    let location = format!(
        "{}?next={}",
        LOGIN_URL,
        utf8_percent_encode(next, NEXT_VALUE)
    );
    warp::reply::with_header(
        warp::reply::with_status(String::new(), StatusCode::FOUND),
        "Location",
        location,
    )
    .into_response()
}

#[instrument]
pub async fn return_error(r: Rejection) -> Result<impl Reply, Rejection> {
    if let Some(Error::LoginRequired(next)) = r.find() {
        event!(Level::INFO, "anonymous request, redirecting to login");
        Ok(redirect_to_login(next))
    } else if let Some(Error::NoteNotFound) = r.find() {
        event!(Level::INFO, "note not found or not owned by requester");
        Ok(warp::reply::with_status(
            Error::NoteNotFound.to_string(),
            StatusCode::NOT_FOUND,
        )
        .into_response())
    } else if let Some(Error::WrongPassword) = r.find() {
        event!(Level::ERROR, "wrong password");
        Ok(warp::reply::with_status(
            Error::WrongPassword.to_string(),
            StatusCode::UNAUTHORIZED,
        )
        .into_response())
    } else if let Some(Error::CannotDecryptToken) = r.find() {
        event!(Level::ERROR, "cannot decrypt token");
        Ok(warp::reply::with_status(
            Error::CannotDecryptToken.to_string(),
            StatusCode::UNAUTHORIZED,
        )
        .into_response())
    } else if let Some(Error::ArgonLibraryError(e)) = r.find() {
        event!(Level::ERROR, "argon2 failure: {}", e);
        Ok(warp::reply::with_status(
            "Cannot verify account".to_string(),
            StatusCode::UNAUTHORIZED,
        )
        .into_response())
    } else if let Some(Error::DatabaseQueryError(e)) = r.find() {
        event!(Level::ERROR, "database query error: {}", e);
        let reply = match e {
            sqlx::Error::Database(err) if err.code().as_deref() == Some(DUPLICATE_KEY) => {
                warp::reply::with_status(
                    "такой slug уже существует".to_string(),
                    StatusCode::UNPROCESSABLE_ENTITY,
                )
            }
            _ => warp::reply::with_status(
                "Cannot update data".to_string(),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
        };
        Ok(reply.into_response())
    } else if let Some(error) = r.find::<Error>() {
        // MissingField, InvalidSlug, SlugExists: form validation errors
        // reported inline, nothing was persisted.
        event!(Level::ERROR, "{}", error);
        Ok(warp::reply::with_status(
            error.to_string(),
            StatusCode::UNPROCESSABLE_ENTITY,
        )
        .into_response())
    } else if let Some(error) = r.find::<CorsForbidden>() {
        event!(Level::ERROR, "{}", error);
        Ok(warp::reply::with_status(error.to_string(), StatusCode::FORBIDDEN).into_response())
    } else if let Some(error) = r.find::<BodyDeserializeError>() {
        event!(Level::ERROR, "{}", error);
        Ok(
            warp::reply::with_status(error.to_string(), StatusCode::UNPROCESSABLE_ENTITY)
                .into_response(),
        )
    } else {
        Ok(
            warp::reply::with_status("Route not found".to_string(), StatusCode::NOT_FOUND)
                .into_response(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn recover(error: Error) -> warp::reply::Response {
        return_error(warp::reject::custom(error))
            .await
            .expect("rejection should be recovered")
            .into_response()
    }

    #[tokio::test]
    async fn login_required_redirects_with_next() {
        let resp = recover(Error::LoginRequired("/notes/add".to_string())).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers()["location"], "/auth/login?next=/notes/add");
    }

    #[tokio::test]
    async fn next_value_is_escaped_where_it_would_break_the_query() {
        let resp = recover(Error::LoginRequired("/notes/a b?x=1".to_string())).await;
        assert_eq!(
            resp.headers()["location"],
            "/auth/login?next=/notes/a%20b%3Fx=1"
        );
    }

    #[tokio::test]
    async fn missing_note_is_a_plain_404() {
        let resp = recover(Error::NoteNotFound).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn duplicate_slug_is_unprocessable_with_russian_message() {
        let resp = recover(Error::SlugExists("unique-slug".to_string())).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = warp::hyper::body::to_bytes(resp.into_body())
            .await
            .expect("body");
        assert_eq!(body, "unique-slug - такой slug уже существует".as_bytes());
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let resp = recover(Error::WrongPassword).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_rejection_falls_through_to_404() {
        let resp = return_error(warp::reject::not_found())
            .await
            .expect("recovered")
            .into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
