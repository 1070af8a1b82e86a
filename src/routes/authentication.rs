use argon2::Config;
use chrono::Utc;
use rand::Rng;
use tracing::info;
use warp::{http::StatusCode, Filter};

use crate::store::Store;
use crate::types::account::{Account, Session};

// 32-byte key for paseto v2 local tokens.
const PASETO_KEY: &str = "NOTES APP LOCAL PASETO SECRET 32";

pub fn hash_password(password: &[u8]) -> String {
    let salt = rand::thread_rng().gen::<[u8; 32]>();
    let config = Config::default();
    argon2::hash_encoded(password, &salt, &config).unwrap()
}

pub async fn register(store: Store, account: Account) -> Result<impl warp::Reply, warp::Rejection> {
    let account = Account {
        user_name: account.user_name,
        password: hash_password(account.password.as_bytes()),
    };

    match store.add_account(account.clone()).await {
        Ok(_) => {
            info!("registered account: {}", account.user_name);
            Ok(warp::reply::with_status("Account added", StatusCode::OK))
        }
        Err(e) => Err(warp::reject::custom(e)),
    }
}

pub async fn login(store: Store, login: Account) -> Result<impl warp::Reply, warp::Rejection> {
    match store.get_account(&login.user_name).await {
        Ok(account) => match verify_password(&account.password, login.password.as_bytes()) {
            Ok(verified) => {
                if verified {
                    info!("issued token for {}", account.user_name);
                    Ok(warp::reply::json(&issue_token(account.user_name)))
                } else {
                    Err(warp::reject::custom(handle_errors::Error::WrongPassword))
                }
            }
            Err(e) => Err(warp::reject::custom(
                handle_errors::Error::ArgonLibraryError(e),
            )),
        },
        Err(e) => Err(warp::reject::custom(e)),
    }
}

pub async fn login_page() -> Result<impl warp::Reply, warp::Rejection> {
    Ok(warp::reply::html(
        "<html><body>
            <h1>Login</h1>
            <form method='post' action='/auth/login'>
                <input name='user_name' placeholder='user name'>
                <input name='password' type='password' placeholder='password'>
                <button type='submit'>Log in</button>
            </form>
        </body></html>",
    ))
}

fn verify_password(hash: &str, password: &[u8]) -> Result<bool, argon2::Error> {
    argon2::verify_encoded(hash, password)
}

pub fn issue_token(user_name: String) -> String {
    let current_date_time = Utc::now();
    let dt = current_date_time + chrono::Duration::days(1);

    paseto::tokens::PasetoBuilder::new()
        .set_encryption_key(&Vec::from(PASETO_KEY.as_bytes()))
        .set_expiration(&dt)
        .set_not_before(&Utc::now())
        .set_claim("user_name", serde_json::json!(user_name))
        .build()
        .expect("failed to construct token")
}

pub fn verify_token(token: String) -> Result<Session, handle_errors::Error> {
    let token = paseto::tokens::validate_local_token(
        &token,
        None,
        PASETO_KEY.as_bytes(),
        &paseto::tokens::TimeBackend::Chrono,
    )
    .map_err(|_| handle_errors::Error::CannotDecryptToken)?;

    serde_json::from_value::<Session>(token).map_err(|_| handle_errors::Error::CannotDecryptToken)
}

/// Extracts the session when an `Authorization` header holds a valid token.
/// Missing or undecryptable tokens make the request anonymous instead of
/// rejecting it; protected handlers turn anonymity into a login redirect.
pub fn auth_optional() -> impl Filter<Extract = (Option<Session>,), Error = warp::Rejection> + Clone
{
    warp::header::optional::<String>("Authorization")
        .map(|token: Option<String>| token.and_then(|t| verify_token(t).ok()))
}

/// Anonymous access to a protected route redirects to login with the
/// originally requested path as `next`.
pub fn require_login(
    session: Option<Session>,
    next: &str,
) -> Result<Session, handle_errors::Error> {
    session.ok_or_else(|| handle_errors::Error::LoginRequired(next.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_roundtrip() {
        let hash = hash_password(b"password1");
        assert!(verify_password(&hash, b"password1").unwrap());
        assert!(!verify_password(&hash, b"password2").unwrap());
    }

    #[test]
    fn token_roundtrip_carries_user_name() {
        let token = issue_token("User1".to_string());
        let session = verify_token(token).expect("freshly issued token is valid");
        assert_eq!(session.user_name, "User1");
        assert!(session.exp > Utc::now());
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(matches!(
            verify_token("not-a-token".to_string()),
            Err(handle_errors::Error::CannotDecryptToken)
        ));
    }

    #[test]
    fn require_login_passes_sessions_through() {
        let session = verify_token(issue_token("User1".to_string())).unwrap();
        let result = require_login(Some(session), "/notes");
        assert_eq!(result.unwrap().user_name, "User1");
    }

    #[test]
    fn require_login_redirects_anonymous_users() {
        match require_login(None, "/notes/add") {
            Err(handle_errors::Error::LoginRequired(next)) => assert_eq!(next, "/notes/add"),
            other => panic!("expected LoginRequired, got {:?}", other),
        }
    }
}
