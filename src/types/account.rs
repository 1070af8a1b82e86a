use chrono::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Account {
    pub user_name: String,
    pub password: String,
}

/// Claims carried by a paseto session token.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Session {
    pub exp: DateTime<Utc>,
    pub user_name: String,
    pub nbf: DateTime<Utc>,
}
