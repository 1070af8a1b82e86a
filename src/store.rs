use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

use crate::types::account::Account;
use crate::types::note::Note;

#[derive(Clone)]
pub struct Store {
    pub connection: PgPool,
}

fn note_from_row(row: PgRow) -> Note {
    Note {
        slug: row.get("slug"),
        title: row.get("title"),
        text: row.get("text"),
        author: row.get("author"),
    }
}

impl Store {
    pub async fn new(db_url: &str) -> Self {
        let db_pool = match PgPoolOptions::new()
            .max_connections(5)
            .connect(db_url)
            .await
        {
            Ok(pool) => pool,
            Err(e) => panic!("Cannot connect to the database: {e}"),
        };
        Store {
            connection: db_pool,
        }
    }

    /// Builds a store whose pool connects on first use. Queries still fail
    /// without a reachable database; routes that never touch the store work.
    pub fn connect_lazy(db_url: &str) -> Result<Self, sqlx::Error> {
        let db_pool = PgPoolOptions::new().max_connections(5).connect_lazy(db_url)?;
        Ok(Store {
            connection: db_pool,
        })
    }

    pub async fn add_note(&self, note: Note) -> Result<Note, handle_errors::Error> {
        match sqlx::query(
            "INSERT INTO notes (slug, title, text, author)
            VALUES ($1, $2, $3, $4)
            RETURNING slug, title, text, author",
        )
        .bind(note.slug)
        .bind(note.title)
        .bind(note.text)
        .bind(note.author)
        .map(note_from_row)
        .fetch_one(&self.connection)
        .await
        {
            Ok(note) => Ok(note),
            Err(e) => Err(handle_errors::Error::DatabaseQueryError(e)),
        }
    }

    pub async fn get_note(&self, slug: &str) -> Result<Option<Note>, handle_errors::Error> {
        match sqlx::query(
            "SELECT slug, title, text, author
            FROM notes
            WHERE slug = $1",
        )
        .bind(slug)
        .map(note_from_row)
        .fetch_optional(&self.connection)
        .await
        {
            Ok(note) => Ok(note),
            Err(e) => Err(handle_errors::Error::DatabaseQueryError(e)),
        }
    }

    pub async fn notes_by_author(
        &self,
        user_name: &str,
    ) -> Result<Vec<Note>, handle_errors::Error> {
        match sqlx::query(
            "SELECT slug, title, text, author
            FROM notes
            WHERE author = $1
            ORDER BY slug",
        )
        .bind(user_name)
        .map(note_from_row)
        .fetch_all(&self.connection)
        .await
        {
            Ok(notes) => Ok(notes),
            Err(e) => Err(handle_errors::Error::DatabaseQueryError(e)),
        }
    }

    pub async fn slug_exists(&self, slug: &str) -> Result<bool, handle_errors::Error> {
        match sqlx::query("SELECT slug FROM notes WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.connection)
            .await
        {
            Ok(row) => Ok(row.is_some()),
            Err(e) => Err(handle_errors::Error::DatabaseQueryError(e)),
        }
    }

    pub async fn update_note(
        &self,
        current_slug: &str,
        note: Note,
    ) -> Result<Note, handle_errors::Error> {
        match sqlx::query(
            "UPDATE notes
            SET slug = $1, title = $2, text = $3
            WHERE slug = $4
            RETURNING slug, title, text, author",
        )
        .bind(note.slug)
        .bind(note.title)
        .bind(note.text)
        .bind(current_slug)
        .map(note_from_row)
        .fetch_one(&self.connection)
        .await
        {
            Ok(note) => Ok(note),
            Err(e) => Err(handle_errors::Error::DatabaseQueryError(e)),
        }
    }

    pub async fn delete_note(&self, slug: &str) -> Result<Note, handle_errors::Error> {
        match sqlx::query(
            "DELETE FROM notes
            WHERE slug = $1
            RETURNING slug, title, text, author",
        )
        .bind(slug)
        .map(note_from_row)
        .fetch_one(&self.connection)
        .await
        {
            Ok(note) => Ok(note),
            Err(e) => Err(handle_errors::Error::DatabaseQueryError(e)),
        }
    }

    pub async fn add_account(&self, account: Account) -> Result<(), handle_errors::Error> {
        match sqlx::query(
            "INSERT INTO accounts (user_name, password)
            VALUES ($1, $2)",
        )
        .bind(account.user_name)
        .bind(account.password)
        .execute(&self.connection)
        .await
        {
            Ok(_) => Ok(()),
            Err(e) => Err(handle_errors::Error::DatabaseQueryError(e)),
        }
    }

    pub async fn get_account(&self, user_name: &str) -> Result<Account, handle_errors::Error> {
        match sqlx::query(
            "SELECT user_name, password
            FROM accounts
            WHERE user_name = $1",
        )
        .bind(user_name)
        .map(|row: PgRow| Account {
            user_name: row.get("user_name"),
            password: row.get("password"),
        })
        .fetch_one(&self.connection)
        .await
        {
            Ok(account) => Ok(account),
            Err(e) => Err(handle_errors::Error::DatabaseQueryError(e)),
        }
    }
}
