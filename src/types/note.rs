use handle_errors::Error;
use serde::{Deserialize, Serialize};

use crate::slug::{is_valid_slug, slugify};

/// A persisted note. The slug is the unique key; the author is fixed at
/// creation time and never read from client input.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Note {
    pub slug: String,
    pub title: String,
    pub text: String,
    pub author: String,
}

/// User-submitted note fields. There deliberately is no author field here.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct NoteForm {
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub slug: Option<String>,
}

impl NoteForm {
    /// Required-field check shared by create and edit.
    pub fn validate(&self) -> Result<(), Error> {
        if self.title.trim().is_empty() {
            return Err(Error::MissingField("title"));
        }
        if self.text.trim().is_empty() {
            return Err(Error::MissingField("text"));
        }
        Ok(())
    }

    /// Slug for a new note: the supplied one, or derived from the title.
    pub fn resolve_slug(&self) -> Result<String, Error> {
        match self.supplied_slug() {
            Some(slug) => {
                if is_valid_slug(slug) {
                    Ok(slug.to_string())
                } else {
                    Err(Error::InvalidSlug(slug.to_string()))
                }
            }
            None => {
                let derived = slugify(&self.title);
                if derived.is_empty() {
                    return Err(Error::InvalidSlug(self.title.clone()));
                }
                Ok(derived)
            }
        }
    }

    /// Slug for an edited note: an empty field keeps the current slug, it is
    /// not re-derived from the new title.
    pub fn resolve_slug_or(&self, current: &str) -> Result<String, Error> {
        match self.supplied_slug() {
            Some(slug) => {
                if is_valid_slug(slug) {
                    Ok(slug.to_string())
                } else {
                    Err(Error::InvalidSlug(slug.to_string()))
                }
            }
            None => Ok(current.to_string()),
        }
    }

    fn supplied_slug(&self) -> Option<&str> {
        match self.slug.as_deref().map(str::trim) {
            Some("") | None => None,
            Some(slug) => Some(slug),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(title: &str, text: &str, slug: Option<&str>) -> NoteForm {
        NoteForm {
            title: title.to_string(),
            text: text.to_string(),
            slug: slug.map(String::from),
        }
    }

    #[test]
    fn title_and_text_are_required() {
        assert!(matches!(
            form("", "Текст заметки", None).validate(),
            Err(Error::MissingField("title"))
        ));
        assert!(matches!(
            form("Новая заметка", "   ", None).validate(),
            Err(Error::MissingField("text"))
        ));
        assert!(form("Новая заметка", "Текст заметки", None)
            .validate()
            .is_ok());
    }

    #[test]
    fn slug_is_derived_from_title_when_absent() {
        let slug = form("Новая заметка", "Текст заметки", None)
            .resolve_slug()
            .expect("derived slug");
        assert_eq!(slug, "novaja-zametka");
    }

    #[test]
    fn supplied_slug_wins_over_derivation() {
        let slug = form("Новая заметка", "Текст", Some("my-own-slug"))
            .resolve_slug()
            .expect("supplied slug");
        assert_eq!(slug, "my-own-slug");
    }

    #[test]
    fn blank_supplied_slug_counts_as_absent() {
        let slug = form("Новая заметка", "Текст", Some("  "))
            .resolve_slug()
            .expect("derived slug");
        assert_eq!(slug, "novaja-zametka");
    }

    #[test]
    fn malformed_supplied_slug_is_rejected() {
        assert!(matches!(
            form("Заметка", "Текст", Some("With Spaces")).resolve_slug(),
            Err(Error::InvalidSlug(_))
        ));
    }

    #[test]
    fn edit_keeps_current_slug_when_field_is_empty() {
        let slug = form("Обновлённая заметка", "Текст", None)
            .resolve_slug_or("author-note")
            .expect("kept slug");
        assert_eq!(slug, "author-note");
    }

    #[test]
    fn title_with_no_usable_characters_cannot_derive_a_slug() {
        assert!(matches!(
            form("???", "Текст", None).resolve_slug(),
            Err(Error::InvalidSlug(_))
        ));
    }
}
