//! Slug derivation for notes.
//!
//! A slug is a trimmed, non-empty identifier of lowercase ASCII letters,
//! digits and hyphens, at most [`MAX_SLUG_LEN`] characters. When the user
//! leaves the field empty the slug is derived from the note title:
//! Cyrillic characters are transliterated to Latin, everything is
//! lowercased, and runs of other characters collapse to a single hyphen.

pub const MAX_SLUG_LEN: usize = 100;

/// Returns `true` when `value` can be stored as a slug as-is.
pub fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && value.trim() == value
        && value.len() <= MAX_SLUG_LEN
        && value
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
}

/// Derive a slug from a note title, truncated to [`MAX_SLUG_LEN`] characters.
pub fn slugify(title: &str) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;
    for ch in title.chars().flat_map(char::to_lowercase) {
        match transliterate(ch) {
            Some("") => continue,
            Some(mapped) => {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                slug.push_str(mapped);
                pending_dash = false;
            }
            None if ch.is_ascii_alphanumeric() => {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                slug.push(ch);
                pending_dash = false;
            }
            None => pending_dash = true,
        }
    }
    truncate_slug(&slug)
}

fn truncate_slug(slug: &str) -> String {
    slug.chars()
        .take(MAX_SLUG_LEN)
        .collect::<String>()
        .trim_matches('-')
        .to_string()
}

// pytils-style table; soft and hard signs carry no sound and are dropped.
fn transliterate(ch: char) -> Option<&'static str> {
    let mapped = match ch {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "e",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "j",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "c",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' => "",
        'ы' => "y",
        'ь' => "",
        'э' => "e",
        'ю' => "ju",
        'я' => "ja",
        _ => return None,
    };
    Some(mapped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transliterates_cyrillic_titles() {
        assert_eq!(slugify("Новая заметка"), "novaja-zametka");
        assert_eq!(slugify("Ёжик в тумане"), "ezhik-v-tumane");
    }

    #[test]
    fn lowercases_and_collapses_separators() {
        assert_eq!(slugify("Hello,  World!"), "hello-world");
        assert_eq!(slugify("  spaced   out  "), "spaced-out");
    }

    #[test]
    fn keeps_digits() {
        assert_eq!(slugify("Заметка 2"), "zametka-2");
    }

    #[test]
    fn drops_soft_and_hard_signs() {
        assert_eq!(slugify("Объявление"), "objavlenie");
        assert_eq!(slugify("День"), "den");
    }

    #[test]
    fn truncates_to_a_hundred_characters() {
        let title = "a".repeat(150);
        let slug = slugify(&title);
        assert_eq!(slug.len(), MAX_SLUG_LEN);
        assert_eq!(slug, "a".repeat(100));
    }

    #[test]
    fn truncation_does_not_leave_a_trailing_hyphen() {
        // 99 chars, then a separator, then more text: the cut lands on the
        // hyphen.
        let title = format!("{} tail", "b".repeat(99));
        let slug = slugify(&title);
        assert_eq!(slug, "b".repeat(99));
    }

    #[test]
    fn empty_when_nothing_survives() {
        assert_eq!(slugify("!!! ???"), "");
    }

    #[test]
    fn validates_stored_slugs() {
        assert!(is_valid_slug("note1-user1"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("With Spaces"));
        assert!(!is_valid_slug(" padded "));
        assert!(!is_valid_slug(&"a".repeat(101)));
    }
}
