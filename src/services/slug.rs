//! Slug derivation for notes
//!
//! Russian Cyrillic is transliterated to Latin before slugifying, so a
//! title like "Заголовок" becomes `zagolovok`.

use crate::models::SLUG_MAX_LENGTH;
use once_cell::sync::Lazy;
use regex::Regex;

/// Runs of whitespace and hyphens collapse into a single separator
static SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-\s]+").expect("separator pattern is valid"));

/// Accepted slug alphabet
static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("slug pattern is valid"));

/// Latin spelling of a lowercase Russian letter
fn transliterate_char(c: char) -> Option<&'static str> {
    let latin = match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "yo",
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
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' => "",
        'ы' => "y",
        'ь' => "",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        _ => return None,
    };
    Some(latin)
}

/// Transliterate Russian letters, leaving every other character as is
pub fn transliterate(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        let lower = c.to_lowercase().next().unwrap_or(c);
        match transliterate_char(lower) {
            Some(latin) if c.is_uppercase() => {
                let mut chars = latin.chars();
                if let Some(first) = chars.next() {
                    out.extend(first.to_uppercase());
                    out.push_str(chars.as_str());
                }
            }
            Some(latin) => out.push_str(latin),
            None => out.push(c),
        }
    }
    out
}

/// Derive a URL slug from free text.
///
/// Transliterates Cyrillic, lowercases, turns `&` into `and` and drops
/// anything outside `[a-z0-9_-]` and whitespace. Runs of whitespace and
/// hyphens then collapse into `-`, and leading or trailing `-`/`_` are
/// trimmed. The result is cut to [`SLUG_MAX_LENGTH`] characters and may be
/// empty when the input has no usable characters.
pub fn slugify(input: &str) -> String {
    let latin = transliterate(input).to_lowercase().replace('&', " and ");
    let filtered: String = latin
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_' || c.is_whitespace())
        .collect();

    let separated = SEPARATOR_RE.replace_all(&filtered, "-");
    let mut slug = separated.trim_matches(|c| c == '-' || c == '_').to_string();

    // Output is ASCII, so byte and char lengths agree
    slug.truncate(SLUG_MAX_LENGTH);
    let trimmed_len = slug.trim_end_matches(|c| c == '-' || c == '_').len();
    slug.truncate(trimmed_len);
    slug
}

/// Whether a user-supplied slug uses only the accepted alphabet
pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_RE.is_match(slug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_slugify_cyrillic_title() {
        assert_eq!(slugify("Заголовок"), "zagolovok");
        assert_eq!(slugify("Тестовая заметка"), "testovaya-zametka");
        assert_eq!(slugify("Ёжик в тумане"), "yozhik-v-tumane");
        assert_eq!(slugify("Щука и объявление"), "schuka-i-obyavlenie");
        assert_eq!(slugify("Мышь"), "mysh");
    }

    #[test]
    fn test_slugify_dropped_characters_leave_no_stray_hyphens() {
        assert_eq!(slugify("Заметка — важная"), "zametka-vazhnaya");
        assert_eq!(slugify("!!! Привет"), "privet");
        assert_eq!(slugify("Мир , дом"), "mir-dom");
        assert_eq!(slugify("Итоги года ?"), "itogi-goda");
        assert_eq!(slugify("-Ь А"), "a");
        assert_eq!(slugify("_private_ note_"), "private_-note");
    }

    #[test]
    fn test_slugify_latin_and_punctuation() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  many   spaces -- here "), "many-spaces-here");
        assert_eq!(slugify("Tom & Jerry"), "tom-and-jerry");
        assert_eq!(slugify("snake_case stays"), "snake_case-stays");
    }

    #[test]
    fn test_slugify_without_usable_characters() {
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify("日本語"), "");
    }

    #[test]
    fn test_slugify_truncates() {
        let title = "щ".repeat(80);
        let slug = slugify(&title);

        assert_eq!(slug.len(), SLUG_MAX_LENGTH);
        assert!(slug.starts_with("schsch"));
    }

    #[test]
    fn test_slugify_truncation_leaves_no_trailing_hyphen() {
        let title = format!("{} хвост", "a".repeat(SLUG_MAX_LENGTH - 1));
        let slug = slugify(&title);

        assert_eq!(slug, "a".repeat(SLUG_MAX_LENGTH - 1));
    }

    #[test]
    fn test_transliterate_keeps_case_and_foreign_chars() {
        assert_eq!(transliterate("Привет, мир"), "Privet, mir");
        assert_eq!(transliterate("Щи 2024"), "Schi 2024");
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("note-slug_1"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("with space"));
        assert!(!is_valid_slug("заметка"));
        assert!(!is_valid_slug("a/b"));
    }

    proptest! {
        #[test]
        fn slugify_output_is_always_a_valid_slug_or_empty(input in "\\PC{0,200}") {
            let slug = slugify(&input);
            prop_assert!(slug.len() <= SLUG_MAX_LENGTH);
            prop_assert!(slug.is_empty() || is_valid_slug(&slug));
            prop_assert!(!slug.starts_with(['-', '_']) && !slug.ends_with(['-', '_']));
            prop_assert!(!slug.contains("--"));
        }

        #[test]
        fn slugify_is_idempotent(input in "[а-яА-Яa-zA-Z0-9 _-]{0,60}") {
            let once = slugify(&input);
            prop_assert_eq!(slugify(&once), once.clone());
        }
    }
}
