//! Text normalization for deduplication comparison
//!
//! Every function here is total: empty or degenerate input yields an empty
//! string or an empty token set, never an error.

use std::collections::{BTreeSet, HashMap, HashSet};

use lazy_static::lazy_static;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Minimum token length used for blocking and name scoring
pub const DEFAULT_MIN_TOKEN_LEN: usize = 3;

lazy_static! {
    /// Generic hospitality terms and conjunctions (English and Russian/Ukrainian)
    static ref NAME_STOPWORDS: HashSet<&'static str> = [
        "hotel", "hostel", "resort", "spa", "apartments", "apartment", "suites",
        "suite", "inn", "villa", "villas", "lodge", "motel", "camp", "guesthouse",
        "guest", "house", "boutique", "design", "chain", "and", "&", "the", "a",
        "отель", "готель", "апартаменты", "апартаменти", "гостиница", "гост",
        "хостел", "резорт", "вилла", "пансион", "мотель",
    ]
    .into_iter()
    .collect();

    /// Street-type words and abbreviations mapped to one canonical form
    static ref STREET_ABBREVIATIONS: HashMap<&'static str, &'static str> = [
        ("street", "str"), ("str.", "str"), ("st.", "str"), ("st", "str"),
        ("avenue", "ave"), ("ave.", "ave"), ("ave", "ave"),
        ("boulevard", "blvd"), ("blvd.", "blvd"), ("blvd", "blvd"),
        ("road", "rd"), ("rd.", "rd"), ("rd", "rd"),
        ("lane", "ln"), ("ln.", "ln"), ("ln", "ln"),
        ("drive", "dr"), ("dr.", "dr"), ("dr", "dr"),
        ("place", "pl"), ("pl.", "pl"), ("pl", "pl"),
    ]
    .into_iter()
    .collect();
}

/// Normalize a hotel name for comparison
///
/// - Converts to lowercase
/// - Removes diacritics
/// - Replaces `&` with "and"
/// - Turns punctuation into spaces and collapses whitespace
/// - Drops stop-words and single-character tokens
pub fn normalize_name(name: &str) -> String {
    if name.trim().is_empty() {
        return String::new();
    }

    let lowered = strip_diacritics(&name.to_lowercase()).replace('&', " and ");

    punctuation_to_spaces(&lowered, false)
        .split_whitespace()
        .filter(|token| !NAME_STOPWORDS.contains(*token) && token.chars().count() >= 2)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalize a street address for comparison
///
/// Same cleanup as names (periods are kept), then street-type words are
/// mapped to their canonical abbreviation. Other tokens pass through.
pub fn normalize_address(address: &str) -> String {
    if address.trim().is_empty() {
        return String::new();
    }

    let lowered = strip_diacritics(&address.to_lowercase());

    punctuation_to_spaces(&lowered, true)
        .split_whitespace()
        .map(|token| STREET_ABBREVIATIONS.get(token).copied().unwrap_or(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reduce a website URL to its bare host
///
/// `https://www.Bristol.ua/en/` becomes `bristol.ua`.
pub fn normalize_site(site: &str) -> String {
    let lowered = site.trim().to_lowercase();
    let without_scheme = lowered
        .strip_prefix("https://")
        .or_else(|| lowered.strip_prefix("http://"))
        .unwrap_or(&lowered);
    let without_www = without_scheme
        .strip_prefix("www.")
        .unwrap_or(without_scheme);

    without_www
        .trim_end_matches('/')
        .split('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Normalize a phone number to digits, keeping a leading `+`
pub fn normalize_phone(phone: &str) -> String {
    let compact: String = phone
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
        .collect();
    let digits: String = compact.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.is_empty() {
        return String::new();
    }
    if compact.starts_with('+') {
        format!("+{}", digits)
    } else {
        digits
    }
}

/// Token set of the normalized name, keeping tokens of at least `min_len` chars
///
/// Shorter tokens are dropped to bias blocking and scoring toward distinctive words.
pub fn name_tokens(name: &str, min_len: usize) -> BTreeSet<String> {
    normalize_name(name)
        .split_whitespace()
        .filter(|token| token.chars().count() >= min_len)
        .map(str::to_string)
        .collect()
}

/// Token set of the normalized address
pub fn address_tokens(address: &str) -> BTreeSet<String> {
    normalize_address(address)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Decompose (NFD) and drop combining marks
fn strip_diacritics(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Replace every char that is not a word char or whitespace with a space
fn punctuation_to_spaces(s: &str, keep_periods: bool) -> String {
    s.chars()
        .map(|c| {
            let keep = c.is_alphanumeric()
                || c == '_'
                || c.is_whitespace()
                || (keep_periods && c == '.');
            if keep {
                c
            } else {
                ' '
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Hotel Bristol"), "bristol");
        assert_eq!(normalize_name("Bristol Hotel"), "bristol");
        assert_eq!(normalize_name("The   Grand  Budapest"), "grand budapest");
        assert_eq!(normalize_name(""), "");
        assert_eq!(normalize_name("   "), "");
    }

    #[test]
    fn test_normalize_name_with_ampersand_and_punctuation() {
        assert_eq!(normalize_name("Grand Hotel & Spa, Kyiv!"), "grand kyiv");
        assert_eq!(normalize_name("Rock'n'Roll Inn"), "rock roll");
    }

    #[test]
    fn test_normalize_name_with_diacritics() {
        assert_eq!(normalize_name("Hôtel Crème Brûlée"), "creme brulee");
        assert_eq!(normalize_name("Café Müller"), "cafe muller");
    }

    #[test]
    fn test_normalize_name_cyrillic_stopwords() {
        assert_eq!(normalize_name("Готель Дніпро"), "дніпро");
        assert_eq!(normalize_name("Отель ДНЕПР"), "днепр");
        assert_eq!(normalize_name("Апартаменты на Подоле"), "на подоле");
    }

    #[test]
    fn test_normalize_name_drops_short_tokens() {
        assert_eq!(normalize_name("A B Hotel"), "");
        assert_eq!(normalize_name("B&B Roma"), "roma");
    }

    #[test]
    fn test_normalize_address() {
        assert_eq!(normalize_address("12 Main Street"), "12 main str");
        assert_eq!(normalize_address("5, Main St."), "5 main str");
        assert_eq!(normalize_address("Shevchenko Blvd., 4"), "shevchenko blvd 4");
        assert_eq!(normalize_address("Park Lane / Hyde Rd"), "park ln hyde rd");
        assert_eq!(normalize_address(""), "");
    }

    #[test]
    fn test_normalize_address_keeps_unknown_tokens() {
        assert_eq!(normalize_address("vul. Khreshchatyk 22"), "vul. khreshchatyk 22");
    }

    #[test]
    fn test_normalize_site() {
        assert_eq!(normalize_site("https://www.Bristol.ua/en/rooms"), "bristol.ua");
        assert_eq!(normalize_site("http://bristol.ua/"), "bristol.ua");
        assert_eq!(normalize_site("www.bristol.ua"), "bristol.ua");
        assert_eq!(normalize_site("  "), "");
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("+38 (044) 123-45-67"), "+380441234567");
        assert_eq!(normalize_phone("044 123 45 67"), "0441234567");
        assert_eq!(normalize_phone("tel. 123"), "123");
        assert_eq!(normalize_phone("+"), "");
        assert_eq!(normalize_phone(""), "");
    }

    #[test]
    fn test_name_tokens_min_len() {
        let tokens = name_tokens("Hotel Il Duomo Roma", DEFAULT_MIN_TOKEN_LEN);
        assert!(tokens.contains("duomo"));
        assert!(tokens.contains("roma"));
        assert!(!tokens.contains("il"));

        let all = name_tokens("Hotel Il Duomo Roma", 2);
        assert!(all.contains("il"));
    }

    #[test]
    fn test_address_tokens() {
        let tokens = address_tokens("1 Main Street");
        assert_eq!(tokens.len(), 3);
        assert!(tokens.contains("str"));
    }
}
