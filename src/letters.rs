use crate::error::{AvatarError, Result};
use crate::request::strip_quotes;

/// First character of each whitespace-separated word, up to `count` of them.
/// A name with fewer words than `count` yields fewer letters.
pub fn extract_letters(name: &str, count: usize) -> Result<String> {
    if name.is_empty() {
        return Err(AvatarError::EmptyName);
    }
    Ok(name
        .split_whitespace()
        .filter_map(|word| strip_quotes(word).chars().next())
        .take(count)
        .collect())
}

pub fn apply_case(text: &str, lowercase: bool) -> String {
    if lowercase {
        text.to_lowercase()
    } else {
        text.to_uppercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_initials_in_order() {
        assert_eq!(extract_letters("Ada Lovelace", 2).unwrap(), "AL");
        assert_eq!(extract_letters("Ada Lovelace", 1).unwrap(), "A");
        assert_eq!(extract_letters("John Ronald Reuel Tolkien", 2).unwrap(), "JR");
    }

    #[test]
    fn short_names_give_fewer_letters() {
        assert_eq!(extract_letters("x", 2).unwrap(), "x");
    }

    #[test]
    fn ignores_quotes_and_extra_spaces() {
        assert_eq!(extract_letters("\"grace  hopper\"", 2).unwrap(), "gh");
        assert_eq!(extract_letters("\" bob", 2).unwrap(), "b");
    }

    #[test]
    fn whitespace_only_name_has_no_letters() {
        assert_eq!(extract_letters("   ", 2).unwrap(), "");
    }

    #[test]
    fn empty_name_is_an_error() {
        assert!(matches!(extract_letters("", 2), Err(AvatarError::EmptyName)));
    }

    #[test]
    fn multibyte_initials() {
        assert_eq!(extract_letters("Émile Zola", 2).unwrap(), "ÉZ");
    }

    #[test]
    fn case_transform_is_idempotent() {
        assert_eq!(apply_case("al", false), "AL");
        assert_eq!(apply_case("AL", false), "AL");
        assert_eq!(apply_case("AL", true), "al");
        assert_eq!(apply_case(&apply_case("Gh", true), true), "gh");
    }
}
