use once_cell::sync::Lazy;
use regex::Regex;

static PARENTHESIZED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^)]*\)").unwrap());

/// Words that carry no identity when comparing team and channel names
pub const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "of", "and", "vs", "v", "at", "x", "fc", "sc", "cf", "afc", "ac", "club",
    "team", "university", "univ", "college", "state", "st", "de", "la", "el", "los", "las",
    "le", "di", "del",
];

pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(&token)
}

/// Meaningful lowercase tokens of a team, league or channel name.
///
/// Parenthesized parts are removed, the rest is split on anything that is
/// not a letter or digit, and one-character tokens and stop words dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let stripped = PARENTHESIZED.replace_all(&lowered, " ");

    stripped
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() > 1 && !is_stop_word(token))
        .map(str::to_string)
        .collect()
}

/// Uppercase words of a name with parentheses kept in, for marker lookups
/// like `(FR)` or `|US|`
pub(crate) fn marker_words(name: &str) -> Vec<String> {
    name.to_uppercase()
        .split(|c: char| !c.is_alphanumeric() && c != '+')
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parenthesized_suffix_is_stripped() {
        assert_eq!(tokenize("Duke (ESPN+)"), vec!["duke"]);
        assert_eq!(tokenize("Hawks (ATL) x Bulls (CHI)"), vec!["hawks", "bulls"]);
    }

    #[test]
    fn test_stop_words_and_single_letters_dropped() {
        assert_eq!(tokenize("The University of North Carolina"), vec!["north", "carolina"]);
        assert_eq!(tokenize("Arsenal FC vs Chelsea"), vec!["arsenal", "chelsea"]);
        assert_eq!(tokenize("Michigan St. at Ohio State"), vec!["michigan", "ohio"]);
        assert_eq!(tokenize("A B C"), Vec::<String>::new());
    }

    #[test]
    fn test_network_names_survive() {
        assert_eq!(tokenize("ESPN+ Network"), vec!["espn", "network"]);
        assert_eq!(tokenize("US| NBA TV FHD"), vec!["us", "nba", "tv", "fhd"]);
    }

    #[test]
    fn test_case_and_digits() {
        assert_eq!(tokenize("SKY Sports F1 4K"), vec!["sky", "sports", "f1", "4k"]);
        assert_eq!(tokenize("76ers @ Celtics"), vec!["76ers", "celtics"]);
    }

    #[test]
    fn test_marker_words_keep_plus() {
        assert_eq!(marker_words("ESPN+ Network (US)"), vec!["ESPN+", "NETWORK", "US"]);
        assert_eq!(marker_words("FR| Canal+ Sport"), vec!["FR", "CANAL+", "SPORT"]);
    }
}
