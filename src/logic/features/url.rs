//! URL Feature Extraction
//!
//! Static lexical features of a navigated URL for the phishing-style
//! analysis path. `n_redirection` comes from the redirect tracker and is
//! consumed exactly once per completed navigation.

use serde::{Deserialize, Serialize};

/// Fixed-shape URL feature record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlFeatures {
    pub url_length: usize,
    pub n_dots: usize,
    pub n_hyphens: usize,
    pub n_underline: usize,
    pub n_slash: usize,
    pub n_questionmark: usize,
    pub n_equal: usize,
    pub n_at: usize,
    pub n_and: usize,
    pub n_exclamation: usize,
    pub n_space: usize,
    pub n_tilde: usize,
    pub n_comma: usize,
    pub n_plus: usize,
    pub n_asterisk: usize,
    pub n_hashtag: usize,
    pub n_dollar: usize,
    pub n_percent: usize,
    pub n_redirection: usize,
}

/// Count occurrences of a single literal character.
fn count_char(s: &str, c: char) -> usize {
    s.matches(c).count()
}

/// Extract static URL features plus the redirect count for this navigation.
pub fn extract_url_features(url: &str, n_redirection: usize) -> UrlFeatures {
    UrlFeatures {
        url_length: url.chars().count(),
        n_dots: count_char(url, '.'),
        n_hyphens: count_char(url, '-'),
        n_underline: count_char(url, '_'),
        n_slash: count_char(url, '/'),
        n_questionmark: count_char(url, '?'),
        n_equal: count_char(url, '='),
        n_at: count_char(url, '@'),
        n_and: count_char(url, '&'),
        n_exclamation: count_char(url, '!'),
        n_space: count_char(url, ' '),
        n_tilde: count_char(url, '~'),
        n_comma: count_char(url, ','),
        n_plus: count_char(url, '+'),
        n_asterisk: count_char(url, '*'),
        n_hashtag: count_char(url, '#'),
        n_dollar: count_char(url, '$'),
        n_percent: count_char(url, '%'),
        n_redirection,
    }
}

// ============================================================================
// TESTS
// ============================================================================
