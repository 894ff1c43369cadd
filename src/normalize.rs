//! Word filtering and lemma normalization.
//!
//! The extractor never drops a token. When a [`TokenFilter`] rejects a word,
//! its node keeps its position, part of speech and relations, but the stored
//! word becomes [`EMPTY_TOKEN`].

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::record::PLACEHOLDER;

/// Word stored for a node whose text was rejected by the filter.
pub const EMPTY_TOKEN: &str = "";

/// Decides whether a (lower-cased) word keeps its text.
pub trait TokenFilter: Send + Sync {
    fn accept(&self, word: &str) -> bool;
}

impl<F> TokenFilter for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn accept(&self, word: &str) -> bool {
        self(word)
    }
}

/// Produces a normalized form for words that arrive without a lemma.
pub trait Stemmer: Send + Sync {
    fn stem(&self, word: &str) -> String;
}

impl<F> Stemmer for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn stem(&self, word: &str) -> String {
        self(word)
    }
}

/// Filter that accepts every word
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl TokenFilter for AcceptAll {
    fn accept(&self, _word: &str) -> bool {
        true
    }
}

/// Stemmer that returns the word unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityStemmer;

impl Stemmer for IdentityStemmer {
    fn stem(&self, word: &str) -> String {
        word.to_string()
    }
}

/// How a [`WordListFilter`] treats the words in its list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Reject listed words (a stop list)
    #[default]
    Exclude,
    /// Accept only listed words
    Include,
}

/// A [`TokenFilter`] backed by a fixed word list.
#[derive(Debug, Clone)]
pub struct WordListFilter {
    words: HashSet<String>,
    mode: FilterMode,
}

impl WordListFilter {
    pub fn new<I, S>(words: I, mode: FilterMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words.into_iter().map(|w| w.as_ref().to_lowercase()).collect(),
            mode,
        }
    }

    /// Load a word list with one word per line.
    ///
    /// Blank lines and lines starting with `#` are skipped; surrounding
    /// whitespace is trimmed and words are lower-cased.
    pub fn load_from_file<P: AsRef<Path>>(path: P, mode: FilterMode) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let filter = Self::new(
            contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
            mode,
        );
        tracing::debug!(path = %path.display(), words = filter.len(), ?mode, "loaded word list");
        Ok(filter)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    /// Listed words, in no particular order
    pub fn words(&self) -> impl Iterator<Item = &str> + '_ {
        self.words.iter().map(String::as_str)
    }
}

impl TokenFilter for WordListFilter {
    fn accept(&self, word: &str) -> bool {
        let listed = self.words.contains(word);
        match self.mode {
            FilterMode::Exclude => !listed,
            FilterMode::Include => listed,
        }
    }
}

/// Applies the configured filter and stemmer to raw token text.
pub struct WordNormalizer {
    filter: Box<dyn TokenFilter>,
    stemmer: Box<dyn Stemmer>,
}

impl Default for WordNormalizer {
    fn default() -> Self {
        Self::new(Box::new(AcceptAll), Box::new(IdentityStemmer))
    }
}

impl WordNormalizer {
    pub fn new(filter: Box<dyn TokenFilter>, stemmer: Box<dyn Stemmer>) -> Self {
        Self { filter, stemmer }
    }

    pub fn with_filter(mut self, filter: Box<dyn TokenFilter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_stemmer(mut self, stemmer: Box<dyn Stemmer>) -> Self {
        self.stemmer = stemmer;
        self
    }

    /// Lower-case the surface form, replacing it with [`EMPTY_TOKEN`] when the
    /// filter rejects it.
    pub fn resolve_word(&self, form: &str) -> String {
        let word = form.to_lowercase();
        if self.filter.accept(&word) {
            word
        } else {
            EMPTY_TOKEN.to_string()
        }
    }

    /// Pick the stored lemma. A parser-supplied lemma always wins; the
    /// placeholder falls back to the stemmed resolved word.
    pub fn resolve_lemma(&self, lemma: &str, word: &str) -> String {
        if lemma == PLACEHOLDER {
            self.stemmer.stem(word)
        } else {
            lemma.to_string()
        }
    }
}

impl std::fmt::Debug for WordNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordNormalizer").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_normalizer_lowercases() {
        let normalizer = WordNormalizer::default();
        assert_eq!(normalizer.resolve_word("Dogs"), "dogs");
        assert_eq!(normalizer.resolve_lemma("_", "dogs"), "dogs");
        assert_eq!(normalizer.resolve_lemma("dog", "dogs"), "dog");
    }

    #[test]
    fn test_rejected_word_becomes_empty_token() {
        let normalizer = WordNormalizer::default()
            .with_filter(Box::new(|word: &str| word != "the"));

        assert_eq!(normalizer.resolve_word("The"), EMPTY_TOKEN);
        assert_eq!(normalizer.resolve_word("cat"), "cat");
    }

    #[test]
    fn test_stemmer_only_applies_to_placeholder() {
        let normalizer = WordNormalizer::default()
            .with_stemmer(Box::new(|word: &str| word.trim_end_matches('s').to_string()));

        assert_eq!(normalizer.resolve_lemma("_", "cats"), "cat");
        assert_eq!(normalizer.resolve_lemma("feline", "cats"), "feline");
    }

    #[test]
    fn test_stemmer_sees_filtered_word() {
        let normalizer = WordNormalizer::new(
            Box::new(WordListFilter::new(["the"], FilterMode::Exclude)),
            Box::new(|word: &str| format!("<{}>", word)),
        );

        let word = normalizer.resolve_word("THE");
        assert_eq!(normalizer.resolve_lemma("_", &word), "<>");
    }

    #[test]
    fn test_word_list_modes() {
        let stop = WordListFilter::new(["The", "a"], FilterMode::Exclude);
        assert!(!stop.accept("the"));
        assert!(stop.accept("dog"));

        let allow = WordListFilter::new(["dog"], FilterMode::Include);
        assert!(allow.accept("dog"));
        assert!(!allow.accept("cat"));
        assert_eq!(allow.mode(), FilterMode::Include);
    }

    #[test]
    fn test_word_list_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stop.txt");
        fs::write(&path, "# english stop words\nthe\n\n  A  \nof\n").unwrap();

        let filter = WordListFilter::load_from_file(&path, FilterMode::Exclude).unwrap();
        assert_eq!(filter.len(), 3);
        assert!(!filter.accept("a"));
        assert!(filter.accept("# english stop words"));
    }
}
