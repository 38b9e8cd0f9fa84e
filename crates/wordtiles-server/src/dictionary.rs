//! Word list used to check boards.

use crate::error::{ServerError, ServerResult};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Set of accepted words, stored upper case.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    words: HashSet<String>,
}

impl Dictionary {
    /// Dictionary of `words`, trimmed and uppercased. Blank entries are skipped.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_ascii_uppercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    /// Load a newline-separated word list. An empty list is an error.
    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Dictionary(format!("{}: {}", path.display(), e)))?;
        let dict = Self::from_words(text.lines());
        if dict.is_empty() {
            return Err(ServerError::Dictionary(format!("{}: no words", path.display())));
        }
        info!("Loaded {} words from {}", dict.len(), path.display());
        Ok(dict)
    }

    /// True when `word` is in the list. Case-sensitive; words are stored uppercase.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Number of words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// True when no words were loaded.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_words_normalises() {
        let dict = Dictionary::from_words(["cat", " Act ", ""]);
        assert_eq!(dict.len(), 2);
        assert!(dict.contains("CAT"));
        assert!(dict.contains("ACT"));
        assert!(!dict.contains("cat"));
    }

    #[test]
    fn test_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "QI\nZA\r\nTOO").unwrap();
        let dict = Dictionary::load(file.path()).unwrap();
        assert_eq!(dict.len(), 3);
        assert!(dict.contains("ZA"));
    }

    #[test]
    fn test_load_missing_or_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Dictionary::load(dir.path().join("missing.txt")),
            Err(ServerError::Dictionary(_))
        ));
        let empty = tempfile::NamedTempFile::new().unwrap();
        assert!(Dictionary::load(empty.path()).is_err());
    }
}
