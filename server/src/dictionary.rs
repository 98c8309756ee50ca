//! Word supply for new rounds

use crate::error::ServerError;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::MAX_WORD;
use std::fs;
use std::path::Path;

/// Anything that can hand the game a target word for a new round
pub trait WordSource: Send {
    fn pick_word(&mut self) -> String;
}

/// Words loaded from a file, one per line, picked uniformly at random
#[derive(Debug)]
pub struct Dictionary {
    words: Vec<String>,
    rng: StdRng,
}

impl Dictionary {
    /// Reads a dictionary file, keeping only playable words
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ServerError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ServerError::Dictionary {
            path: path.to_path_buf(),
            source,
        })?;

        let words = parse_words(&contents);
        info!("Loaded {} words from {}", words.len(), path.display());

        Self::from_words(words).ok_or_else(|| ServerError::EmptyDictionary(path.to_path_buf()))
    }

    /// Builds a dictionary from an in-memory list; `None` if nothing is playable
    pub fn from_words<I, S>(words: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_rng(words, StdRng::from_entropy())
    }

    /// Like [`Dictionary::from_words`] but with a reproducible word order
    pub fn seeded<I, S>(words: I, seed: u64) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_rng(words, StdRng::seed_from_u64(seed))
    }

    fn with_rng<I, S>(words: I, rng: StdRng) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words: Vec<String> = words
            .into_iter()
            .map(Into::into)
            .filter(|word| is_playable(word))
            .collect();

        if words.is_empty() {
            None
        } else {
            Some(Self { words, rng })
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl WordSource for Dictionary {
    fn pick_word(&mut self) -> String {
        let index = self.rng.gen_range(0..self.words.len());
        self.words[index].clone()
    }
}

/// Splits file contents into lowercase candidate words
fn parse_words(contents: &str) -> Vec<String> {
    let mut skipped = 0;
    let words: Vec<String> = contents
        .lines()
        .map(|line| line.trim().to_ascii_lowercase())
        .filter(|word| !word.is_empty())
        .filter(|word| {
            let ok = is_playable(word);
            if !ok {
                skipped += 1;
            }
            ok
        })
        .collect();

    if skipped > 0 {
        warn!("Skipped {} dictionary entries that are not plain words", skipped);
    }
    words
}

fn is_playable(word: &str) -> bool {
    !word.is_empty() && word.len() <= MAX_WORD && word.bytes().all(|b| b.is_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("wordsrv-{}-{}", std::process::id(), name));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_parse_words_filters_and_lowercases() {
        let words = parse_words("Cat\n  dog \n\nnot-a-word\nx1\nbird\r\n");
        assert_eq!(words, vec!["cat", "dog", "bird"]);
    }

    #[test]
    fn test_overlong_words_are_skipped() {
        let long = "a".repeat(MAX_WORD + 1);
        let words = parse_words(&format!("{}\nok\n", long));
        assert_eq!(words, vec!["ok"]);
    }

    #[test]
    fn test_single_word_is_always_picked() {
        let mut dictionary = Dictionary::from_words(["cat"]).unwrap();
        for _ in 0..10 {
            assert_eq!(dictionary.pick_word(), "cat");
        }
    }

    #[test]
    fn test_picks_come_from_the_list() {
        let mut dictionary = Dictionary::seeded(["cat", "dog", "emu"], 7).unwrap();
        for _ in 0..50 {
            let word = dictionary.pick_word();
            assert!(["cat", "dog", "emu"].contains(&word.as_str()));
        }
    }

    #[test]
    fn test_empty_list_is_rejected() {
        assert!(Dictionary::from_words(Vec::<String>::new()).is_none());
        assert!(Dictionary::from_words(["Upper", "12"]).is_none());
    }

    #[test]
    fn test_load_from_file() {
        let path = temp_file("words.txt", "apple\nbanana\n");
        let dictionary = Dictionary::load(&path).unwrap();
        assert_eq!(dictionary.len(), 2);
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_missing_file() {
        let result = Dictionary::load("/definitely/not/here/words.txt");
        assert!(matches!(result, Err(ServerError::Dictionary { .. })));
    }

    #[test]
    fn test_load_file_without_words() {
        let path = temp_file("empty.txt", "\n123\n");
        let result = Dictionary::load(&path);
        assert!(matches!(result, Err(ServerError::EmptyDictionary(_))));
        fs::remove_file(path).ok();
    }
}
