use std::cmp::Reverse;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Word-level vocabulary fitted on a cleaned corpus.
///
/// Words are ranked by descending frequency (ties broken by first occurrence)
/// and numbered from 1; id 0 is reserved for padding. The ranked list is what
/// gets serialized, so ids are stable across save/load.
#[derive(Debug, Serialize, Deserialize)]
pub struct WordTokenizer {
    words: Vec<String>,
    #[serde(skip)]
    index: HashMap<String, i32>,
}

impl WordTokenizer {
    pub fn fit(lines: &[String]) -> Self {
        let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
        let mut order = 0usize;

        for line in lines {
            for word in line.split_whitespace() {
                let entry = counts.entry(word).or_insert_with(|| {
                    order += 1;
                    (0, order)
                });
                entry.0 += 1;
            }
        }

        let mut ranked: Vec<(&str, usize, usize)> = counts
            .into_iter()
            .map(|(word, (count, first_seen))| (word, count, first_seen))
            .collect();
        ranked.sort_by_key(|&(_, count, first_seen)| (Reverse(count), first_seen));

        let words = ranked.into_iter().map(|(word, _, _)| word.to_owned()).collect();

        let mut tokenizer = Self {
            words,
            index: HashMap::new(),
        };
        tokenizer.rebuild_index();
        tokenizer
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .words
            .iter()
            .enumerate()
            .map(|(i, word)| (word.clone(), i as i32 + 1))
            .collect();
    }

    /// Vocabulary size plus one: the classifier's class count, including the
    /// padding id.
    pub fn total_words(&self) -> usize {
        self.words.len() + 1
    }

    /// Maps words to ids, silently skipping out-of-vocabulary words.
    pub fn encode(&self, text: &str) -> Vec<i32> {
        text.split_whitespace()
            .filter_map(|word| self.index.get(word).copied())
            .collect()
    }

    pub fn word(&self, id: i32) -> Option<&str> {
        if id < 1 {
            return None;
        }
        self.words.get(id as usize - 1).map(String::as_str)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer(BufWriter::new(file), self)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let mut tokenizer: Self = serde_json::from_reader(BufReader::new(file))?;
        tokenizer.rebuild_index();
        Ok(tokenizer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn fit_ranks_by_frequency_then_first_occurrence() {
        let tokenizer = WordTokenizer::fit(&lines(&["b a a", "c b a"]));
        // a: 3, b: 2, c: 1
        assert_eq!(tokenizer.word(1), Some("a"));
        assert_eq!(tokenizer.word(2), Some("b"));
        assert_eq!(tokenizer.word(3), Some("c"));
        assert_eq!(tokenizer.total_words(), 4);
    }

    #[test]
    fn fit_breaks_frequency_ties_by_first_occurrence() {
        let tokenizer = WordTokenizer::fit(&lines(&["zebra apple", "zebra apple"]));
        assert_eq!(tokenizer.word(1), Some("zebra"));
        assert_eq!(tokenizer.word(2), Some("apple"));
    }

    #[test]
    fn encode_skips_out_of_vocabulary_words() {
        let tokenizer = WordTokenizer::fit(&lines(&["a a b"]));
        assert_eq!(tokenizer.encode("a missing b"), vec![1, 2]);
        assert_eq!(tokenizer.encode("all unknown here"), Vec::<i32>::new());
    }

    #[test]
    fn word_rejects_padding_and_out_of_range_ids() {
        let tokenizer = WordTokenizer::fit(&lines(&["a b"]));
        assert_eq!(tokenizer.word(0), None);
        assert_eq!(tokenizer.word(-1), None);
        assert_eq!(tokenizer.word(99), None);
    }

    #[test]
    fn save_load_round_trip_preserves_ids() {
        let tokenizer = WordTokenizer::fit(&lines(&["the cat sat", "the cat"]));
        let path = std::env::temp_dir().join("commentgen_tokenizer_test.json");

        tokenizer.save(&path).unwrap();
        let loaded = WordTokenizer::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.total_words(), tokenizer.total_words());
        assert_eq!(loaded.encode("the cat sat"), tokenizer.encode("the cat sat"));
        assert_eq!(loaded.word(1), Some("the"));
    }
}
