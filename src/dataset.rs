use burn::data::dataset::Dataset;

use crate::tokenizer::WordTokenizer;

/// One padded predictor row and its label: the sequence's final token.
#[derive(Clone, Debug)]
pub struct TrainingItem {
    pub context: Vec<i32>,
    pub target: i32,
}

/// Expands each line into its n-gram prefixes: for encoded tokens `t0..tn`,
/// emits `[t0,t1]`, `[t0,t1,t2]`, and so on. Lines with fewer than two
/// in-vocabulary tokens contribute nothing.
pub fn ngram_sequences(tokenizer: &WordTokenizer, lines: &[String]) -> Vec<Vec<i32>> {
    let mut sequences = Vec::new();

    for line in lines {
        let tokens = tokenizer.encode(line);
        for end in 2..=tokens.len() {
            sequences.push(tokens[..end].to_vec());
        }
    }

    sequences
}

pub fn max_sequence_len(sequences: &[Vec<i32>]) -> usize {
    sequences.iter().map(Vec::len).max().unwrap_or(0)
}

/// Takes the last `width` tokens and pre-pads with zeros up to `width`.
pub fn pad_context(tokens: &[i32], width: usize) -> Vec<i32> {
    let tail = &tokens[tokens.len().saturating_sub(width)..];
    let mut padded = vec![0; width - tail.len()];
    padded.extend_from_slice(tail);
    padded
}

/// Pre-pads every sequence to `max_len` and splits off the final token as the
/// label, leaving contexts of uniform width `max_len - 1`.
pub fn pad_rows(sequences: &[Vec<i32>], max_len: usize) -> Vec<TrainingItem> {
    sequences
        .iter()
        .map(|seq| {
            let (last, rest) = seq.split_last().expect("sequences have length >= 2");
            TrainingItem {
                context: pad_context(rest, max_len - 1),
                target: *last,
            }
        })
        .collect()
}

pub struct SequenceDataset {
    rows: Vec<TrainingItem>,
}

impl SequenceDataset {
    pub fn new(rows: Vec<TrainingItem>) -> Self {
        Self { rows }
    }
}

impl Dataset<TrainingItem> for SequenceDataset {
    fn get(&self, index: usize) -> Option<TrainingItem> {
        self.rows.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.rows.len()
    }
}
