use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Deserialize;

/// One row of a comments CSV. Every other column is ignored.
#[derive(Debug, Deserialize)]
struct CommentRecord {
    #[serde(rename = "commentBody")]
    comment_body: String,
}

/// Lists the comment CSV files in `dir`: regular files whose name contains
/// `Comments` and whose extension is `csv`.
pub fn discover_comment_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let is_csv = path.extension().is_some_and(|ext| ext == "csv");
        let is_comments = path
            .file_name()
            .is_some_and(|name| name.to_string_lossy().contains("Comments"));
        if is_csv && is_comments {
            files.push(path);
        }
    }

    Ok(files)
}

/// Reads the `commentBody` column out of every file, dropping rows whose body
/// is the literal `"Unknown"` (the source data's null marker).
pub fn load_comments(paths: &[PathBuf]) -> Result<Vec<String>> {
    let mut comments = Vec::new();

    for path in paths {
        let mut reader = csv::Reader::from_path(path)?;
        for record in reader.deserialize::<CommentRecord>() {
            let record = record?;
            if record.comment_body != "Unknown" {
                comments.push(record.comment_body);
            }
        }
    }

    Ok(comments)
}

/// Shuffles the corpus and keeps at most `limit` comments.
pub fn sample_comments<R: Rng>(comments: &mut Vec<String>, limit: usize, rng: &mut R) {
    comments.shuffle(rng);
    comments.truncate(limit);
}

/// Strips ASCII punctuation, lowercases, then drops anything non-ASCII.
///
/// Lowercasing runs before the ASCII filter: a few non-ASCII letters lowercase
/// into ASCII (e.g. the Kelvin sign) and those survive the filter.
pub fn clean_text(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_ascii_punctuation())
        .flat_map(char::to_lowercase)
        .filter(char::is_ascii)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn clean_text_strips_punctuation_and_lowercases() {
        assert_eq!(clean_text("Hello, World!"), "hello world");
        assert_eq!(clean_text("don't-stop"), "dontstop");
        assert_eq!(clean_text("A.B.C."), "abc");
    }

    #[test]
    fn clean_text_drops_non_ascii() {
        assert_eq!(clean_text("caf\u{e9} na\u{ef}ve"), "caf nave");
        assert_eq!(clean_text("\u{1f600} ok"), " ok");
    }

    #[test]
    fn clean_text_keeps_digits_and_whitespace() {
        assert_eq!(clean_text("2 + 2 = 4\n"), "2  2  4\n");
    }

    #[test]
    fn discover_matches_comment_csvs_only() {
        let dir = std::env::temp_dir().join("commentgen_discover_test");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("CommentsJan2017.csv"), "commentBody\nhi\n").unwrap();
        fs::write(dir.join("CommentsFeb2017.csv"), "commentBody\nhi\n").unwrap();
        fs::write(dir.join("ArticlesJan2017.csv"), "headline\nhi\n").unwrap();
        fs::write(dir.join("Comments.txt"), "not a csv").unwrap();

        let mut found = discover_comment_files(&dir).unwrap();
        found.sort();
        let _ = fs::remove_dir_all(&dir);

        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, ["CommentsFeb2017.csv", "CommentsJan2017.csv"]);
    }

    #[test]
    fn load_comments_reads_body_column_and_drops_unknown() {
        let dir = std::env::temp_dir();
        let path = dir.join("commentgen_load_test.csv");
        fs::write(
            &path,
            "approveDate,commentBody,recommendations\n\
             1,first comment,0\n\
             2,Unknown,3\n\
             3,\"second, with a comma\",1\n",
        )
        .unwrap();

        let comments = load_comments(&[path.clone()]).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(comments, ["first comment", "second, with a comma"]);
    }

    #[test]
    fn sample_comments_truncates_to_limit() {
        let mut comments: Vec<String> = (0..50).map(|i| format!("c{i}")).collect();
        let mut rng = StdRng::seed_from_u64(42);
        sample_comments(&mut comments, 10, &mut rng);
        assert_eq!(comments.len(), 10);
    }

    #[test]
    fn sample_comments_is_deterministic_for_a_seed() {
        let base: Vec<String> = (0..20).map(|i| format!("c{i}")).collect();

        let mut a = base.clone();
        sample_comments(&mut a, 5, &mut StdRng::seed_from_u64(42));
        let mut b = base.clone();
        sample_comments(&mut b, 5, &mut StdRng::seed_from_u64(42));

        assert_eq!(a, b);
    }
}
