use std::{env, fs};

use anyhow::{Result, ensure};
use burn::{
    backend::{Autodiff, Wgpu, wgpu::WgpuDevice},
    config::Config,
    optim::AdamWConfig,
};
use log::info;
use model::CommentModelConfig;
use ops::TrainingConfig;
use rand::{SeedableRng, rngs::StdRng};
use tokenizer::WordTokenizer;

mod corpus;
mod dataset;
mod model;
mod ops;
mod tokenizer;

const DATA_DIR: &str = "data";
const ARTIFACT_DIR: &str = "models";
const SAMPLE_LIMIT: usize = 1000;
const CORPUS_SEED: u64 = 42;

type CGBackend = Wgpu;
type CGAutodiffBackend = Autodiff<CGBackend>;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = env::args().collect::<Vec<_>>();
    let op = args.get(1).map(String::as_str).unwrap_or("generate");

    let device = WgpuDevice::DefaultDevice;

    if "train" == op {
        train(device)?;
    } else {
        let seed_text = args.get(2).map(String::as_str).unwrap_or("the");
        let next_words = match args.get(3) {
            Some(n) => n.parse()?,
            None => 20,
        };
        let text =
            ops::generate::<CGAutodiffBackend>(ARTIFACT_DIR, device, seed_text, next_words)?;
        println!("{text}");
    }

    Ok(())
}

fn train(device: WgpuDevice) -> Result<()> {
    let files = corpus::discover_comment_files(DATA_DIR)?;
    info!("found {} comment files under {DATA_DIR}/", files.len());

    let mut comments = corpus::load_comments(&files)?;
    info!("loaded {} comments", comments.len());

    let mut rng = StdRng::seed_from_u64(CORPUS_SEED);
    corpus::sample_comments(&mut comments, SAMPLE_LIMIT, &mut rng);
    info!("training on {} sampled comments", comments.len());

    let lines = comments
        .iter()
        .map(|c| corpus::clean_text(c))
        .collect::<Vec<_>>();

    let tokenizer = WordTokenizer::fit(&lines);
    info!("vocabulary holds {} word classes", tokenizer.total_words());

    let sequences = dataset::ngram_sequences(&tokenizer, &lines);
    let max_len = dataset::max_sequence_len(&sequences);
    let rows = dataset::pad_rows(&sequences, max_len);
    ensure!(!rows.is_empty(), "corpus produced no training sequences");
    info!("{} training sequences, padded to length {max_len}", rows.len());

    let split = rows.len() * 9 / 10;
    let (train_rows, valid_rows) = rows.split_at(split.max(1));

    fs::create_dir_all(ARTIFACT_DIR)?;
    tokenizer.save(format!("{ARTIFACT_DIR}/tokenizer.json"))?;

    let config = TrainingConfig::new(
        CommentModelConfig::new(tokenizer.total_words(), max_len),
        AdamWConfig::new(),
    );
    config.save(format!("{ARTIFACT_DIR}/config.json"))?;

    ops::train::<CGAutodiffBackend>(
        ARTIFACT_DIR,
        config,
        device,
        train_rows.to_vec(),
        valid_rows.to_vec(),
    )
}
