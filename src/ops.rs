use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    optim::AdamWConfig,
    prelude::*,
    record::{CompactRecorder, FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
    tensor::{activation::softmax, backend::AutodiffBackend},
    train::{
        LearnerBuilder,
        metric::{AccuracyMetric, LossMetric},
    },
};
use log::info;

use crate::dataset::{SequenceDataset, TrainingItem, pad_context};
use crate::model::{CommentModel, CommentModelConfig, CommentModelRecord, SequenceBatcher};
use crate::tokenizer::WordTokenizer;

#[derive(Config)]
pub struct TrainingConfig {
    pub model: CommentModelConfig,
    pub optimizer: AdamWConfig,
    #[config(default = 100)]
    pub num_epochs: usize,
    #[config(default = 256)]
    pub batch_size: usize,
    #[config(default = 8)]
    pub num_workers: usize,
    #[config(default = 42)]
    pub seed: u64,
    #[config(default = 1.0e-3)]
    pub learning_rate: f64,
}

pub fn train<B: AutodiffBackend>(
    artifact_dir: &str,
    config: TrainingConfig,
    device: B::Device,
    train_rows: Vec<TrainingItem>,
    valid_rows: Vec<TrainingItem>,
) -> Result<()> {
    B::seed(config.seed);

    let trainer_loader = DataLoaderBuilder::new(SequenceBatcher {})
        .batch_size(config.batch_size)
        .shuffle(config.seed)
        .num_workers(config.num_workers)
        .build(SequenceDataset::new(train_rows));

    let validator_loader = DataLoaderBuilder::new(SequenceBatcher {})
        .batch_size(config.batch_size)
        .shuffle(config.seed)
        .num_workers(config.num_workers)
        .build(SequenceDataset::new(valid_rows));

    let learner = LearnerBuilder::new(artifact_dir)
        .metric_train_numeric(AccuracyMetric::new())
        .metric_valid_numeric(AccuracyMetric::new())
        .metric_train_numeric(LossMetric::new())
        .metric_valid_numeric(LossMetric::new())
        .with_file_checkpointer(CompactRecorder::new())
        .devices(vec![device.clone()])
        .num_epochs(config.num_epochs)
        .summary()
        .build(
            config.model.init::<B>(&device),
            config.optimizer.init(),
            config.learning_rate,
        );

    let model = learner.fit(trainer_loader, validator_loader);
    model.save_file(
        format!("{artifact_dir}/model"),
        &NamedMpkFileRecorder::<FullPrecisionSettings>::new(),
    )?;
    info!("saved trained model to {artifact_dir}/model.mpk");

    Ok(())
}

/// Greedily extends `seed_text` one word at a time and returns the
/// title-cased result.
pub fn generate<B: Backend>(
    artifact_dir: &str,
    device: B::Device,
    seed_text: &str,
    next_words: usize,
) -> Result<String> {
    let config = TrainingConfig::load(format!("{artifact_dir}/config.json"))?;
    let tokenizer = WordTokenizer::load(format!("{artifact_dir}/tokenizer.json"))?;

    let record: CommentModelRecord<B> = NamedMpkFileRecorder::<FullPrecisionSettings>::new()
        .load(format!("{artifact_dir}/model").into(), &device)?;
    let model: CommentModel<B> = config.model.init(&device).load_record(record);

    let width = config.model.max_sequence_len - 1;
    let mut text = seed_text.to_string();
    let mut tokens = tokenizer.encode(&text);

    for _ in 0..next_words {
        let context = pad_context(&tokens, width);
        let input =
            Tensor::<B, 1, Int>::from_data(context.as_slice(), &device).reshape([1, width]);

        let probs = softmax(model.forward(input), 1);
        let data = probs.to_data();
        let probs = data
            .as_slice::<f32>()
            .expect("Softmax did not return f32 data");

        let next = probs
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i as i32)
            .unwrap_or(0);

        // Predicting the padding id would loop on empty words; stop instead.
        let Some(word) = tokenizer.word(next) else {
            break;
        };

        text.push(' ');
        text.push_str(word);
        tokens.push(next);
    }

    Ok(title_case(&text))
}

fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
