use burn::{
    config::Config,
    data::dataloader::batcher::Batcher,
    module::Module,
    nn::{
        Dropout, DropoutConfig, Embedding, EmbeddingConfig, Linear, LinearConfig, Lstm, LstmConfig,
        loss::CrossEntropyLossConfig,
    },
    prelude::Backend,
    tensor::{Int, Tensor, TensorData, backend::AutodiffBackend},
    train::{ClassificationOutput, TrainOutput, TrainStep, ValidStep},
};

use crate::dataset::TrainingItem;

#[derive(Config)]
pub struct CommentModelConfig {
    /// Class count: vocabulary size plus the padding id.
    pub vocab_size: usize,

    /// Longest n-gram sequence seen at fit time; contexts are padded to one
    /// less than this.
    pub max_sequence_len: usize,

    #[config(default = 10)]
    d_embed: usize,

    #[config(default = 100)]
    d_hidden: usize,

    #[config(default = 0.1)]
    dropout: f64,
}

impl CommentModelConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> CommentModel<B> {
        CommentModel {
            embedding: EmbeddingConfig::new(self.vocab_size, self.d_embed).init(device),
            lstm: LstmConfig::new(self.d_embed, self.d_hidden, true).init(device),
            dropout: DropoutConfig::new(self.dropout).init(),
            linear: LinearConfig::new(self.d_hidden, self.vocab_size).init(device),
        }
    }
}

#[derive(Module, Debug)]
pub struct CommentModel<B: Backend> {
    embedding: Embedding<B>,
    lstm: Lstm<B>,
    dropout: Dropout,
    linear: Linear<B>,
}

impl<B: Backend> CommentModel<B> {
    /// `[batch, context]` token ids to `[batch, vocab]` logits. Softmax is
    /// left to the loss and to the sampler.
    pub fn forward(&self, contexts: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        let x = self.embedding.forward(contexts);
        let (_, state) = self.lstm.forward(x, None);
        let hidden = self.dropout.forward(state.hidden);
        self.linear.forward(hidden)
    }

    pub fn forward_classification(
        &self,
        contexts: Tensor<B, 2, Int>,
        targets: Tensor<B, 1, Int>,
    ) -> ClassificationOutput<B> {
        let output = self.forward(contexts);
        let loss = CrossEntropyLossConfig::new()
            .init(&output.device())
            .forward(output.clone(), targets.clone());
        ClassificationOutput {
            loss,
            output,
            targets,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SequenceBatcher {}

#[derive(Clone, Debug)]
pub struct SequenceBatch<B: Backend> {
    pub contexts: Tensor<B, 2, Int>,
    pub targets: Tensor<B, 1, Int>,
}

impl<B: Backend> Batcher<TrainingItem, SequenceBatch<B>> for SequenceBatcher {
    fn batch(&self, items: Vec<TrainingItem>) -> SequenceBatch<B> {
        let contexts = items
            .iter()
            .map(|i| Tensor::<B, 1, Int>::from(TensorData::from(i.context.as_slice())))
            .collect::<Vec<_>>();

        let targets = items
            .iter()
            .map(|i| Tensor::<B, 1, Int>::from(TensorData::from([i.target].as_slice())))
            .collect::<Vec<_>>();

        SequenceBatch {
            contexts: Tensor::stack(contexts, 0),
            targets: Tensor::cat(targets, 0),
        }
    }
}

impl<B: AutodiffBackend> TrainStep<SequenceBatch<B>, ClassificationOutput<B>> for CommentModel<B> {
    fn step(&self, item: SequenceBatch<B>) -> TrainOutput<ClassificationOutput<B>> {
        let item = self.forward_classification(item.contexts, item.targets);

        TrainOutput::new(self, item.loss.backward(), item)
    }
}

impl<B: Backend> ValidStep<SequenceBatch<B>, ClassificationOutput<B>> for CommentModel<B> {
    fn step(&self, item: SequenceBatch<B>) -> ClassificationOutput<B> {
        self.forward_classification(item.contexts, item.targets)
    }
}
