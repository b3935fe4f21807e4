use std::{env, fs, io, sync::Arc};

use log::info;
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Normal};
use serde::Deserialize;

use paratrain::{
    ParameterStore, Strategy, TrainErr, TrainerBuilder, TrainerConfig,
    initialization::RandParamGen,
    optimization::GradientStep,
    regression::LeastSquares,
    storage::{Weights, WildTensor},
    tensor::{DenseTensor, Tensor},
};

const KEY: &str = "w";

/// The settings of the synthetic regression problem the demo learns.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct DemoConfig {
    trainer: TrainerConfig,
    strategy: Strategy,
    examples: usize,
    features: usize,
    learning_rate: f32,
    steps: usize,
    noise: f32,
    seed: Option<u64>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            trainer: TrainerConfig::default(),
            strategy: Strategy::ThreadLocalBatch,
            examples: 1000,
            features: 16,
            learning_rate: 0.001,
            steps: 100,
            noise: 0.01,
            seed: None,
        }
    }
}

fn load_config() -> io::Result<DemoConfig> {
    let Some(path) = env::args().nth(1) else {
        return Ok(DemoConfig::default());
    };

    let json = fs::read_to_string(&path)?;
    let config = serde_json::from_str(&json).map_err(TrainErr::from)?;
    info!("loaded config from {path}");
    Ok(config)
}

fn generate_examples(
    config: &DemoConfig,
    rng: &mut StdRng,
) -> paratrain::Result<(DenseTensor, Vec<LeastSquares<DenseTensor>>)> {
    let shape = [config.features];

    let mut truth_gen = RandParamGen::uniform(&mut *rng, config.features, -1., 1.)?;
    let truth = WildTensor::generate(&shape, &mut truth_gen)?.snapshot();
    let noise = Normal::new(0., config.noise)?;

    let mut examples = Vec::with_capacity(config.examples);
    for _ in 0..config.examples {
        let values = (0..config.features).map(|_| rng.random_range(-1.0..1.0)).collect();
        let x = DenseTensor::from_vec(&shape, values)?;
        let y = truth.dot(&x)? + noise.sample(rng);
        examples.push(LeastSquares::new(KEY, x, y));
    }

    Ok((truth, examples))
}

fn main() -> io::Result<()> {
    env_logger::init();

    let config = load_config()?;
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let (truth, examples) = generate_examples(&config, &mut rng)?;

    let store = Arc::new(ParameterStore::new());
    store.insert(KEY, WildTensor::zeros(&[config.features]));

    info!(
        "training {:?} over {} examples with {} worker(s)",
        config.strategy,
        examples.len(),
        config.trainer.workers
    );

    let step = GradientStep::with_budget(config.learning_rate, config.steps);
    let builder = TrainerBuilder::new(config.trainer.clone());
    let mut trainer =
        builder.build::<LeastSquares<DenseTensor>, _>(&config.strategy, Arc::clone(&store), step)?;
    trainer.train_from_examples(&examples)?;

    let learned = store.get(KEY)?;
    let error = truth
        .to_vec()
        .iter()
        .enumerate()
        .map(|(i, t)| (learned.get(i) - t).powi(2))
        .sum::<f32>()
        .sqrt();

    info!(features = config.features, weights_error = error; "training finished");
    Ok(())
}
