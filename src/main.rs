// Trains a network described by a NetworkSpec JSON file on a synthetic
// linear-regression task, or a built-in single-layer model when no file is
// given.
//
//   cargo run -- [spec.json]
//   RUST_LOG=debug cargo run
//
// More demos:
//   cargo run --example xor
//   cargo run --example linear_regression
use std::process::ExitCode;

use ferrite_backprop::{
    ActivationFunction, Dataset, LayerSpec, LossType, Matrix, NetworkSpec, NeuralNetOptimizer,
    NnError, OptimizerConfig, TrainConfig, WeightInit, train_loop,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn default_spec() -> NetworkSpec {
    NetworkSpec {
        name: "linear".into(),
        layers: vec![
            LayerSpec::Dense { inputs: 3, outputs: 1, bias: true, init: WeightInit::Xavier },
            LayerSpec::Activation { function: ActivationFunction::Identity },
        ],
        loss: LossType::Mse,
        optimizer: OptimizerConfig { learning_rate: 0.05, momentum: 0.9 },
    }
}

/// `samples` columns of uniform features and `y = Σ (i + 1)·x_i − 0.5` per output row.
fn synthetic_data(features: usize, outputs: usize, samples: usize) -> (Matrix, Matrix) {
    let x = Matrix::random(features, samples);
    let mut y = Matrix::zeros(outputs, samples);
    for r in 0..outputs {
        for j in 0..samples {
            y.data[r][j] = (0..features).map(|i| (i + 1) as f64 * x.data[i][j]).sum::<f64>() - 0.5;
        }
    }
    (x, y)
}

fn run() -> ferrite_backprop::Result<()> {
    let spec = match std::env::args().nth(1) {
        Some(path) => NetworkSpec::load_json(&path)?,
        None => default_spec(),
    };

    let graph = spec.build();

    // A fixed-shape reshape at the front pins the batch width as well.
    let (rows, cols) = graph.input_shape();
    let features = rows.unwrap_or(1);
    let batch_size = cols.unwrap_or(32);
    let output = graph.forward(&Matrix::zeros(features, batch_size))?;
    if output.cols != batch_size {
        return Err(NnError::InvalidConfig(format!(
            "graph maps a batch of {batch_size} columns to {} columns; training needs one column per sample",
            output.cols
        )));
    }
    let outputs = output.rows;

    info!(name = %spec.name, features, outputs, batch_size, parameters = graph.parameter_count(), "training");

    let (x, y) = synthetic_data(features, outputs, batch_size * 8);
    let (val_x, val_y) = synthetic_data(features, outputs, batch_size * 2);

    let mut optimizer = spec.optimizer.build()?;
    optimizer.prepare(|| graph);

    let config = TrainConfig::new(100, batch_size);
    let final_loss = train_loop(
        &mut optimizer,
        Dataset::new(&x, &y)?,
        Some(Dataset::new(&val_x, &val_y)?),
        &spec.loss,
        &config,
    )?;

    info!(final_loss, "training finished");
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
