use std::sync::atomic::Ordering;
use std::time::Instant;

use rand::seq::SliceRandom;
use tracing::{info, warn};

use crate::error::{NnError, Result};
use crate::loss::LossFunction;
use crate::math::matrix::Matrix;
use crate::optim::NeuralNetOptimizer;
use crate::train::epoch_stats::EpochStats;
use crate::train::train_config::TrainConfig;

/// Inputs and targets laid out one sample per column.
#[derive(Debug, Clone, Copy)]
pub struct Dataset<'a> {
    pub inputs: &'a Matrix,
    pub targets: &'a Matrix,
}

impl<'a> Dataset<'a> {
    /// Fails unless `inputs` and `targets` hold the same number of samples.
    pub fn new(inputs: &'a Matrix, targets: &'a Matrix) -> Result<Dataset<'a>> {
        if inputs.cols != targets.cols {
            return Err(NnError::ShapeMismatch {
                op: "dataset",
                left: inputs.shape(),
                right: targets.shape(),
            });
        }
        Ok(Dataset { inputs, targets })
    }

    pub fn samples(&self) -> usize {
        self.inputs.cols
    }
}

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains the optimizer's prepared target for `config.epochs` epochs and
/// returns the training loss of the **last completed epoch**.
///
/// # Arguments
/// - `optimizer`  — a prepared optimizer; its target is modified in place
/// - `train`      — training samples
/// - `validation` — optional held-out samples, evaluated after every epoch
/// - `loss_fn`    — objective passed to every `optimize` call
/// - `config`     — epochs, batch size, optional progress channel and stop flag
///
/// # Early termination
/// The loop breaks early if:
/// - the `progress_tx` receiver has been dropped, **or**
/// - `config.stop_flag` is set to `true`.
///
/// # Errors
/// `InvalidConfig` for a zero batch size, `NotPrepared` for an unprepared
/// optimizer, `EmptyBatch` for an empty training set, and any error raised by
/// a training step.
pub fn train_loop<O: NeuralNetOptimizer>(
    optimizer: &mut O,
    train: Dataset<'_>,
    validation: Option<Dataset<'_>>,
    loss_fn: &dyn LossFunction,
    config: &TrainConfig,
) -> Result<f64> {
    config.validate()?;
    if optimizer.target().is_none() {
        return Err(NnError::NotPrepared);
    }
    if train.samples() == 0 {
        return Err(NnError::EmptyBatch);
    }

    let mut indices: Vec<usize> = (0..train.samples()).collect();
    let mut rng = rand::thread_rng();
    let mut last_train_loss = 0.0;

    for epoch in 0..config.epochs {
        if stop_requested(config) {
            warn!(epoch, "stop flag raised; ending training");
            break;
        }

        let t_start = Instant::now();

        if config.shuffle {
            indices.shuffle(&mut rng);
        }

        let train_loss = run_one_epoch(optimizer, &train, &indices, epoch, config.batch_size, loss_fn)?;
        last_train_loss = train_loss;

        let elapsed_ms = t_start.elapsed().as_millis() as u64;

        let val_loss = match validation {
            Some(ref set) => Some(evaluate(&*optimizer, set, loss_fn)?),
            None => None,
        };

        info!(epoch, train_loss, ?val_loss, elapsed_ms, "epoch complete");

        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            train_loss,
            val_loss,
            elapsed_ms,
        };

        if let Some(ref tx) = config.progress_tx {
            if tx.send(stats).is_err() {
                warn!(epoch, "progress receiver dropped; ending training");
                break;
            }
        }
    }

    Ok(last_train_loss)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn stop_requested(config: &TrainConfig) -> bool {
    config.stop_flag
        .as_ref()
        .is_some_and(|flag| flag.load(Ordering::Relaxed))
}

/// One pass over `indices` in `batch_size` chunks. Returns the batch losses
/// averaged with batch-size weights.
fn run_one_epoch<O: NeuralNetOptimizer>(
    optimizer: &mut O,
    train: &Dataset<'_>,
    indices: &[usize],
    epoch: usize,
    batch_size: usize,
    loss_fn: &dyn LossFunction,
) -> Result<f64> {
    let mut total_loss = 0.0;

    for batch in indices.chunks(batch_size) {
        let x = train.inputs.select_columns(batch)?;
        let y = train.targets.select_columns(batch)?;

        let result = optimizer.optimize(epoch, &x, &y, loss_fn)?;
        total_loss += result.loss * batch.len() as f64;
    }

    Ok(total_loss / indices.len() as f64)
}

/// Loss of the current target on `set`, without touching any parameter.
fn evaluate<O: NeuralNetOptimizer>(
    optimizer: &O,
    set: &Dataset<'_>,
    loss_fn: &dyn LossFunction,
) -> Result<f64> {
    let target = optimizer.target().ok_or(NnError::NotPrepared)?;
    let predicted = target.forward(set.inputs)?;
    loss_fn.apply(set.targets, &predicted)
}
