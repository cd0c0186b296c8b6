// Epoch/mini-batch training loop over the optimizer.

use std::sync::atomic::AtomicBool;
use std::sync::{mpsc, Arc};

use approx::assert_relative_eq;

use ferrite_backprop::{
    ActivationFunction, ActivationLayer, BiasedWeightLayer, CompositeLayer, Dataset,
    GradientDescentOptimizer, Layer, LossType, Matrix, MseLoss, NeuralNetOptimizer, NnError,
    TrainConfig, train_loop,
};

/// `y = 2·x0 − 3·x1 + 1` on a deterministic grid.
fn linear_data(samples: usize) -> (Matrix, Matrix) {
    let mut x = Matrix::zeros(2, samples);
    let mut y = Matrix::zeros(1, samples);
    for j in 0..samples {
        let t = j as f64 / samples as f64;
        x.data[0][j] = 2.0 * t - 1.0;
        x.data[1][j] = (7.0 * t).cos();
        y.data[0][j] = 2.0 * x.data[0][j] - 3.0 * x.data[1][j] + 1.0;
    }
    (x, y)
}

fn linear_model() -> Layer {
    CompositeLayer::new(vec![
        BiasedWeightLayer::new(Matrix::zeros(1, 2), Matrix::zeros(1, 1)).unwrap().into(),
        ActivationLayer::new(ActivationFunction::Identity).into(),
    ]).into()
}

fn prepared(learning_rate: f64, momentum: f64) -> GradientDescentOptimizer {
    let mut optimizer = GradientDescentOptimizer::new(learning_rate, momentum);
    optimizer.prepare(linear_model);
    optimizer
}

#[test]
fn training_reduces_loss_and_reports_every_epoch() {
    let (x, y) = linear_data(40);
    let (val_x, val_y) = linear_data(10);
    let mut optimizer = prepared(0.05, 0.9);

    let (tx, rx) = mpsc::channel();
    let config = TrainConfig::new(30, 8).with_progress(tx);
    let final_loss = train_loop(
        &mut optimizer,
        Dataset::new(&x, &y).unwrap(),
        Some(Dataset::new(&val_x, &val_y).unwrap()),
        &LossType::Mse,
        &config,
    ).unwrap();
    drop(config);

    let stats: Vec<_> = rx.iter().collect();
    assert_eq!(stats.len(), 30);
    assert_eq!(stats.iter().map(|s| s.epoch).collect::<Vec<_>>(), (0..30).collect::<Vec<_>>());
    assert!(stats.iter().all(|s| s.total_epochs == 30 && s.val_loss.is_some()));

    assert_relative_eq!(final_loss, stats[29].train_loss);
    assert!(stats[29].train_loss < stats[0].train_loss * 0.1);
    assert!(stats[29].val_loss.unwrap() < stats[0].val_loss.unwrap());
}

#[test]
fn full_batch_epoch_equals_one_optimize_step() {
    let (x, y) = linear_data(12);

    let mut looped = prepared(0.1, 0.0);
    let config = TrainConfig::new(1, 12).with_shuffle(false);
    let loss = train_loop(&mut looped, Dataset::new(&x, &y).unwrap(), None, &MseLoss, &config).unwrap();

    let mut direct = prepared(0.1, 0.0);
    let expected = direct.optimize(0, &x, &y, &MseLoss).unwrap().loss;

    assert_relative_eq!(loss, expected, epsilon = 1e-12);
    assert_eq!(looped.target(), direct.target());
}

#[test]
fn epoch_loss_is_weighted_by_batch_size() {
    let (x, y) = linear_data(5);

    // Zero-initialised model, so every batch loss is the batch's mean(y²)
    // until the first update; a learning rate this small keeps it there.
    let mut optimizer = prepared(1e-12, 0.0);
    let config = TrainConfig::new(1, 2).with_shuffle(false);
    let loss = train_loop(&mut optimizer, Dataset::new(&x, &y).unwrap(), None, &MseLoss, &config).unwrap();

    let mean_sq = y.data[0].iter().map(|v| v * v).sum::<f64>() / 5.0;
    assert_relative_eq!(loss, mean_sq, epsilon = 1e-6);
}

#[test]
fn dropped_receiver_stops_after_first_epoch() {
    let (x, y) = linear_data(6);

    let (tx, rx) = mpsc::channel();
    drop(rx);
    let mut looped = prepared(0.1, 0.0);
    let config = TrainConfig::new(50, 6).with_shuffle(false).with_progress(tx);
    train_loop(&mut looped, Dataset::new(&x, &y).unwrap(), None, &MseLoss, &config).unwrap();

    let mut direct = prepared(0.1, 0.0);
    direct.optimize(0, &x, &y, &MseLoss).unwrap();

    assert_eq!(looped.target(), direct.target());
}

#[test]
fn raised_stop_flag_skips_training() {
    let (x, y) = linear_data(6);
    let mut optimizer = prepared(0.1, 0.0);

    let flag = Arc::new(AtomicBool::new(true));
    let config = TrainConfig::new(10, 2).with_stop_flag(flag);
    let loss = train_loop(&mut optimizer, Dataset::new(&x, &y).unwrap(), None, &MseLoss, &config).unwrap();

    assert_eq!(loss, 0.0);
    assert_eq!(optimizer.target(), Some(&linear_model()));
}

#[test]
fn zero_batch_size_is_rejected() {
    let (x, y) = linear_data(4);
    let mut optimizer = prepared(0.1, 0.0);
    let err = train_loop(&mut optimizer, Dataset::new(&x, &y).unwrap(), None, &MseLoss, &TrainConfig::new(1, 0))
        .unwrap_err();
    assert!(matches!(err, NnError::InvalidConfig(_)));
}

#[test]
fn unprepared_optimizer_is_rejected() {
    let (x, y) = linear_data(4);
    let mut optimizer = GradientDescentOptimizer::new(0.1, 0.0);
    let err = train_loop(&mut optimizer, Dataset::new(&x, &y).unwrap(), None, &MseLoss, &TrainConfig::new(1, 2))
        .unwrap_err();
    assert!(matches!(err, NnError::NotPrepared));
}

#[test]
fn empty_training_set_is_rejected() {
    let x = Matrix::zeros(2, 0);
    let y = Matrix::zeros(1, 0);
    let mut optimizer = prepared(0.1, 0.0);
    let err = train_loop(&mut optimizer, Dataset::new(&x, &y).unwrap(), None, &MseLoss, &TrainConfig::new(1, 2))
        .unwrap_err();
    assert!(matches!(err, NnError::EmptyBatch));
}
