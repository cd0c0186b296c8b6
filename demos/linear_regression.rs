use std::sync::mpsc;
use std::thread;

use ferrite_backprop::{
    ActivationFunction, Dataset, EpochStats, LayerSpec, LossType, Matrix, NetworkSpec,
    NeuralNetOptimizer, OptimizerConfig, TrainConfig, WeightInit, train_loop,
};

fn main() -> ferrite_backprop::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let spec = NetworkSpec {
        name: "linear_regression".into(),
        layers: vec![
            LayerSpec::Dense { inputs: 2, outputs: 1, bias: true, init: WeightInit::Zeros },
            LayerSpec::Activation { function: ActivationFunction::Identity },
        ],
        loss: LossType::Mse,
        optimizer: OptimizerConfig { learning_rate: 0.1, momentum: 0.5 },
    };

    // y = 2·x0 − 3·x1 + 1
    let x = Matrix::random(2, 200);
    let mut y = Matrix::zeros(1, 200);
    for j in 0..x.cols {
        y.data[0][j] = 2.0 * x.data[0][j] - 3.0 * x.data[1][j] + 1.0;
    }

    let mut optimizer = spec.optimizer.build()?;
    optimizer.prepare(|| spec.build());

    let (tx, rx) = mpsc::channel::<EpochStats>();
    let printer = thread::spawn(move || {
        for stats in rx {
            if stats.epoch % 10 == 0 {
                println!("epoch {:>3}/{}: loss = {:.6}", stats.epoch, stats.total_epochs, stats.train_loss);
            }
        }
    });

    let config = TrainConfig::new(60, 20).with_progress(tx);
    let loss = train_loop(&mut optimizer, Dataset::new(&x, &y)?, None, &spec.loss, &config)?;
    drop(config);
    printer.join().expect("printer thread panicked");

    println!("final loss = {loss:.6}");
    if let Some(ferrite_backprop::Layer::Composite(network)) = optimizer.target() {
        println!("learned parameters: {:?}", network.layers[0]);
    }

    Ok(())
}
