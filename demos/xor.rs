use ferrite_backprop::{
    ActivationFunction, ActivationLayer, BiasedWeightLayer, CompositeLayer, GradientDescentOptimizer,
    Layer, Matrix, MseLoss, NeuralNetOptimizer, WeightInit,
};

fn main() -> ferrite_backprop::Result<()> {
    // One sample per column.
    let inputs = Matrix::from_data(vec![
        vec![1.0, 1.0, 0.0, 0.0],
        vec![0.0, 1.0, 1.0, 0.0],
    ])?;
    let expected = Matrix::from_data(vec![vec![1.0, 0.0, 1.0, 0.0]])?;

    let mut optimizer = GradientDescentOptimizer::new(0.5, 0.9);
    optimizer.prepare(|| -> Layer {
        CompositeLayer::new(vec![
            BiasedWeightLayer::init(2, 4, WeightInit::Xavier).into(),
            ActivationLayer::new(ActivationFunction::Tanh).into(),
            BiasedWeightLayer::init(4, 1, WeightInit::Xavier).into(),
            ActivationLayer::new(ActivationFunction::Sigmoid).into(),
        ]).into()
    });

    let epochs = 5000;

    for epoch in 0..epochs {
        let result = optimizer.optimize(epoch, &inputs, &expected, &MseLoss)?;
        if epoch % 500 == 0 {
            println!("Epoch {epoch}: loss = {:.6}", result.loss);
        }
    }

    if let Some(network) = optimizer.target() {
        let output = network.forward(&inputs)?;
        for j in 0..inputs.cols {
            println!(
                "Input: [{}, {}] -> Output: {:.4}",
                inputs.data[0][j], inputs.data[1][j], output.data[0][j]
            );
        }
    }

    Ok(())
}
