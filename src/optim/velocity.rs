use std::collections::BTreeMap;

use crate::error::{NnError, Result};
use crate::layers::{Layer, LayerPath};
use crate::math::matrix::Matrix;

/// Momentum accumulators of one weighted layer, shaped like its parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerVelocity {
    pub dw: Matrix,
    /// Present exactly when the layer has a bias.
    pub db: Option<Matrix>,
}

/// Velocity accumulators for every weighted layer of a graph, keyed by the
/// layer's [`LayerPath`].
///
/// The key set and every shape are fixed when the store is built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VelocityStore {
    entries: BTreeMap<LayerPath, LayerVelocity>,
}

impl VelocityStore {
    /// Zero-initialised velocities for every weighted leaf of `target`.
    pub fn for_layer(target: &Layer) -> VelocityStore {
        let entries = target.leaves()
            .into_iter()
            .filter_map(|(path, layer)| {
                let velocity = match layer {
                    Layer::BiasedWeight(it) => LayerVelocity {
                        dw: Matrix::zeros(it.weights.rows, it.weights.cols),
                        db: Some(Matrix::zeros(it.bias.rows, it.bias.cols)),
                    },
                    Layer::Weight(it) => LayerVelocity {
                        dw: Matrix::zeros(it.weights.rows, it.weights.cols),
                        db: None,
                    },
                    Layer::Activation(_) | Layer::Reshape(_) | Layer::Composite(_) => return None,
                };
                Some((path, velocity))
            })
            .collect();

        VelocityStore { entries }
    }

    pub fn get(&self, path: &LayerPath) -> Option<&LayerVelocity> {
        self.entries.get(path)
    }

    pub(crate) fn get_mut(&mut self, path: &LayerPath) -> Result<&mut LayerVelocity> {
        self.entries.get_mut(path).ok_or_else(|| NnError::MissingVelocity(path.clone()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &LayerPath> {
        self.entries.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::ActivationFunction;
    use crate::layers::{ActivationLayer, BiasedWeightLayer, CompositeLayer, ReshapeLayer, WeightLayer};

    #[test]
    fn allocates_zeroed_entries_for_weighted_layers_only() {
        let graph: Layer = CompositeLayer::new(vec![
            BiasedWeightLayer::new(Matrix::filled(3, 2, 1.0), Matrix::filled(3, 1, 1.0)).unwrap().into(),
            ActivationLayer::new(ActivationFunction::Tanh).into(),
            WeightLayer::new(Matrix::filled(1, 3, 1.0)).into(),
            ReshapeLayer::transpose().into(),
        ]).into();

        let store = VelocityStore::for_layer(&graph);
        assert_eq!(store.len(), 2);

        let first = store.get(&LayerPath::from([0])).unwrap();
        assert_eq!(first.dw, Matrix::zeros(3, 2));
        assert_eq!(first.db, Some(Matrix::zeros(3, 1)));

        let third = store.get(&LayerPath::from([2])).unwrap();
        assert_eq!(third.dw, Matrix::zeros(1, 3));
        assert_eq!(third.db, None);

        assert!(store.get(&LayerPath::from([1])).is_none());
    }

    #[test]
    fn nested_composites_get_distinct_keys() {
        let inner = || -> Layer {
            CompositeLayer::new(vec![WeightLayer::new(Matrix::zeros(2, 2)).into()]).into()
        };
        let graph: Layer = CompositeLayer::new(vec![
            WeightLayer::new(Matrix::zeros(2, 5)).into(),
            inner(),
            inner(),
        ]).into();

        let store = VelocityStore::for_layer(&graph);
        let paths: Vec<&LayerPath> = store.paths().collect();
        assert_eq!(paths, vec![
            &LayerPath::from([0]),
            &LayerPath::from([1, 0]),
            &LayerPath::from([2, 0]),
        ]);
        assert_eq!(store.get(&LayerPath::from([0])).unwrap().dw.shape(), (2, 5));
    }

    #[test]
    fn bare_weight_layer_is_keyed_at_root() {
        let graph: Layer = WeightLayer::new(Matrix::zeros(1, 1)).into();
        let mut store = VelocityStore::for_layer(&graph);
        assert!(store.get_mut(&LayerPath::root()).is_ok());
        assert!(matches!(
            store.get_mut(&LayerPath::from([0])),
            Err(NnError::MissingVelocity(_))
        ));
    }
}
