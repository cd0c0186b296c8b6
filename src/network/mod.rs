pub mod spec;

pub use spec::{NetworkSpec, LayerSpec};
