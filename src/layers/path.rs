use std::fmt;

/// Position of a layer inside a graph: the child index taken at every
/// composite level from the root down.
///
/// A bare (non-composite) root is `[]`; the children of a root composite are
/// `[0]`, `[1]`, ...; a layer nested one level deeper is `[i, j]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct LayerPath(Vec<usize>);

impl LayerPath {
    pub fn root() -> LayerPath {
        LayerPath(Vec::new())
    }

    pub fn child(&self, index: usize) -> LayerPath {
        let mut indices = self.0.clone();
        indices.push(index);
        LayerPath(indices)
    }
}

impl<const N: usize> From<[usize; N]> for LayerPath {
    fn from(indices: [usize; N]) -> Self {
        LayerPath(indices.to_vec())
    }
}

impl fmt::Display for LayerPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<root>");
        }
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}
