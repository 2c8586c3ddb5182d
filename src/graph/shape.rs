//! Per-sample tensor shapes.

use std::fmt;

/// Dimensions of a single sample, excluding the batch axis.
///
/// Sequence activations are `[length, channels]` (channels-last), flat
/// feature vectors are `[features]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape(Vec<usize>);

impl Shape {
    pub fn new(dims: Vec<usize>) -> Self {
        Self(dims)
    }

    /// A `[length, channels]` sequence shape.
    pub fn sequence(length: usize, channels: usize) -> Self {
        Self(vec![length, channels])
    }

    /// A `[features]` vector shape.
    pub fn flat(features: usize) -> Self {
        Self(vec![features])
    }

    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// Number of scalars in one sample.
    pub fn size(&self) -> usize {
        self.0.iter().product()
    }

    /// Size of the last (channel / feature) axis.
    pub fn last(&self) -> usize {
        self.0.last().copied().unwrap_or(1)
    }

    /// Broadcast two shapes of equal rank where each dimension is equal or 1.
    pub fn broadcast(&self, other: &Shape) -> Option<Shape> {
        if self.rank() != other.rank() {
            return None;
        }
        let mut dims = Vec::with_capacity(self.rank());
        for (&a, &b) in self.0.iter().zip(other.0.iter()) {
            match (a, b) {
                _ if a == b => dims.push(a),
                (1, _) => dims.push(b),
                (_, 1) => dims.push(a),
                _ => return None,
            }
        }
        Some(Shape(dims))
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self(dims.to_vec())
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, dim) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", dim)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_shape() {
        let shape = Shape::sequence(9000, 1);
        assert_eq!(shape.dims(), &[9000, 1]);
        assert_eq!(shape.rank(), 2);
        assert_eq!(shape.size(), 9000);
        assert_eq!(shape.last(), 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(Shape::sequence(35, 128).to_string(), "[35, 128]");
        assert_eq!(Shape::flat(3).to_string(), "[3]");
    }

    #[test]
    fn test_broadcast_channel_gate() {
        let stage = Shape::sequence(9000, 16);
        let gate = Shape::sequence(1, 16);
        assert_eq!(stage.broadcast(&gate), Some(stage.clone()));
        assert_eq!(gate.broadcast(&stage), Some(stage));
    }

    #[test]
    fn test_broadcast_rejects_mismatch() {
        assert_eq!(Shape::sequence(10, 4).broadcast(&Shape::sequence(10, 8)), None);
        assert_eq!(Shape::sequence(10, 4).broadcast(&Shape::flat(4)), None);
    }
}
