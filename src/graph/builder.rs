//! Functional graph builder.
//!
//! Each method appends one layer node, checks the incoming shapes and returns the
//! handle of the new node's output, so architectures read as a chain of calls:
//!
//! ```
//! use rta_cnn::graph::{Conv1D, GraphBuilder, Shape};
//! use rta_cnn::utils::Activation;
//!
//! let mut g = GraphBuilder::with_seed(0);
//! let inputs = g.input(Shape::sequence(128, 1));
//! let x = g.conv1d(inputs, Conv1D::new(8, 3))?;
//! let x = g.batch_norm(x)?;
//! let x = g.activation(x, Activation::Relu)?;
//! let x = g.flatten(x)?;
//! let x = g.dense(x, 3, Activation::Softmax)?;
//! let model = g.finish("tiny", inputs, x)?;
//! assert_eq!(model.output_shape(), &Shape::flat(3));
//! # Ok::<(), rta_cnn::GraphError>(())
//! ```

use crate::error::GraphError;
use crate::graph::model::{Model, Node};
use crate::graph::Shape;
use crate::layers::batchnorm::{DEFAULT_EPSILON, DEFAULT_MOMENTUM};
use crate::layers::r#trait::sequence_dims;
use crate::layers::{
    ActivationLayer, BatchNormLayer, Conv1DLayer, DenseLayer, DropoutLayer,
    GlobalAveragePool1DLayer, InputLayer, Layer, MaxPool1DLayer, MergeLayer, MergeOp, Padding,
    ReshapeLayer, TimeBorderLayer, UpSampling1DLayer,
};
use crate::utils::{Activation, Initializer};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

/// Handle to the output of a graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tensor(pub(crate) usize);

impl Tensor {
    /// Position of the producing node in the graph.
    pub fn id(self) -> usize {
        self.0
    }
}

/// Convolution hyperparameters.
///
/// Defaults: stride 1, `same` padding, Glorot-uniform kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conv1D {
    pub filters: usize,
    pub kernel_size: usize,
    pub stride: usize,
    pub padding: Padding,
    pub initializer: Initializer,
}

impl Conv1D {
    pub fn new(filters: usize, kernel_size: usize) -> Self {
        Self {
            filters,
            kernel_size,
            stride: 1,
            padding: Padding::Same,
            initializer: Initializer::GlorotUniform,
        }
    }

    pub fn stride(mut self, stride: usize) -> Self {
        self.stride = stride;
        self
    }

    pub fn padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    pub fn initializer(mut self, initializer: Initializer) -> Self {
        self.initializer = initializer;
        self
    }
}

/// Accumulates layer nodes in topological order.
pub struct GraphBuilder {
    nodes: Vec<Node>,
    rng: StdRng,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    /// A builder whose weights are seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// A builder that produces identical weights for identical seeds.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            nodes: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Shape of a tensor produced by this builder.
    pub fn shape(&self, tensor: Tensor) -> Result<&Shape, GraphError> {
        self.nodes
            .get(tensor.0)
            .map(Node::shape)
            .ok_or(GraphError::UnknownTensor(tensor.0))
    }

    fn push<L: Layer + 'static>(&mut self, layer: L, inputs: Vec<Tensor>) -> Tensor {
        debug!(
            layer = layer.kind(),
            shape = %layer.output_shape(),
            params = layer.parameter_count(),
            "added layer"
        );
        self.nodes.push(Node::new(Box::new(layer), inputs));
        Tensor(self.nodes.len() - 1)
    }

    fn shapes(&self, tensors: &[Tensor]) -> Result<Vec<Shape>, GraphError> {
        tensors.iter().map(|&t| self.shape(t).cloned()).collect()
    }

    /// Declares a graph input of per-sample `shape`.
    pub fn input(&mut self, shape: Shape) -> Tensor {
        self.push(InputLayer::new(shape), Vec::new())
    }

    pub fn conv1d(&mut self, x: Tensor, conv: Conv1D) -> Result<Tensor, GraphError> {
        let (length, channels) = sequence_dims("conv1d", self.shape(x)?)?;
        let layer = Conv1DLayer::new(
            length,
            channels,
            conv.filters,
            conv.kernel_size,
            conv.stride,
            conv.padding,
            conv.initializer,
            &mut self.rng,
        )?;
        Ok(self.push(layer, vec![x]))
    }

    pub fn batch_norm(&mut self, x: Tensor) -> Result<Tensor, GraphError> {
        let layer = BatchNormLayer::new(self.shape(x)?, DEFAULT_EPSILON, DEFAULT_MOMENTUM);
        Ok(self.push(layer, vec![x]))
    }

    pub fn activation(&mut self, x: Tensor, activation: Activation) -> Result<Tensor, GraphError> {
        let layer = ActivationLayer::new(self.shape(x)?, activation);
        Ok(self.push(layer, vec![x]))
    }

    pub fn max_pool1d(
        &mut self,
        x: Tensor,
        pool_size: usize,
        stride: usize,
    ) -> Result<Tensor, GraphError> {
        let layer = MaxPool1DLayer::new(self.shape(x)?, pool_size, stride)?;
        Ok(self.push(layer, vec![x]))
    }

    pub fn up_sampling1d(&mut self, x: Tensor, size: usize) -> Result<Tensor, GraphError> {
        let layer = UpSampling1DLayer::new(self.shape(x)?, size)?;
        Ok(self.push(layer, vec![x]))
    }

    pub fn zero_padding1d(
        &mut self,
        x: Tensor,
        left: usize,
        right: usize,
    ) -> Result<Tensor, GraphError> {
        let layer = TimeBorderLayer::zero_padding(self.shape(x)?, left, right)?;
        Ok(self.push(layer, vec![x]))
    }

    pub fn cropping1d(&mut self, x: Tensor, left: usize, right: usize) -> Result<Tensor, GraphError> {
        let layer = TimeBorderLayer::cropping(self.shape(x)?, left, right)?;
        Ok(self.push(layer, vec![x]))
    }

    pub fn global_average_pool1d(&mut self, x: Tensor) -> Result<Tensor, GraphError> {
        let layer = GlobalAveragePool1DLayer::new(self.shape(x)?)?;
        Ok(self.push(layer, vec![x]))
    }

    pub fn flatten(&mut self, x: Tensor) -> Result<Tensor, GraphError> {
        let layer = ReshapeLayer::flatten(self.shape(x)?);
        Ok(self.push(layer, vec![x]))
    }

    pub fn reshape(&mut self, x: Tensor, target: Shape) -> Result<Tensor, GraphError> {
        let layer = ReshapeLayer::reshape(self.shape(x)?, target)?;
        Ok(self.push(layer, vec![x]))
    }

    /// Dense layer with a Glorot-uniform kernel.
    pub fn dense(
        &mut self,
        x: Tensor,
        units: usize,
        activation: Activation,
    ) -> Result<Tensor, GraphError> {
        self.dense_with(x, units, activation, Initializer::GlorotUniform)
    }

    pub fn dense_with(
        &mut self,
        x: Tensor,
        units: usize,
        activation: Activation,
        initializer: Initializer,
    ) -> Result<Tensor, GraphError> {
        let shape = self.shape(x)?.clone();
        let layer = DenseLayer::new(&shape, units, activation, initializer, &mut self.rng)?;
        Ok(self.push(layer, vec![x]))
    }

    pub fn dropout(&mut self, x: Tensor, rate: f32) -> Result<Tensor, GraphError> {
        let shape = self.shape(x)?.clone();
        let layer = DropoutLayer::new(&shape, rate, &mut self.rng)?;
        Ok(self.push(layer, vec![x]))
    }

    fn merge(&mut self, op: MergeOp, inputs: &[Tensor]) -> Result<Tensor, GraphError> {
        let layer = MergeLayer::new(op, self.shapes(inputs)?)?;
        Ok(self.push(layer, inputs.to_vec()))
    }

    /// Element-wise sum of identically shaped tensors.
    pub fn add(&mut self, inputs: &[Tensor]) -> Result<Tensor, GraphError> {
        self.merge(MergeOp::Add, inputs)
    }

    /// Element-wise product, broadcasting size-1 axes.
    pub fn multiply(&mut self, inputs: &[Tensor]) -> Result<Tensor, GraphError> {
        self.merge(MergeOp::Multiply, inputs)
    }

    /// Concatenation along the channel axis.
    pub fn concatenate(&mut self, inputs: &[Tensor]) -> Result<Tensor, GraphError> {
        self.merge(MergeOp::Concatenate, inputs)
    }

    /// Freezes the graph into a [`Model`] running from `input` to `output`.
    ///
    /// # Errors
    ///
    /// `UnknownTensor` for foreign handles, `NotAnInput` if `input` is not an input
    /// node or another input node feeds `output`.
    pub fn finish(self, name: &str, input: Tensor, output: Tensor) -> Result<Model, GraphError> {
        Model::new(name.to_string(), self.nodes, input, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_tensor() {
        let mut g = GraphBuilder::with_seed(1);
        let result = g.flatten(Tensor(7));
        assert_eq!(result.err(), Some(GraphError::UnknownTensor(7)));
    }

    #[test]
    fn test_tensor_ids_follow_insertion_order() {
        let mut g = GraphBuilder::with_seed(1);
        let x = g.input(Shape::sequence(8, 1));
        let y = g.conv1d(x, Conv1D::new(2, 3)).unwrap();
        let z = g.flatten(y).unwrap();
        assert_eq!([x.id(), y.id(), z.id()], [0, 1, 2]);
    }

    #[test]
    fn test_conv_on_flat_input_is_rank_error() {
        let mut g = GraphBuilder::with_seed(1);
        let x = g.input(Shape::flat(16));
        assert!(matches!(
            g.conv1d(x, Conv1D::new(4, 3)),
            Err(GraphError::Rank { layer: "conv1d", .. })
        ));
    }

    #[test]
    fn test_shapes_follow_chain() {
        let mut g = GraphBuilder::with_seed(1);
        let x = g.input(Shape::sequence(9000, 1));
        let y = g.conv1d(x, Conv1D::new(16, 32)).unwrap();
        let y = g.max_pool1d(y, 4, 4).unwrap();
        assert_eq!(g.shape(y).unwrap(), &Shape::sequence(2250, 16));
        let z = g.global_average_pool1d(y).unwrap();
        assert_eq!(g.shape(z).unwrap(), &Shape::flat(16));
    }

    #[test]
    fn test_seeded_builders_match() {
        let build = |seed| {
            let mut g = GraphBuilder::with_seed(seed);
            let x = g.input(Shape::flat(4));
            let y = g.dense(x, 2, Activation::Softmax).unwrap();
            let model = g.finish("m", x, y).unwrap();
            model.predict(&[0.5, -1.0, 2.0, 0.0], 1).unwrap()
        };
        assert_eq!(build(11), build(11));
        assert_ne!(build(11), build(12));
    }
}
