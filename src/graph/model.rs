//! A frozen layer graph with a single input and a single output.

use crate::error::GraphError;
use crate::graph::{Shape, Tensor};
use crate::layers::Layer;
use std::fmt::Write;
use tracing::{debug, info};

/// One layer of the graph together with the tensors it consumes.
pub struct Node {
    layer: Box<dyn Layer>,
    inputs: Vec<Tensor>,
}

impl Node {
    pub(crate) fn new(layer: Box<dyn Layer>, inputs: Vec<Tensor>) -> Self {
        Self { layer, inputs }
    }

    pub fn layer(&self) -> &dyn Layer {
        self.layer.as_ref()
    }

    pub fn inputs(&self) -> &[Tensor] {
        &self.inputs
    }

    pub fn shape(&self) -> &Shape {
        self.layer.output_shape()
    }

    pub fn kind(&self) -> &'static str {
        self.layer.kind()
    }
}

/// A model: nodes in topological order, run from `input` to `output`.
///
/// Nodes that do not contribute to the output are kept (they show up in
/// [`Model::summary`]) but skipped by [`Model::predict`].
pub struct Model {
    name: String,
    nodes: Vec<Node>,
    input: Tensor,
    output: Tensor,
    // nodes the output depends on
    needed: Vec<bool>,
    // number of needed nodes reading each node's output
    consumers: Vec<usize>,
}

impl Model {
    pub(crate) fn new(
        name: String,
        nodes: Vec<Node>,
        input: Tensor,
        output: Tensor,
    ) -> Result<Self, GraphError> {
        for tensor in [input, output] {
            if tensor.0 >= nodes.len() {
                return Err(GraphError::UnknownTensor(tensor.0));
            }
        }
        if nodes[input.0].kind() != "input" {
            return Err(GraphError::NotAnInput(input.0));
        }

        let mut needed = vec![false; nodes.len()];
        needed[output.0] = true;
        for i in (0..nodes.len()).rev() {
            if !needed[i] {
                continue;
            }
            for &t in nodes[i].inputs() {
                // builders only hand out handles to earlier nodes
                if t.0 >= i {
                    return Err(GraphError::UnknownTensor(t.0));
                }
                needed[t.0] = true;
            }
        }
        if let Some(other) = (0..nodes.len())
            .find(|&i| needed[i] && i != input.0 && nodes[i].kind() == "input")
        {
            return Err(GraphError::NotAnInput(other));
        }

        let mut consumers = vec![0usize; nodes.len()];
        for (i, node) in nodes.iter().enumerate() {
            if needed[i] {
                for &t in node.inputs() {
                    consumers[t.0] += 1;
                }
            }
        }

        let model = Self {
            name,
            nodes,
            input,
            output,
            needed,
            consumers,
        };
        info!(
            model = %model.name,
            layers = model.layer_count(),
            params = model.parameter_count(),
            input = %model.input_shape(),
            output = %model.output_shape(),
            "model built"
        );
        Ok(model)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input(&self) -> Tensor {
        self.input
    }

    pub fn output(&self) -> Tensor {
        self.output
    }

    pub fn input_shape(&self) -> &Shape {
        self.nodes[self.input.0].shape()
    }

    pub fn output_shape(&self) -> &Shape {
        self.nodes[self.output.0].shape()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, tensor: Tensor) -> Option<&Node> {
        self.nodes.get(tensor.0)
    }

    /// Number of nodes, the input node included.
    pub fn layer_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn parameter_count(&self) -> usize {
        self.nodes.iter().map(|n| n.layer.parameter_count()).sum()
    }

    /// Switches every batch-norm and dropout layer between training and inference.
    pub fn set_training(&mut self, training: bool) {
        for node in &mut self.nodes {
            node.layer.set_training(training);
        }
    }

    /// Runs a forward pass over `batch_size` samples laid out back to back.
    ///
    /// Returns `batch_size × output_shape().size()` values.
    ///
    /// # Errors
    ///
    /// `InputSize` if `input` does not hold exactly `batch_size` samples.
    pub fn predict(&self, input: &[f32], batch_size: usize) -> Result<Vec<f32>, GraphError> {
        let expected = batch_size * self.input_shape().size();
        if input.len() != expected {
            return Err(GraphError::InputSize {
                expected,
                found: input.len(),
            });
        }
        debug!(model = %self.name, batch_size, "predict");

        let mut buffers: Vec<Option<Vec<f32>>> = vec![None; self.nodes.len()];
        let mut remaining = self.consumers.clone();

        for (i, node) in self.nodes.iter().enumerate() {
            if !self.needed[i] {
                continue;
            }
            let mut out = vec![0.0f32; batch_size * node.shape().size()];
            if i == self.input.0 {
                node.layer.forward(&[input], &mut out, batch_size);
            } else {
                let ins = node
                    .inputs
                    .iter()
                    .map(|t| {
                        buffers[t.0]
                            .as_deref()
                            .ok_or(GraphError::UnknownTensor(t.0))
                    })
                    .collect::<Result<Vec<&[f32]>, GraphError>>()?;
                node.layer.forward(&ins, &mut out, batch_size);
            }
            buffers[i] = Some(out);

            for t in &node.inputs {
                remaining[t.0] -= 1;
                if remaining[t.0] == 0 && t.0 != self.output.0 {
                    buffers[t.0] = None;
                }
            }
        }

        buffers[self.output.0]
            .take()
            .ok_or(GraphError::UnknownTensor(self.output.0))
    }

    /// A per-layer table: index, kind, output shape, parameters and inputs.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let rule = "-".repeat(72);
        let _ = writeln!(out, "Model: \"{}\"", self.name);
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(
            out,
            "{:<5} {:<16} {:<18} {:>12}  {}",
            "#", "Layer", "Output Shape", "Param #", "Connected to"
        );
        let _ = writeln!(out, "{}", rule);
        for (i, node) in self.nodes.iter().enumerate() {
            let inputs = node
                .inputs
                .iter()
                .map(|t| format!("#{}", t.0))
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(
                out,
                "{:<5} {:<16} {:<18} {:>12}  {}",
                i,
                node.kind(),
                node.shape().to_string(),
                node.layer.parameter_count(),
                inputs
            );
        }
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "Total params: {}", self.parameter_count());
        out
    }
}

#[cfg(test)]
mod tests {
    use crate::error::GraphError;
    use crate::graph::{GraphBuilder, Shape};
    use crate::utils::Activation;

    #[test]
    fn test_predict_rejects_wrong_input_length() {
        let mut g = GraphBuilder::with_seed(3);
        let x = g.input(Shape::flat(4));
        let y = g.dense(x, 2, Activation::Softmax).unwrap();
        let model = g.finish("m", x, y).unwrap();
        assert_eq!(
            model.predict(&[1.0; 7], 2),
            Err(GraphError::InputSize {
                expected: 8,
                found: 7
            })
        );
    }

    #[test]
    fn test_endpoints_match_finish_handles() {
        let mut g = GraphBuilder::with_seed(3);
        let x = g.input(Shape::flat(4));
        let h = g.dense(x, 3, Activation::Relu).unwrap();
        let y = g.dense(h, 2, Activation::Softmax).unwrap();
        let model = g.finish("m", x, y).unwrap();
        assert_eq!(model.input(), x);
        assert_eq!(model.output(), y);
        assert_eq!(model.node(model.input()).map(|n| n.kind()), Some("input"));
        assert_eq!(model.node(model.output()).unwrap().inputs(), &[h]);
    }

    #[test]
    fn test_finish_requires_input_node() {
        let mut g = GraphBuilder::with_seed(3);
        let x = g.input(Shape::flat(4));
        let y = g.dense(x, 2, Activation::Relu).unwrap();
        assert_eq!(g.finish("m", y, y).err(), Some(GraphError::NotAnInput(1)));
    }

    #[test]
    fn test_second_input_feeding_output_rejected() {
        let mut g = GraphBuilder::with_seed(3);
        let a = g.input(Shape::flat(2));
        let b = g.input(Shape::flat(2));
        let y = g.add(&[a, b]).unwrap();
        assert_eq!(g.finish("m", a, y).err(), Some(GraphError::NotAnInput(1)));
    }

    #[test]
    fn test_unused_branch_skipped() {
        let mut g = GraphBuilder::with_seed(3);
        let x = g.input(Shape::flat(2));
        let _dead = g.dense(x, 5, Activation::Relu).unwrap();
        let y = g.activation(x, Activation::Relu).unwrap();
        let model = g.finish("m", x, y).unwrap();
        assert_eq!(model.layer_count(), 3);
        assert_eq!(model.predict(&[-1.0, 2.0], 1).unwrap(), vec![0.0, 2.0]);
    }

    #[test]
    fn test_diamond_reuses_shared_tensor() {
        let mut g = GraphBuilder::with_seed(3);
        let x = g.input(Shape::flat(3));
        let r = g.activation(x, Activation::Relu).unwrap();
        let y = g.add(&[x, r]).unwrap();
        let model = g.finish("m", x, y).unwrap();
        assert_eq!(
            model.predict(&[-1.0, 0.5, 2.0], 1).unwrap(),
            vec![-1.0, 1.0, 4.0]
        );
    }

    #[test]
    fn test_summary_lists_every_node() {
        let mut g = GraphBuilder::with_seed(3);
        let x = g.input(Shape::sequence(8, 1));
        let f = g.flatten(x).unwrap();
        let y = g.dense(f, 3, Activation::Softmax).unwrap();
        let model = g.finish("tiny", x, y).unwrap();
        let summary = model.summary();
        assert!(summary.contains("Model: \"tiny\""));
        assert!(summary.contains("flatten"));
        assert!(summary.contains("[8, 1]"));
        assert!(summary.contains("Total params: 27"));
    }
}
