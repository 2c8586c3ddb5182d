//! Layer graphs: shapes, the functional builder and the resulting model.

pub mod builder;
pub mod model;
pub mod shape;

pub use builder::{Conv1D, GraphBuilder, Tensor};
pub use model::{Model, Node};
pub use shape::Shape;
