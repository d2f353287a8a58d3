mod ids;
pub mod markup;

pub use ids::{ExerciseId, IdError};
pub use markup::{Element, MarkupError, Node};
