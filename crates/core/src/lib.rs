#![forbid(unsafe_code)]

pub mod conventions;
pub mod model;
pub mod progression;
pub mod randomize;
pub mod registry;

pub use conventions::Conventions;
pub use model::{Element, ExerciseId, IdError, MarkupError, Node};
pub use progression::{Neighbors, Progression, ProgressionError};
pub use randomize::{PLACEHOLDER_RANGE, RandomSource, Randomizer};
pub use registry::{Fragment, Registry, RegistryError, TemplateDecl};
