pub mod address;
pub mod app;
pub mod binding;
pub mod context;
pub mod controller;
pub mod document;
pub mod keyboard;
pub mod runtime;
pub mod views;
pub mod vm;

pub use app::App;
pub use context::{DEFAULT_TITLE, ShellConfig};
pub use controller::{ExerciseElement, KeyOutcome, RenderError, RenderOutcome};
pub use document::{Document, NavigationKind, PageError, Region};
pub use keyboard::{Key, KeyboardEvents};
pub use runtime::PageRuntime;
pub use views::{ExercisePage, ShellIntent};
