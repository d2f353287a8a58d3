use exercise_core::{Conventions, RandomSource};
use url::Url;

pub const DEFAULT_TITLE: &str = "Exercises";

/// Everything the shell needs to boot a page. Provided by the composition
/// root (e.g. `crates/app`).
#[derive(Clone, Debug, PartialEq)]
pub struct ShellConfig {
    /// Host page markup.
    pub markup: String,
    /// Initial page address.
    pub address: Url,
    pub conventions: Conventions,
    pub randomness: RandomSource,
    /// Window title.
    pub title: String,
}

impl ShellConfig {
    #[must_use]
    pub fn new(markup: impl Into<String>, address: Url) -> Self {
        Self {
            markup: markup.into(),
            address,
            conventions: Conventions::default(),
            randomness: RandomSource::Entropy,
            title: DEFAULT_TITLE.to_string(),
        }
    }

    #[must_use]
    pub fn with_randomness(mut self, randomness: RandomSource) -> Self {
        self.randomness = randomness;
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}
