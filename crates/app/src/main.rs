mod logging;

use std::path::PathBuf;

use clap::Parser;
use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use exercise_core::{Conventions, ExerciseId, MarkupError, RandomSource};
use thiserror::Error;
use ui::{App, Document, PageRuntime, RenderError, ShellConfig};
use url::Url;

#[derive(Debug, Parser)]
#[command(name = "exercises", version, about = "Randomized arithmetic exercises in a desktop window")]
struct Args {
    /// Host page markup (XHTML) with the exercise component and its templates.
    #[arg(long, env = "EXERCISES_PAGE")]
    page: PathBuf,

    /// Initial page address.
    #[arg(long, env = "EXERCISES_ADDRESS", default_value = "app://exercises/index.html")]
    address: Url,

    /// Exercise to open first; sets the exercise parameter on the address.
    #[arg(long)]
    exercise: Option<ExerciseId>,

    /// Window title.
    #[arg(long, default_value = ui::DEFAULT_TITLE)]
    title: String,

    /// Seed for the placeholder numbers. Entropy when absent.
    #[arg(long, env = "EXERCISES_SEED")]
    seed: Option<u64>,
}

#[derive(Debug, Error)]
enum AppError {
    #[error("failed to read page {}: {source}", .path.display())]
    ReadPage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("page {} is not well-formed: {source}", .path.display())]
    Markup {
        path: PathBuf,
        #[source]
        source: MarkupError,
    },
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl Args {
    fn shell_config(&self, markup: String) -> ShellConfig {
        let conventions = Conventions::default();
        let address = match &self.exercise {
            Some(exercise) => {
                ui::address::with_param(&self.address, &conventions.parameter, exercise.as_str())
            }
            None => self.address.clone(),
        };
        let randomness = self.seed.map_or(RandomSource::Entropy, RandomSource::Seeded);
        ShellConfig::new(markup, address)
            .with_randomness(randomness)
            .with_title(self.title.as_str())
    }
}

/// Loads the page once outside the window so configuration errors surface
/// on the command line instead of inside the shell.
fn preflight(args: &Args, config: &ShellConfig) -> Result<(), AppError> {
    let document = Document::parse_with(
        &config.markup,
        config.address.clone(),
        config.conventions.clone(),
    )
    .map_err(|source| AppError::Markup {
        path: args.page.clone(),
        source,
    })?;
    let mut runtime = PageRuntime::new(document, config.randomness);
    runtime.load()?;
    Ok(())
}

fn run(args: Args) -> Result<(), AppError> {
    let markup = std::fs::read_to_string(&args.page).map_err(|source| AppError::ReadPage {
        path: args.page.clone(),
        source,
    })?;
    let config = args.shell_config(markup);
    preflight(&args, &config)?;

    tracing::info!(page = %args.page.display(), address = %config.address, "launching");

    // On macOS, Dioxus/tao can default to an always-on-top window in some dev setups.
    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title(config.title.as_str())
            .with_always_on_top(false),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(config)
        .launch(App);
    Ok(())
}

fn main() {
    logging::init();
    let args = Args::parse();
    if let Err(err) = run(args) {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
