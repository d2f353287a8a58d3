mod exercise_page;

#[cfg(test)]
mod view_smoke;

pub use exercise_page::{ExercisePage, ExercisePageProps, ROOT_ID, ShellIntent};
