use dioxus::prelude::*;

use crate::context::ShellConfig;
use crate::views::ExercisePage;

/// Desktop root. Reads the `ShellConfig` from context; the document title
/// tracks the configured window title.
#[component]
pub fn App() -> Element {
    let config = use_context::<ShellConfig>();
    let title = config.title.clone();

    rsx! {
        document::Stylesheet { href: asset!("/assets/style.css") }
        document::Title { "{title}" }
        div { class: "app-root", ExercisePage { config } }
    }
}
