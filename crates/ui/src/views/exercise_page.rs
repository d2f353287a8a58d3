use dioxus::document::eval;
use dioxus::prelude::*;

use crate::context::ShellConfig;
use crate::document::Document;
use crate::keyboard::Key as PageKey;
use crate::runtime::PageRuntime;
use crate::vm::{NavLinkVm, PageVm, map_page};

/// Element that owns keyboard focus while the page is shown.
pub const ROOT_ID: &str = "exercise-root";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShellIntent {
    Key(PageKey),
    Follow(String),
    Back,
}

/// The page runtime plus the last fatal error, if any.
struct ShellState {
    runtime: Option<PageRuntime>,
    error: Option<String>,
}

impl ShellState {
    fn boot(config: &ShellConfig) -> Self {
        let document = match Document::parse_with(
            &config.markup,
            config.address.clone(),
            config.conventions.clone(),
        ) {
            Ok(document) => document,
            Err(err) => {
                tracing::warn!(error = %err, "host page markup rejected");
                return Self {
                    runtime: None,
                    error: Some(err.to_string()),
                };
            }
        };
        let mut runtime = PageRuntime::new(document, config.randomness);
        let error = runtime.load().err().map(|err| err.to_string());
        Self {
            runtime: Some(runtime),
            error,
        }
    }

    fn dispatch(&mut self, intent: ShellIntent) {
        let Some(runtime) = self.runtime.as_mut() else {
            return;
        };
        let result = match intent {
            ShellIntent::Key(key) => runtime.press(key).map(drop),
            ShellIntent::Back => runtime.back().map(drop),
            ShellIntent::Follow(href) => match runtime.document().address().join(&href) {
                Ok(url) => runtime.navigate(url).map(drop),
                Err(err) => {
                    self.error = Some(format!("invalid link {href:?}: {err}"));
                    return;
                }
            },
        };
        self.error = result.err().map(|err| err.to_string());
    }

    fn view(&self) -> Result<(PageVm, bool), String> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        let runtime = self
            .runtime
            .as_ref()
            .ok_or_else(|| "page is not loaded".to_string())?;
        let vm = map_page(runtime.document()).map_err(|err| err.to_string())?;
        let can_go_back = runtime.document().history().index() > 0;
        Ok((vm, can_go_back))
    }
}

fn page_key(key: &Key) -> PageKey {
    match key {
        Key::Character(value) => PageKey::from_dom(value),
        Key::Enter => PageKey::Enter,
        Key::Escape => PageKey::Escape,
        _ => PageKey::Other,
    }
}

fn focus_script(id: &str) -> String {
    format!("document.getElementById({id:?})?.focus();")
}

#[component]
pub fn ExercisePage(config: ShellConfig) -> Element {
    let mut state = use_signal(|| ShellState::boot(&config));

    let dispatch = use_callback(move |intent: ShellIntent| {
        tracing::debug!(?intent, "shell intent");
        state.write().dispatch(intent);
    });

    // Runs on mount and after every shell update, so focus is never left on
    // a link that a re-render replaced.
    use_effect(move || {
        let address = state
            .read()
            .runtime
            .as_ref()
            .map(|runtime| runtime.document().address().to_string());
        tracing::trace!(?address, "focusing exercise root");
        let _ = eval(&focus_script(ROOT_ID));
    });

    let on_key = move |evt: KeyboardEvent| {
        let key = page_key(&evt.data.key());
        if key == PageKey::Space {
            evt.prevent_default();
        }
        dispatch.call(ShellIntent::Key(key));
    };

    let view = state.read().view();

    rsx! {
        div {
            class: "page exercise-page",
            id: ROOT_ID,
            tabindex: "0",
            autofocus: true,
            onkeydown: on_key,
            match view {
                Ok((vm, can_go_back)) => rsx! {
                    header { class: "exercise-header",
                        nav { class: "exercise-index",
                            for link in vm.header {
                                NavLink { key: "{link.href}", link, on_intent: dispatch }
                            }
                        }
                    }
                    main { class: "exercise-content", dangerous_inner_html: "{vm.content_html}" }
                    footer { class: "exercise-footer",
                        nav { class: "exercise-pager",
                            for link in vm.footer {
                                NavLink { key: "{link.href}", link, on_intent: dispatch }
                            }
                        }
                        if can_go_back {
                            button {
                                class: "btn btn-secondary",
                                r#type: "button",
                                onclick: move |_| dispatch.call(ShellIntent::Back),
                                "Back"
                            }
                        }
                        p { class: "exercise-hint", "Press space for new numbers." }
                    }
                },
                Err(message) => rsx! {
                    div { class: "fatal",
                        h1 { "Something went wrong" }
                        pre { "{message}" }
                    }
                },
            }
        }
    }
}

#[component]
fn NavLink(link: NavLinkVm, on_intent: EventHandler<ShellIntent>) -> Element {
    let class = match (link.current, link.rel.as_deref()) {
        (true, _) => "exercise-link exercise-link--current",
        (false, Some("prev")) => "exercise-link exercise-link--prev",
        (false, Some("next")) => "exercise-link exercise-link--next",
        _ => "exercise-link",
    };
    let aria_current = if link.current { "page" } else { "false" };
    let href = link.href.clone();

    rsx! {
        a {
            class,
            href: "{link.href}",
            aria_current,
            onclick: move |evt: MouseEvent| {
                evt.prevent_default();
                on_intent.call(ShellIntent::Follow(href.clone()));
            },
            "{link.label}"
        }
    }
}
