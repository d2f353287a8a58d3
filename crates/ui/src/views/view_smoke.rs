use dioxus::prelude::*;
use exercise_core::RandomSource;
use url::Url;

use super::{ExercisePage, ExercisePageProps};
use crate::context::ShellConfig;

const PAGE: &str = r#"<body>
    <math-exercise>
        <nav data-region="header"/>
        <section data-region="content"/>
        <nav data-region="footer"/>
    </math-exercise>
    <template id="1a"><p class="task"><span data-placeholder=""/> + <span data-placeholder=""/></p></template>
    <template id="1b"><p class="task">b</p></template>
    <template id="2a"><p class="task">c</p></template>
</body>"#;

fn render(markup: &str, query: &str) -> String {
    let address = Url::parse(&format!("app://exercises/index.html{query}")).unwrap();
    let config = ShellConfig::new(markup, address).with_randomness(RandomSource::Seeded(3));
    let mut dom = VirtualDom::new_with_props(ExercisePage, ExercisePageProps { config });
    dom.rebuild_in_place();
    dioxus_ssr::render(&dom)
}

#[test]
fn page_smoke_renders_regions() {
    let html = render(PAGE, "?exercise=1b");

    assert!(html.contains("exercise-link--current"), "missing current link in {html}");
    assert!(html.contains("exercise-link--prev"), "missing prev link in {html}");
    assert!(html.contains("exercise-link--next"), "missing next link in {html}");
    assert!(html.contains("Previous"), "missing Previous in {html}");
    assert!(html.contains(r#"<p class="task">b</p>"#), "missing content in {html}");
    assert!(!html.contains("Something went wrong"), "unexpected error in {html}");
}

#[test]
fn page_smoke_fills_placeholders() {
    let html = render(PAGE, "?exercise=1a");

    assert!(html.contains("Press space for new numbers."), "missing hint in {html}");
    assert!(!html.contains("<span data-placeholder=\"\"></span>"), "empty placeholder in {html}");
}

#[test]
fn page_smoke_root_is_focusable() {
    let html = render(PAGE, "?exercise=1a");

    assert!(html.contains(r#"id="exercise-root""#), "missing root id in {html}");
    assert!(html.contains(r#"tabindex="0""#), "missing tabindex in {html}");
}

#[test]
fn app_smoke_renders_page_from_context() {
    let address = Url::parse("app://exercises/index.html?exercise=1b").unwrap();
    let config = ShellConfig::new(PAGE, address)
        .with_randomness(RandomSource::Seeded(3))
        .with_title("Times tables");
    let mut dom = VirtualDom::new(crate::App).with_root_context(config);
    dom.rebuild_in_place();
    let html = dioxus_ssr::render(&dom);

    assert!(html.contains("app-root"), "missing app root in {html}");
    assert!(html.contains(r#"<p class="task">b</p>"#), "missing content in {html}");
}

#[test]
fn page_smoke_shows_fatal_panel() {
    let html = render(PAGE, "?exercise=1");

    assert!(html.contains("Something went wrong"), "missing error panel in {html}");
    assert!(!html.contains("exercise-link"), "unexpected links in {html}");
}
