use exercise_core::Element;
use exercise_core::model::markup;

use crate::document::{Document, PageError, Region};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavLinkVm {
    pub label: String,
    pub href: String,
    pub exercise: Option<String>,
    pub current: bool,
    pub rel: Option<String>,
}

impl From<&Element> for NavLinkVm {
    fn from(link: &Element) -> Self {
        Self {
            label: link.text(),
            href: link.attr("href").unwrap_or_default().to_string(),
            exercise: link.attr("data-exercise").map(str::to_string),
            current: link.attr("aria-current") == Some("page"),
            rel: link.attr("rel").map(str::to_string),
        }
    }
}

/// What the desktop shell shows for one rendered page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageVm {
    pub address: String,
    pub content_html: String,
    pub header: Vec<NavLinkVm>,
    pub footer: Vec<NavLinkVm>,
}

/// # Errors
///
/// Returns `PageError` if a region is missing from the page.
pub fn map_page(document: &Document) -> Result<PageVm, PageError> {
    let content = document.region(Region::Content)?;
    Ok(PageVm {
        address: document.address().to_string(),
        content_html: markup::to_html(content.children()),
        header: map_links(document.region(Region::Header)?),
        footer: map_links(document.region(Region::Footer)?),
    })
}

fn map_links(region: &Element) -> Vec<NavLinkVm> {
    region
        .children()
        .iter()
        .filter_map(exercise_core::Node::as_element)
        .filter(|el| el.name() == "a")
        .map(NavLinkVm::from)
        .collect()
}
