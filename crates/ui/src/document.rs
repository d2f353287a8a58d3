//! In-memory host page: markup tree, address, history and keyboard stream.

use exercise_core::model::markup::{self, NodePath};
use exercise_core::{Conventions, Element, MarkupError, Node, Registry, RegistryError};
use thiserror::Error;
use url::Url;

use crate::keyboard::KeyboardEvents;

/// The three render targets inside the component element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Region {
    Content,
    Header,
    Footer,
}

impl Region {
    pub const ALL: [Region; 3] = [Region::Content, Region::Header, Region::Footer];

    /// Value of the region attribute that marks this region.
    #[must_use]
    pub fn marker(self) -> &'static str {
        match self {
            Region::Content => "content",
            Region::Header => "header",
            Region::Footer => "footer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum PageError {
    #[error("page has no <{tag}> element")]
    MissingComponent { tag: String },
    #[error("page has more than one <{tag}> element")]
    DuplicateComponent { tag: String },
    #[error("component has no {} region", .region.marker())]
    MissingRegion { region: Region },
    #[error("component has more than one {} region", .region.marker())]
    DuplicateRegion { region: Region },
}

/// How the current history entry was reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavigationKind {
    Load,
    Push,
    Replace,
    Back,
}

/// Session history: a list of addresses and a cursor into it.
#[derive(Clone, Debug)]
pub struct History {
    entries: Vec<Url>,
    index: usize,
}

impl History {
    fn new(initial: Url) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[Url] {
        &self.entries
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn current(&self) -> &Url {
        &self.entries[self.index]
    }

    fn push(&mut self, url: Url) {
        self.entries.truncate(self.index + 1);
        self.entries.push(url);
        self.index = self.entries.len() - 1;
    }

    fn replace(&mut self, url: Url) {
        self.entries[self.index] = url;
    }

    fn back(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }
}

/// A host page.
///
/// Navigation only records the new address and flags a pending reload; the
/// page runtime performs the reload between events.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
    conventions: Conventions,
    history: History,
    keyboard: KeyboardEvents,
    pending: Option<NavigationKind>,
    last_navigation: NavigationKind,
}

impl Document {
    /// Parses host page markup with the default conventions.
    ///
    /// # Errors
    ///
    /// Returns `MarkupError` if the markup is malformed.
    pub fn parse(markup: &str, address: Url) -> Result<Self, MarkupError> {
        Self::parse_with(markup, address, Conventions::default())
    }

    /// # Errors
    ///
    /// Returns `MarkupError` if the markup is malformed.
    pub fn parse_with(
        markup: &str,
        address: Url,
        conventions: Conventions,
    ) -> Result<Self, MarkupError> {
        Ok(Self::from_nodes(markup::parse(markup)?, address, conventions))
    }

    #[must_use]
    pub fn from_nodes(nodes: Vec<Node>, address: Url, conventions: Conventions) -> Self {
        Self {
            nodes,
            conventions,
            history: History::new(address),
            keyboard: KeyboardEvents::new(),
            pending: None,
            last_navigation: NavigationKind::Load,
        }
    }

    #[must_use]
    pub fn conventions(&self) -> &Conventions {
        &self.conventions
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[must_use]
    pub fn address(&self) -> &Url {
        self.history.current()
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    #[must_use]
    pub fn keyboard(&self) -> &KeyboardEvents {
        &self.keyboard
    }

    /// Builds a registry from the fragment declarations on this page.
    ///
    /// # Errors
    ///
    /// See [`Registry::scan`].
    pub fn scan_templates(&self) -> Result<Registry, RegistryError> {
        Registry::scan(&self.nodes, &self.conventions)
    }

    /// Navigates to `url` without adding a history entry.
    pub fn replace_location(&mut self, url: Url) {
        self.history.replace(url);
        self.pending = Some(NavigationKind::Replace);
    }

    /// Navigates to `url` as a new history entry.
    pub fn assign_location(&mut self, url: Url) {
        self.history.push(url);
        self.pending = Some(NavigationKind::Push);
    }

    /// Steps back one history entry. Returns `false` at the oldest entry.
    pub fn back(&mut self) -> bool {
        let moved = self.history.back();
        if moved {
            self.pending = Some(NavigationKind::Back);
        }
        moved
    }

    /// Consumes the pending-reload flag set by a navigation.
    pub fn take_navigation(&mut self) -> Option<NavigationKind> {
        let taken = self.pending.take();
        if let Some(kind) = taken {
            self.last_navigation = kind;
        }
        taken
    }

    #[must_use]
    pub fn has_pending_navigation(&self) -> bool {
        self.pending.is_some()
    }

    /// How the current address was reached.
    #[must_use]
    pub fn last_navigation(&self) -> NavigationKind {
        self.last_navigation
    }

    /// Checks that the component and all three regions are present once.
    ///
    /// # Errors
    ///
    /// Returns the first structural violation found.
    pub fn check_structure(&self) -> Result<(), PageError> {
        for region in Region::ALL {
            self.region_path(region)?;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `PageError` if the component or the region is missing or
    /// duplicated.
    pub fn region(&self, region: Region) -> Result<&Element, PageError> {
        let path = self.region_path(region)?;
        markup::element_at(&self.nodes, &path).ok_or(PageError::MissingRegion { region })
    }

    /// Replaces the entire content of `region` with `nodes`.
    ///
    /// # Errors
    ///
    /// Returns `PageError` if the component or the region is missing or
    /// duplicated; the page is left untouched.
    pub fn replace_region(&mut self, region: Region, nodes: Vec<Node>) -> Result<(), PageError> {
        let path = self.region_path(region)?;
        let el = markup::element_at_mut(&mut self.nodes, &path)
            .ok_or(PageError::MissingRegion { region })?;
        el.replace_children(nodes);
        Ok(())
    }

    /// Markup of the whole page.
    #[must_use]
    pub fn to_html(&self) -> String {
        markup::to_html(&self.nodes)
    }

    fn component_path(&self) -> Result<NodePath, PageError> {
        let tag = self.conventions.component_tag.as_str();
        let opaque = self.conventions.template_tag.as_str();
        let mut paths = markup::find_paths(&self.nodes, opaque, &|el: &Element| el.name() == tag);
        match paths.len() {
            0 => Err(PageError::MissingComponent {
                tag: tag.to_string(),
            }),
            1 => Ok(paths.remove(0)),
            _ => Err(PageError::DuplicateComponent {
                tag: tag.to_string(),
            }),
        }
    }

    fn region_path(&self, region: Region) -> Result<NodePath, PageError> {
        let mut component = self.component_path()?;
        let host = markup::element_at(&self.nodes, &component).ok_or(PageError::MissingComponent {
            tag: self.conventions.component_tag.clone(),
        })?;
        let attribute = self.conventions.region_attribute.as_str();
        let opaque = self.conventions.template_tag.as_str();
        let mut paths = markup::find_paths(host.children(), opaque, &|el: &Element| {
            el.attr(attribute) == Some(region.marker())
        });
        match paths.len() {
            0 => Err(PageError::MissingRegion { region }),
            1 => {
                component.append(&mut paths[0]);
                Ok(component)
            }
            _ => Err(PageError::DuplicateRegion { region }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<body>
        <math-exercise>
            <nav data-region="header"><a href="stale">old</a></nav>
            <section data-region="content"/>
            <nav data-region="footer"/>
        </math-exercise>
        <template id="1a"><p>one</p></template>
    </body>"#;

    fn address() -> Url {
        Url::parse("app://exercises/index.html").unwrap()
    }

    #[test]
    fn locates_regions() {
        let doc = Document::parse(PAGE, address()).unwrap();
        doc.check_structure().unwrap();
        assert_eq!(doc.region(Region::Header).unwrap().name(), "nav");
        assert_eq!(doc.region(Region::Content).unwrap().name(), "section");
    }

    #[test]
    fn replace_region_discards_previous_content() {
        let mut doc = Document::parse(PAGE, address()).unwrap();
        doc.replace_region(Region::Header, vec![Node::text("fresh")])
            .unwrap();
        let header = doc.region(Region::Header).unwrap();
        assert_eq!(header.children(), [Node::text("fresh")]);
        assert!(!doc.to_html().contains("stale"));
    }

    #[test]
    fn missing_region_is_reported() {
        let doc = Document::parse(
            r#"<body><math-exercise><section data-region="content"/></math-exercise></body>"#,
            address(),
        )
        .unwrap();
        assert_eq!(
            doc.check_structure(),
            Err(PageError::MissingRegion {
                region: Region::Header
            })
        );
    }

    #[test]
    fn missing_component_is_reported() {
        let mut doc = Document::parse("<body/>", address()).unwrap();
        let err = doc.replace_region(Region::Content, Vec::new()).unwrap_err();
        assert!(matches!(err, PageError::MissingComponent { .. }));
    }

    #[test]
    fn duplicate_region_is_reported() {
        let doc = Document::parse(
            r#"<math-exercise>
                <nav data-region="header"/><nav data-region="header"/>
                <section data-region="content"/><nav data-region="footer"/>
            </math-exercise>"#,
            address(),
        )
        .unwrap();
        assert_eq!(
            doc.region(Region::Header).unwrap_err(),
            PageError::DuplicateRegion {
                region: Region::Header
            }
        );
    }

    #[test]
    fn regions_inside_templates_do_not_count() {
        let doc = Document::parse(
            r#"<body>
                <math-exercise><section data-region="content"/></math-exercise>
                <template id="1a"><nav data-region="header"/></template>
            </body>"#,
            address(),
        )
        .unwrap();
        assert!(matches!(
            doc.region(Region::Header),
            Err(PageError::MissingRegion { .. })
        ));
    }

    #[test]
    fn replace_location_swaps_current_entry() {
        let mut doc = Document::parse(PAGE, address()).unwrap();
        let target = Url::parse("app://exercises/index.html?exercise=1a").unwrap();
        doc.replace_location(target.clone());

        assert_eq!(doc.address(), &target);
        assert_eq!(doc.history().entries().len(), 1);
        assert_eq!(doc.take_navigation(), Some(NavigationKind::Replace));
        assert_eq!(doc.take_navigation(), None);
        assert_eq!(doc.last_navigation(), NavigationKind::Replace);
    }

    #[test]
    fn assign_and_back_walk_history() {
        let mut doc = Document::parse(PAGE, address()).unwrap();
        let second = Url::parse("app://exercises/index.html?exercise=2a").unwrap();
        doc.assign_location(second.clone());
        assert_eq!(doc.history().entries().len(), 2);
        assert_eq!(doc.address(), &second);

        assert!(doc.back());
        assert_eq!(doc.address(), &address());
        assert!(!doc.back());
        assert_eq!(doc.take_navigation(), Some(NavigationKind::Back));
    }

    #[test]
    fn scans_templates_from_the_page() {
        let doc = Document::parse(PAGE, address()).unwrap();
        assert_eq!(doc.scan_templates().unwrap().len(), 1);
    }
}
