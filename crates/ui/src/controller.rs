//! The `<math-exercise>` component: resolves the active exercise from the page
//! address and renders content, header and footer navigation.

use exercise_core::{
    Element, ExerciseId, IdError, Node, Progression, ProgressionError, Randomizer, Registry,
    RegistryError,
};
use thiserror::Error;
use url::Url;

use crate::address;
use crate::binding::InputBinding;
use crate::document::{Document, PageError, Region};
use crate::keyboard::{Key, SubscriptionId};

/// Fatal conditions that halt a render. None of them is retried.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RenderError {
    #[error("invalid `{parameter}` parameter: {source}")]
    MalformedParameter {
        parameter: String,
        #[source]
        source: IdError,
    },
    #[error("unknown exercise: {id}")]
    UnknownExercise { id: ExerciseId },
    #[error("no fragment registered for exercise {id}")]
    MissingFragment { id: ExerciseId },
    #[error("navigation did not settle after {reloads} reloads")]
    NavigationLoop { reloads: usize },
    #[error(transparent)]
    Page(#[from] PageError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Progression(#[from] ProgressionError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The address had no exercise; a replace-navigation to `to` is pending.
    Redirected { to: Url },
    /// All three regions now show `exercise`.
    Displayed {
        exercise: ExerciseId,
        placeholders: usize,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    Ignored,
    Rendered(RenderOutcome),
}

/// The render controller.
///
/// Owns the registry it was built with. The active exercise is never stored:
/// every render reads it from the page address.
#[derive(Debug)]
pub struct ExerciseElement {
    registry: Registry,
    progression: Progression,
    randomizer: Randomizer,
    binding: Option<InputBinding>,
}

impl ExerciseElement {
    /// # Errors
    ///
    /// Returns `RenderError::Progression` when `registry` is empty.
    pub fn new(registry: Registry, randomizer: Randomizer) -> Result<Self, RenderError> {
        let progression = Progression::order(&registry)?;
        Ok(Self {
            registry,
            progression,
            randomizer,
            binding: None,
        })
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub fn progression(&self) -> &Progression {
        &self.progression
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.binding.is_some()
    }

    #[must_use]
    pub fn subscription(&self) -> Option<SubscriptionId> {
        self.binding.as_ref().map(InputBinding::subscription)
    }

    /// Subscribes to the page keyboard stream, then renders.
    ///
    /// The subscription is held even if the render fails; `detach` releases
    /// it.
    ///
    /// # Errors
    ///
    /// See [`ExerciseElement::render`].
    pub fn attach(&mut self, doc: &mut Document) -> Result<RenderOutcome, RenderError> {
        self.detach();
        self.binding = Some(InputBinding::acquire(doc.keyboard()));
        tracing::info!(
            exercises = self.progression.as_slice().len(),
            address = %doc.address(),
            "exercise element attached"
        );
        self.render(doc)
    }

    /// Releases the keyboard subscription. Returns `false` if not attached.
    pub fn detach(&mut self) -> bool {
        let released = self.binding.take().is_some();
        if released {
            tracing::info!("exercise element detached");
        }
        released
    }

    /// Resolves the address and renders content, header and footer, in that
    /// order. Each region's previous content is replaced, never appended to.
    ///
    /// # Errors
    ///
    /// Fails before touching any region if the exercise parameter is
    /// malformed or unknown, or if a region is missing.
    pub fn render(&mut self, doc: &mut Document) -> Result<RenderOutcome, RenderError> {
        let parameter = doc.conventions().parameter.clone();
        let current = doc.address().clone();

        let Some(exercise) = self.resolve(&current, &parameter)? else {
            let to = address::with_param(&current, &parameter, self.progression.first().as_str());
            tracing::info!(from = %current, to = %to, "no exercise in address, redirecting");
            doc.replace_location(to.clone());
            return Ok(RenderOutcome::Redirected { to });
        };

        doc.check_structure()?;
        let placeholders = self.render_content(doc, &exercise)?;
        self.render_header(doc, &current, &parameter, &exercise)?;
        self.render_footer(doc, &current, &parameter, &exercise)?;
        tracing::debug!(%exercise, placeholders, "rendered");
        Ok(RenderOutcome::Displayed {
            exercise,
            placeholders,
        })
    }

    /// Handles a key delivered to `subscription`. Space re-renders the
    /// current exercise in place; the address does not change.
    ///
    /// # Errors
    ///
    /// See [`ExerciseElement::render`].
    pub fn handle_key(
        &mut self,
        doc: &mut Document,
        subscription: SubscriptionId,
        key: Key,
    ) -> Result<KeyOutcome, RenderError> {
        let triggered = self
            .binding
            .as_ref()
            .is_some_and(|binding| binding.triggers(subscription, key));
        if !triggered {
            return Ok(KeyOutcome::Ignored);
        }
        self.render(doc).map(KeyOutcome::Rendered)
    }

    fn resolve(&self, current: &Url, parameter: &str) -> Result<Option<ExerciseId>, RenderError> {
        let Some(raw) = address::param(current, parameter) else {
            return Ok(None);
        };
        let id = ExerciseId::parse(&raw).map_err(|source| RenderError::MalformedParameter {
            parameter: parameter.to_string(),
            source,
        })?;
        if !self.progression.contains(&id) {
            return Err(RenderError::UnknownExercise { id });
        }
        Ok(Some(id))
    }

    fn render_content(
        &mut self,
        doc: &mut Document,
        exercise: &ExerciseId,
    ) -> Result<usize, RenderError> {
        let fragment = self
            .registry
            .get(exercise)
            .ok_or_else(|| RenderError::MissingFragment {
                id: exercise.clone(),
            })?;
        let mut nodes = fragment.instantiate();
        let marker = doc.conventions().placeholder_attribute.clone();
        let placeholders = self.randomizer.fill(&mut nodes, &marker);
        doc.replace_region(Region::Content, nodes)?;
        Ok(placeholders)
    }

    fn render_header(
        &self,
        doc: &mut Document,
        current: &Url,
        parameter: &str,
        exercise: &ExerciseId,
    ) -> Result<(), RenderError> {
        let links = self
            .progression
            .iter()
            .map(|id| {
                let mut link = exercise_link(current, parameter, id).with_text(id.as_str());
                if id == exercise {
                    link.set_attr("aria-current", "page");
                }
                Node::from(link)
            })
            .collect();
        doc.replace_region(Region::Header, links)?;
        Ok(())
    }

    fn render_footer(
        &self,
        doc: &mut Document,
        current: &Url,
        parameter: &str,
        exercise: &ExerciseId,
    ) -> Result<(), RenderError> {
        let neighbors = self
            .progression
            .neighbors(exercise)
            .ok_or_else(|| RenderError::UnknownExercise {
                id: exercise.clone(),
            })?;
        let mut links = Vec::with_capacity(2);
        if let Some(previous) = neighbors.previous {
            let link = exercise_link(current, parameter, previous)
                .with_attr("rel", "prev")
                .with_text("Previous");
            links.push(Node::from(link));
        }
        if let Some(next) = neighbors.next {
            let link = exercise_link(current, parameter, next)
                .with_attr("rel", "next")
                .with_text("Next");
            links.push(Node::from(link));
        }
        doc.replace_region(Region::Footer, links)?;
        Ok(())
    }
}

fn exercise_link(current: &Url, parameter: &str, id: &ExerciseId) -> Element {
    let href = address::with_param(current, parameter, id.as_str());
    Element::new("a")
        .with_attr("href", href.as_str())
        .with_attr("data-exercise", id.as_str())
}

#[cfg(test)]
mod tests {
    use exercise_core::RandomSource;

    use super::*;

    const PAGE: &str = r#"<body>
        <math-exercise>
            <nav data-region="header"><a href="stale">stale</a></nav>
            <section data-region="content"><p>loading</p></section>
            <nav data-region="footer"/>
        </math-exercise>
        <template id="2a"><p>two: <span data-placeholder=""/></p></template>
        <template id="10b"><p>ten: <span data-placeholder=""/> + <span data-placeholder=""/></p></template>
        <template id="1a"><p>one</p></template>
    </body>"#;

    fn page(query: &str) -> Document {
        let address = Url::parse(&format!("app://exercises/index.html{query}")).unwrap();
        Document::parse(PAGE, address).unwrap()
    }

    fn element(doc: &Document) -> ExerciseElement {
        let registry = doc.scan_templates().unwrap();
        ExerciseElement::new(registry, Randomizer::new(RandomSource::Seeded(5))).unwrap()
    }

    fn links(doc: &Document, region: Region) -> Vec<Element> {
        doc.region(region)
            .unwrap()
            .children()
            .iter()
            .filter_map(Node::as_element)
            .cloned()
            .collect()
    }

    fn id(raw: &str) -> ExerciseId {
        raw.parse().unwrap()
    }

    #[test]
    fn progression_is_lexicographic() {
        let doc = page("");
        let el = element(&doc);
        let order: Vec<&str> = el.progression().iter().map(ExerciseId::as_str).collect();
        assert_eq!(order, ["10b", "1a", "2a"]);
    }

    #[test]
    fn bare_address_redirects_to_first_entry() {
        let mut doc = page("?lang=en");
        let mut el = element(&doc);

        let outcome = el.render(&mut doc).unwrap();
        let expected = Url::parse("app://exercises/index.html?lang=en&exercise=10b").unwrap();
        assert_eq!(outcome, RenderOutcome::Redirected { to: expected.clone() });
        assert_eq!(doc.address(), &expected);
        assert_eq!(doc.history().entries().len(), 1);
        assert!(doc.has_pending_navigation());
        assert_eq!(links(&doc, Region::Content).len(), 1, "content untouched");
    }

    #[test]
    fn renders_content_with_placeholders() {
        let mut doc = page("?exercise=10b");
        let mut el = element(&doc);

        let outcome = el.render(&mut doc).unwrap();
        assert_eq!(
            outcome,
            RenderOutcome::Displayed {
                exercise: id("10b"),
                placeholders: 2
            }
        );
        let content = doc.region(Region::Content).unwrap();
        assert!(content.text().starts_with("ten: "));
        assert!(!content.text().contains("loading"));
    }

    #[test]
    fn header_lists_every_exercise_and_marks_current() {
        let mut doc = page("?exercise=1a");
        let mut el = element(&doc);
        el.render(&mut doc).unwrap();

        let header = links(&doc, Region::Header);
        let labels: Vec<String> = header.iter().map(Element::text).collect();
        assert_eq!(labels, ["10b", "1a", "2a"]);
        let current: Vec<&str> = header
            .iter()
            .filter(|link| link.attr("aria-current") == Some("page"))
            .filter_map(|link| link.attr("data-exercise"))
            .collect();
        assert_eq!(current, ["1a"]);
        assert_eq!(
            header[2].attr("href"),
            Some("app://exercises/index.html?exercise=2a")
        );
    }

    #[test]
    fn footer_omits_links_at_the_boundaries() {
        let cases = [
            ("10b", vec![("next", "1a")]),
            ("1a", vec![("prev", "10b"), ("next", "2a")]),
            ("2a", vec![("prev", "1a")]),
        ];
        for (active, expected) in cases {
            let mut doc = page(&format!("?exercise={active}"));
            let mut el = element(&doc);
            el.render(&mut doc).unwrap();

            let footer: Vec<(String, String)> = links(&doc, Region::Footer)
                .iter()
                .map(|link| {
                    (
                        link.attr("rel").unwrap_or_default().to_string(),
                        link.attr("data-exercise").unwrap_or_default().to_string(),
                    )
                })
                .collect();
            let expected: Vec<(String, String)> = expected
                .into_iter()
                .map(|(rel, target)| (rel.to_string(), target.to_string()))
                .collect();
            assert_eq!(footer, expected, "footer for {active}");
        }
    }

    #[test]
    fn unknown_exercise_is_fatal_and_renders_nothing() {
        let mut doc = page("?exercise=3a");
        let before = doc.to_html();
        let mut el = element(&doc);

        let err = el.render(&mut doc).unwrap_err();
        assert!(matches!(err, RenderError::UnknownExercise { id } if id.as_str() == "3a"));
        assert_eq!(doc.to_html(), before);
        assert!(!doc.has_pending_navigation());
    }

    #[test]
    fn malformed_exercise_is_fatal_and_renders_nothing() {
        for query in ["?exercise=A1", "?exercise=", "?exercise=1a1"] {
            let mut doc = page(query);
            let before = doc.to_html();
            let mut el = element(&doc);

            let err = el.render(&mut doc).unwrap_err();
            assert!(
                matches!(err, RenderError::MalformedParameter { .. }),
                "{query}: {err}"
            );
            assert_eq!(doc.to_html(), before);
        }
    }

    #[test]
    fn missing_region_is_fatal_before_content() {
        let mut doc = Document::parse(
            r#"<body>
                <math-exercise><section data-region="content"><p>keep</p></section></math-exercise>
                <template id="1a"><p>one</p></template>
            </body>"#,
            Url::parse("app://exercises/?exercise=1a").unwrap(),
        )
        .unwrap();
        let mut el = element(&doc);

        let err = el.render(&mut doc).unwrap_err();
        assert!(matches!(
            err,
            RenderError::Page(PageError::MissingRegion {
                region: Region::Header
            })
        ));
        assert!(doc.to_html().contains("keep"));
    }

    #[test]
    fn empty_registry_cannot_build_an_element() {
        let err = ExerciseElement::new(Registry::default(), Randomizer::default()).unwrap_err();
        assert!(matches!(err, RenderError::Progression(ProgressionError::Empty)));
    }

    #[test]
    fn space_rerenders_without_navigation() {
        let mut doc = page("?exercise=10b");
        let mut el = element(&doc);
        el.attach(&mut doc).unwrap();
        let subscription = el.subscription().unwrap();
        let address = doc.address().clone();

        let mut contents = vec![doc.region(Region::Content).unwrap().to_html()];
        for _ in 0..10 {
            let outcome = el.handle_key(&mut doc, subscription, Key::Space).unwrap();
            assert!(matches!(
                outcome,
                KeyOutcome::Rendered(RenderOutcome::Displayed { ref exercise, .. }) if exercise.as_str() == "10b"
            ));
            contents.push(doc.region(Region::Content).unwrap().to_html());
        }
        assert_eq!(doc.address(), &address);
        assert!(!doc.has_pending_navigation());
        assert!(contents.windows(2).any(|pair| pair[0] != pair[1]));
    }

    #[test]
    fn other_keys_are_ignored() {
        let mut doc = page("?exercise=1a");
        let mut el = element(&doc);
        el.attach(&mut doc).unwrap();
        let subscription = el.subscription().unwrap();

        let outcome = el.handle_key(&mut doc, subscription, Key::Enter).unwrap();
        assert_eq!(outcome, KeyOutcome::Ignored);
    }

    #[test]
    fn detach_releases_the_subscription() {
        let mut doc = page("?exercise=10b");
        let mut el = element(&doc);
        el.attach(&mut doc).unwrap();
        let subscription = el.subscription().unwrap();
        assert_eq!(doc.keyboard().len(), 1);

        assert!(el.detach());
        assert!(!el.detach());
        assert!(doc.keyboard().is_empty());

        let before = doc.to_html();
        let outcome = el.handle_key(&mut doc, subscription, Key::Space).unwrap();
        assert_eq!(outcome, KeyOutcome::Ignored);
        assert_eq!(doc.to_html(), before);
    }

    #[test]
    fn reattach_does_not_leak_subscriptions() {
        let mut doc = page("?exercise=10b");
        let mut el = element(&doc);
        for _ in 0..3 {
            el.attach(&mut doc).unwrap();
        }
        assert_eq!(doc.keyboard().len(), 1);
        el.detach();
        assert!(doc.keyboard().is_empty());
    }
}
