//! Single-threaded event loop around one host page.
//!
//! Events are processed one at a time and each runs to completion: load,
//! key press, link navigation, history back, unload. A navigation made while
//! handling an event is applied afterwards as a reload, which tears the
//! component down and builds it again from the page, as a browser would.

use exercise_core::{RandomSource, Randomizer};
use url::Url;

use crate::controller::{ExerciseElement, KeyOutcome, RenderError, RenderOutcome};
use crate::document::Document;
use crate::keyboard::Key;

/// Reloads allowed while settling a single event.
pub const MAX_RELOADS: usize = 8;

pub struct PageRuntime {
    document: Document,
    element: Option<ExerciseElement>,
    source: RandomSource,
    loads: u64,
}

impl PageRuntime {
    /// Wraps `document` without loading it.
    #[must_use]
    pub fn new(document: Document, source: RandomSource) -> Self {
        Self {
            document,
            element: None,
            source,
            loads: 0,
        }
    }

    /// Loads the page: builds the registry, attaches the component, and
    /// follows any redirect until the page settles.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error; the document keeps whatever it showed
    /// before the failing render.
    pub fn load(&mut self) -> Result<RenderOutcome, RenderError> {
        // The navigation that triggered this load, if any, is served now.
        self.document.take_navigation();
        let mut outcome = self.mount()?;
        let mut reloads = 0;
        while self.document.take_navigation().is_some() {
            reloads += 1;
            if reloads > MAX_RELOADS {
                return Err(RenderError::NavigationLoop { reloads: MAX_RELOADS });
            }
            outcome = self.mount()?;
        }
        Ok(outcome)
    }

    /// Delivers a page-level key press to every subscribed component.
    ///
    /// # Errors
    ///
    /// Returns the first fatal render error.
    pub fn press(&mut self, key: Key) -> Result<KeyOutcome, RenderError> {
        let mut outcome = KeyOutcome::Ignored;
        for subscription in self.document.keyboard().deliver(key) {
            let Some(element) = self.element.as_mut() else {
                break;
            };
            if let KeyOutcome::Rendered(rendered) =
                element.handle_key(&mut self.document, subscription, key)?
            {
                outcome = KeyOutcome::Rendered(rendered);
            }
        }
        if self.document.has_pending_navigation() {
            self.load()?;
        }
        Ok(outcome)
    }

    /// Follows a link: pushes `url` onto the history and reloads.
    ///
    /// # Errors
    ///
    /// See [`PageRuntime::load`].
    pub fn navigate(&mut self, url: Url) -> Result<RenderOutcome, RenderError> {
        tracing::debug!(%url, "navigate");
        self.document.assign_location(url);
        self.load()
    }

    /// Steps back in history and reloads. `Ok(None)` at the oldest entry.
    ///
    /// # Errors
    ///
    /// See [`PageRuntime::load`].
    pub fn back(&mut self) -> Result<Option<RenderOutcome>, RenderError> {
        if !self.document.back() {
            return Ok(None);
        }
        self.load().map(Some)
    }

    /// Detaches and drops the component.
    pub fn unload(&mut self) {
        if let Some(mut element) = self.element.take() {
            element.detach();
        }
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    #[must_use]
    pub fn element(&self) -> Option<&ExerciseElement> {
        self.element.as_ref()
    }

    /// How many times the component has been mounted.
    #[must_use]
    pub fn loads(&self) -> u64 {
        self.loads
    }

    fn mount(&mut self) -> Result<RenderOutcome, RenderError> {
        self.unload();
        self.loads += 1;
        let registry = self.document.scan_templates()?;
        let randomizer = Randomizer::new(self.randomness());
        let element = self.element.insert(ExerciseElement::new(registry, randomizer)?);
        match element.attach(&mut self.document) {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                tracing::warn!(error = %err, address = %self.document.address(), "render failed");
                Err(err)
            }
        }
    }

    // Seeded pages get a different stream per load so a reload does not
    // repeat the previous numbers.
    fn randomness(&self) -> RandomSource {
        match self.source {
            RandomSource::Entropy => RandomSource::Entropy,
            RandomSource::Seeded(seed) => RandomSource::Seeded(seed.wrapping_add(self.loads)),
        }
    }
}

impl Drop for PageRuntime {
    fn drop(&mut self) {
        self.unload();
    }
}
