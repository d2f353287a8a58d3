use std::collections::BTreeMap;

use thiserror::Error;

use crate::conventions::Conventions;
use crate::model::markup::{self, Node};
use crate::model::{ExerciseId, IdError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RegistryError {
    #[error("template #{index} has no id attribute")]
    MissingId { index: usize },
    #[error("template #{index}: {source}")]
    InvalidId {
        index: usize,
        #[source]
        source: IdError,
    },
    #[error("duplicate template id: {id}")]
    DuplicateId { id: ExerciseId },
}

/// One fragment declaration as found in the host page, before validation.
#[derive(Clone, Copy, Debug)]
pub struct TemplateDecl<'a> {
    pub id: Option<&'a str>,
    pub content: &'a [Node],
}

/// An exercise's inert markup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fragment {
    id: ExerciseId,
    content: Vec<Node>,
}

impl Fragment {
    #[must_use]
    pub fn id(&self) -> &ExerciseId {
        &self.id
    }

    #[must_use]
    pub fn content(&self) -> &[Node] {
        &self.content
    }

    /// A fresh deep copy of the fragment content, free to mutate.
    #[must_use]
    pub fn instantiate(&self) -> Vec<Node> {
        self.content.clone()
    }
}

/// Validated fragments indexed by exercise id. Immutable once built.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    fragments: BTreeMap<ExerciseId, Fragment>,
}

impl Registry {
    /// Validates and indexes fragment declarations in the order given.
    ///
    /// # Errors
    ///
    /// Fails on the first declaration without an id, with a malformed id, or
    /// whose id is already registered.
    pub fn build<'a>(
        decls: impl IntoIterator<Item = TemplateDecl<'a>>,
    ) -> Result<Self, RegistryError> {
        let mut fragments = BTreeMap::new();
        for (index, decl) in decls.into_iter().enumerate() {
            let raw = decl.id.ok_or(RegistryError::MissingId { index })?;
            let id = ExerciseId::parse(raw)
                .map_err(|source| RegistryError::InvalidId { index, source })?;
            if fragments.contains_key(&id) {
                return Err(RegistryError::DuplicateId { id });
            }
            let fragment = Fragment {
                id: id.clone(),
                content: decl.content.to_vec(),
            };
            fragments.insert(id, fragment);
        }
        Ok(Self { fragments })
    }

    /// Scans `nodes` for fragment declarations and builds the registry.
    ///
    /// Declarations nested inside another declaration's content are inert
    /// and ignored.
    ///
    /// # Errors
    ///
    /// See [`Registry::build`].
    pub fn scan(nodes: &[Node], conventions: &Conventions) -> Result<Self, RegistryError> {
        let tag = conventions.template_tag.as_str();
        let paths = markup::find_paths(nodes, tag, &|el: &markup::Element| el.name() == tag);
        let decls = paths
            .iter()
            .filter_map(|path| markup::element_at(nodes, path))
            .map(|el| TemplateDecl {
                id: el.attr(&conventions.id_attribute),
                content: el.children(),
            });
        Self::build(decls)
    }

    #[must_use]
    pub fn get(&self, id: &ExerciseId) -> Option<&Fragment> {
        self.fragments.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &ExerciseId) -> bool {
        self.fragments.contains_key(id)
    }

    /// Registered ids, ascending.
    pub fn ids(&self) -> impl Iterator<Item = &ExerciseId> {
        self.fragments.keys()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}
