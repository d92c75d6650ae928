//! Component registry - the per-call, lazily loaded view of a user's components.

use std::cell::OnceCell;
use std::collections::HashMap;

use story_model::{Component, ComponentLibrary, UserId};

/// Errors raised by a component source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("component source unavailable: {0}")]
    Unavailable(String),
}

/// Backing store that lists the components a user can reference.
pub trait ComponentSource {
    /// The owner's own components, components shared with them, and system components.
    fn list_accessible_components(&self, owner: UserId) -> Result<Vec<Component>, SourceError>;
}

impl ComponentSource for ComponentLibrary {
    fn list_accessible_components(&self, owner: UserId) -> Result<Vec<Component>, SourceError> {
        Ok(self.accessible_to(owner).into_iter().cloned().collect())
    }
}

/// Name to content lookup for one resolution call.
///
/// The backing source is queried at most once, on first lookup. When two
/// accessible components share a name, the owner's own wins over a shared
/// one, and a shared one wins over a system one.
pub struct ComponentRegistry<'s> {
    source: Option<(&'s dyn ComponentSource, UserId)>,
    components: OnceCell<HashMap<String, String>>,
}

impl<'s> ComponentRegistry<'s> {
    /// A registry that loads `owner`'s components from `source` on demand.
    pub fn new(source: &'s dyn ComponentSource, owner: UserId) -> Self {
        Self {
            source: Some((source, owner)),
            components: OnceCell::new(),
        }
    }

    /// A registry holding exactly the given components.
    pub fn from_components(components: impl IntoIterator<Item = Component>) -> Self {
        Self::from_entries(components.into_iter().map(|c| (c.name, c.content)))
    }

    /// A registry from `(name, content)` pairs. Earlier pairs win on duplicate names.
    pub fn from_entries<N, C>(entries: impl IntoIterator<Item = (N, C)>) -> Self
    where
        N: Into<String>,
        C: Into<String>,
    {
        let mut components = HashMap::new();
        for (name, content) in entries {
            components.entry(name.into()).or_insert_with(|| content.into());
        }

        Self {
            source: None,
            components: OnceCell::from(components),
        }
    }

    /// A registry with no components.
    pub fn empty() -> Self {
        Self {
            source: None,
            components: OnceCell::from(HashMap::new()),
        }
    }

    /// Content of the named component.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.components().get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.components().contains_key(name)
    }

    /// Number of components visible through this registry.
    pub fn len(&self) -> usize {
        self.components().len()
    }

    pub fn is_empty(&self) -> bool {
        self.components().is_empty()
    }

    fn components(&self) -> &HashMap<String, String> {
        self.components.get_or_init(|| self.load())
    }

    fn load(&self) -> HashMap<String, String> {
        let Some((source, owner)) = self.source else {
            return HashMap::new();
        };

        let mut listed = match source.list_accessible_components(owner) {
            Ok(listed) => listed,
            Err(err) => {
                tracing::warn!(%owner, error = %err, "failed to load components, expanding with none");
                return HashMap::new();
            }
        };

        listed.sort_by_key(|c| {
            if c.is_owned_by(owner) {
                0
            } else if c.is_shared_with(owner) {
                1
            } else {
                2
            }
        });

        let mut components = HashMap::with_capacity(listed.len());
        for component in listed {
            components.entry(component.name).or_insert(component.content);
        }

        tracing::debug!(%owner, count = components.len(), "loaded component registry");
        components
    }
}

impl std::fmt::Debug for ComponentRegistry<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("owner", &self.source.map(|(_, owner)| owner))
            .field("loaded", &self.components.get().map(HashMap::len))
            .finish()
    }
}
