//! Component library - reusable prompt snippets and who may use them.
//!
//! Components are referenced from templates as `[[name]]`. A user sees their
//! own components, components other users shared with them, and system
//! components shipped with the platform.

use serde::{Deserialize, Serialize};

use crate::entities::{EntityId, UserId};

/// Errors raised while adding components to a library.
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("component '{0}' already exists in this scope")]
    DuplicateName(String),

    #[error("invalid component name '{0}': use letters, digits and underscores, not starting with a digit")]
    InvalidName(String),

    #[error("failed to parse component TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Who can see a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentScope {
    /// Only the owner.
    Private,
    /// The owner and the listed users.
    Shared(Vec<UserId>),
    /// Every user.
    System,
}

/// A named, reusable template snippet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    pub id: EntityId,
    pub name: String,
    pub content: String,
    /// `None` for system components.
    pub owner: Option<UserId>,
    pub scope: ComponentScope,
}

impl Component {
    /// A component visible only to its owner.
    pub fn private(owner: UserId, name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            content: content.into(),
            owner: Some(owner),
            scope: ComponentScope::Private,
        }
    }

    /// A component visible to its owner and the given users.
    pub fn shared(
        owner: UserId,
        name: impl Into<String>,
        content: impl Into<String>,
        with: impl IntoIterator<Item = UserId>,
    ) -> Self {
        Self {
            scope: ComponentScope::Shared(with.into_iter().collect()),
            ..Self::private(owner, name, content)
        }
    }

    /// A component visible to everyone.
    pub fn system(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            content: content.into(),
            owner: None,
            scope: ComponentScope::System,
        }
    }

    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner == Some(user)
    }

    pub fn is_shared_with(&self, user: UserId) -> bool {
        matches!(&self.scope, ComponentScope::Shared(users) if users.contains(&user))
    }

    pub fn is_system(&self) -> bool {
        self.scope == ComponentScope::System
    }

    /// Two components clash when they share a name and an owner, or are both system components.
    fn clashes_with(&self, other: &Component) -> bool {
        self.name == other.name
            && match (self.is_system(), other.is_system()) {
                (true, true) => true,
                (false, false) => self.owner == other.owner,
                _ => false,
            }
    }
}

/// Check that a name can be referenced as `[[name]]`.
pub fn is_valid_component_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[derive(Debug, Deserialize)]
struct ComponentFile {
    #[serde(default)]
    component: Vec<ComponentSeed>,
}

#[derive(Debug, Deserialize)]
struct ComponentSeed {
    name: String,
    content: String,
}

/// In-memory component store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentLibrary {
    components: Vec<Component>,
}

impl ComponentLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a component, rejecting invalid names and clashes within its scope.
    pub fn add(&mut self, component: Component) -> Result<EntityId, LibraryError> {
        if !is_valid_component_name(&component.name) {
            return Err(LibraryError::InvalidName(component.name));
        }
        if self.components.iter().any(|c| c.clashes_with(&component)) {
            return Err(LibraryError::DuplicateName(component.name));
        }

        let id = component.id;
        self.components.push(component);
        Ok(id)
    }

    /// Remove a component by ID.
    pub fn remove(&mut self, id: EntityId) -> Option<Component> {
        let index = self.components.iter().position(|c| c.id == id)?;
        Some(self.components.remove(index))
    }

    /// Seed system components from a TOML document of `[[component]]` tables.
    ///
    /// ```toml
    /// [[component]]
    /// name = "house_style"
    /// content = "Write in close third person."
    /// ```
    ///
    /// Returns the number of components added. Nothing is added if any entry is rejected.
    pub fn load_system_toml(&mut self, source: &str) -> Result<usize, LibraryError> {
        let file: ComponentFile = toml::from_str(source)?;

        let mut staged = self.clone();
        for seed in &file.component {
            staged.add(Component::system(&seed.name, &seed.content))?;
        }

        *self = staged;
        Ok(file.component.len())
    }

    /// Components visible to `user`: own first, then shared with them, then system.
    pub fn accessible_to(&self, user: UserId) -> Vec<&Component> {
        let own = self.components.iter().filter(|c| c.is_owned_by(user));
        let shared = self
            .components
            .iter()
            .filter(|c| !c.is_owned_by(user) && c.is_shared_with(user));
        let system = self.components.iter().filter(|c| c.is_system());

        own.chain(shared).chain(system).collect()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}
