//! Content object names.
//!
//! The CMS identifies resource types as `{entity_type}--{bundle}`
//! (e.g. `node--page`, `menu_items--main`).

use std::fmt;
use std::str::FromStr;

use crate::store::{StoreError, StoreErrorKind};

/// Resource type of a content object.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectName {
    entity_type: String,
    bundle: String,
}

impl ObjectName {
    /// Create an object name from its entity type and bundle.
    #[must_use]
    pub fn new(entity_type: impl Into<String>, bundle: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            bundle: bundle.into(),
        }
    }

    /// Basic page nodes.
    #[must_use]
    pub fn page() -> Self {
        Self::new("node", "page")
    }

    /// Main navigation menu items.
    #[must_use]
    pub fn main_menu() -> Self {
        Self::new("menu_items", "main")
    }

    #[must_use]
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    #[must_use]
    pub fn bundle(&self) -> &str {
        &self.bundle
    }

    /// Resource path below the API prefix (e.g. `node/page`).
    #[must_use]
    pub fn resource_path(&self) -> String {
        format!("{}/{}", self.entity_type, self.bundle)
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}--{}", self.entity_type, self.bundle)
    }
}

impl FromStr for ObjectName {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once("--") {
            Some((entity_type, bundle))
                if !entity_type.is_empty() && !bundle.is_empty() && !bundle.contains("--") =>
            {
                Ok(Self::new(entity_type, bundle))
            }
            _ => Err(StoreError::new(StoreErrorKind::InvalidObject).with_path(s)),
        }
    }
}
