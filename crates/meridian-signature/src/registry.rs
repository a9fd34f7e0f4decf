//! Per-handler cache of signature models.

use crate::model::SignatureModel;
use meridian_core::{MeridianError, MeridianResult};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Identity of a registered handler, typically its operation id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(String);

impl HandlerId {
    /// Creates a handler id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HandlerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for HandlerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Models built at startup, shared read-only across requests.
#[derive(Debug, Default)]
pub struct SignatureRegistry {
    models: HashMap<HandlerId, Arc<SignatureModel>>,
}

impl SignatureRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the model of a handler.
    ///
    /// # Errors
    ///
    /// Returns [`MeridianError::ImproperlyConfigured`] if `id` is taken.
    pub fn register(
        &mut self,
        id: impl Into<HandlerId>,
        model: SignatureModel,
    ) -> MeridianResult<Arc<SignatureModel>> {
        let id = id.into();
        if self.models.contains_key(&id) {
            return Err(MeridianError::improperly_configured(format!(
                "Handler '{id}' is registered twice"
            )));
        }
        let model = Arc::new(model);
        self.models.insert(id, Arc::clone(&model));
        Ok(model)
    }

    /// Returns the model of a handler.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<SignatureModel>> {
        self.models.get(&HandlerId::new(id)).cloned()
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Iterates over registered handlers in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&HandlerId, &Arc<SignatureModel>)> {
        self.models.iter()
    }
}
