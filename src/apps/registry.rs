// App registry: id -> descriptor, built once at startup
//
// The registry is an ordinary value owned by whoever bootstraps it. After
// bootstrap it is wrapped in an Arc and only read.

use super::AppDescriptor;
use crate::error::{LauncherError, Result};
use crate::services::traits::validate_key_segment;
use std::collections::HashMap;
use std::sync::Arc;

/// What `register` does when the id is already present
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Keep the first descriptor and return `DuplicateApp`
    #[default]
    Reject,

    /// Replace the earlier descriptor, keeping its position
    Overwrite,
}

#[derive(Debug, Default)]
pub struct AppRegistry {
    apps: HashMap<String, Arc<AppDescriptor>>,

    /// Registration order, used for store listings
    order: Vec<String>,

    policy: DuplicatePolicy,
}

impl AppRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Add a descriptor, returning it as stored (id trimmed)
    ///
    /// The id doubles as the installed-record key, so it must be a valid
    /// store key segment.
    ///
    /// # Errors
    /// - `LoadError` when the id is empty or not a valid store key
    /// - `DuplicateApp` when the id exists and the policy is `Reject`
    pub fn register(&mut self, mut descriptor: AppDescriptor) -> Result<Arc<AppDescriptor>> {
        let id = descriptor.id.trim().to_string();
        if id.is_empty() {
            return Err(LauncherError::LoadError(format!(
                "App '{}' has no id",
                descriptor.name
            )));
        }
        validate_key_segment("app id", &id).map_err(|_| {
            LauncherError::LoadError(format!(
                "App '{}' has an id that cannot be installed: '{}'",
                descriptor.name, id
            ))
        })?;
        descriptor.id = id.clone();

        if self.apps.contains_key(&id) {
            match self.policy {
                DuplicatePolicy::Reject => return Err(LauncherError::DuplicateApp(id)),
                DuplicatePolicy::Overwrite => {
                    tracing::warn!("Replacing previously registered app '{}'", id);
                }
            }
        } else {
            self.order.push(id.clone());
        }

        let descriptor = Arc::new(descriptor);
        self.apps.insert(id, Arc::clone(&descriptor));
        Ok(descriptor)
    }

    /// Look up a descriptor by id
    pub fn get(&self, id: &str) -> Result<Arc<AppDescriptor>> {
        self.apps
            .get(id)
            .cloned()
            .ok_or_else(|| LauncherError::AppNotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.apps.contains_key(id)
    }

    /// Every descriptor, in registration order
    pub fn all(&self) -> Vec<Arc<AppDescriptor>> {
        self.order
            .iter()
            .filter_map(|id| self.apps.get(id).cloned())
            .collect()
    }

    pub fn ids(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}
