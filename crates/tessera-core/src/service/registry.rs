// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The engine-wide service bag.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::{ServiceToken, TokenId};
use crate::error::ServiceError;

struct ServiceEntry {
    token: TokenId,
    // Always an `Arc<K::Service>` for the token `K` the entry is keyed by.
    service: Box<dyn Any + Send + Sync>,
}

/// A service registry keyed by [`ServiceToken`] types.
///
/// Modules write their services here during `init()`; afterwards the registry
/// is frozen behind an `Arc` and only read through
/// [`ServiceView`](super::ServiceView)s. The registry performs no locking:
/// writes need `&mut self`, which only the engine holds during `init()`.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use tessera_core::define_token;
/// use tessera_core::service::ServiceRegistry;
///
/// pub trait Score: Send + Sync {
///     fn value(&self) -> i32;
/// }
/// struct Fixed(i32);
/// impl Score for Fixed {
///     fn value(&self) -> i32 { self.0 }
/// }
/// define_token!(ScoreToken => dyn Score, "score/read");
///
/// let mut registry = ServiceRegistry::new();
/// registry.set::<ScoreToken>(Arc::new(Fixed(42)));
///
/// let score = registry.get::<ScoreToken>().unwrap();
/// assert_eq!(score.value(), 42);
/// ```
#[derive(Default)]
pub struct ServiceRegistry {
    services: HashMap<TypeId, ServiceEntry>,
}

impl ServiceRegistry {
    /// Creates an empty service registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            services: HashMap::new(),
        }
    }

    /// Stores the implementation for token `K`.
    ///
    /// Tokens are expected to be written once; a second write replaces the
    /// first and is logged.
    pub fn set<K: ServiceToken>(&mut self, service: Arc<K::Service>) {
        let entry = ServiceEntry {
            token: TokenId::of::<K>(),
            service: Box::new(service),
        };
        if self.services.insert(TypeId::of::<K>(), entry).is_some() {
            log::warn!("Service '{}' registered twice; the last write wins.", K::NAME);
        } else {
            log::debug!("Service '{}' registered.", K::NAME);
        }
    }

    /// Retrieves the implementation stored under `K`, if any.
    #[must_use]
    pub fn get<K: ServiceToken>(&self) -> Option<Arc<K::Service>> {
        self.services
            .get(&TypeId::of::<K>())
            .and_then(|entry| entry.service.downcast_ref::<Arc<K::Service>>())
            .cloned()
    }

    /// Retrieves the implementation stored under `K`, failing with
    /// [`ServiceError::Missing`] when no module registered it.
    pub fn get_or_err<K: ServiceToken>(&self) -> Result<Arc<K::Service>, ServiceError> {
        self.get::<K>()
            .ok_or(ServiceError::Missing { token: K::NAME })
    }

    /// Returns `true` if a service is stored under `K`.
    #[must_use]
    pub fn has<K: ServiceToken>(&self) -> bool {
        self.services.contains_key(&TypeId::of::<K>())
    }

    /// Returns `true` if a service is stored under the type-erased token.
    #[must_use]
    pub fn contains(&self, token: TokenId) -> bool {
        self.services.contains_key(&token.type_id())
    }

    /// Iterates over the tokens currently registered, in no particular order.
    pub fn tokens(&self) -> impl Iterator<Item = TokenId> + '_ {
        self.services.values().map(|entry| entry.token)
    }

    /// Returns the number of registered services.
    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Returns `true` if no services are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.tokens().map(|t| t.name()).collect();
        names.sort_unstable();
        f.debug_struct("ServiceRegistry")
            .field("services", &names)
            .finish()
    }
}
