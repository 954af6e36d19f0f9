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

//! Per-module capability views over the frozen [`ServiceRegistry`].

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use super::{ServiceRegistry, ServiceToken, TokenId};
use crate::error::ServiceError;

/// A read-only handle to the service registry, optionally restricted to a
/// whitelist of tokens.
///
/// A restricted view answers `get` with `None` and `get_or_err` with
/// [`ServiceError::Unauthorized`] for any token outside its whitelist, even
/// when the token is registered. This is how a module is limited to the ports
/// it declared instead of whatever happens to be in the bag.
#[derive(Clone)]
pub struct ServiceView {
    registry: Arc<ServiceRegistry>,
    grants: Option<Arc<HashSet<TokenId>>>,
    owner: Arc<str>,
}

impl ServiceView {
    /// A view exposing every registered service.
    pub fn unrestricted(registry: Arc<ServiceRegistry>, owner: &str) -> Self {
        Self {
            registry,
            grants: None,
            owner: Arc::from(owner),
        }
    }

    /// A view exposing only the whitelisted tokens.
    pub fn restricted(
        registry: Arc<ServiceRegistry>,
        owner: &str,
        whitelist: impl IntoIterator<Item = TokenId>,
    ) -> Self {
        Self {
            registry,
            grants: Some(Arc::new(whitelist.into_iter().collect())),
            owner: Arc::from(owner),
        }
    }

    /// The id of the module this view was built for.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Returns `true` if this view has no whitelist.
    pub fn is_unrestricted(&self) -> bool {
        self.grants.is_none()
    }

    /// Returns `true` if the token is visible through this view.
    pub fn is_granted(&self, token: TokenId) -> bool {
        self.grants
            .as_ref()
            .map_or(true, |grants| grants.contains(&token))
    }

    /// Retrieves the service stored under `K`, or `None` when it is absent or
    /// not granted to this view.
    pub fn get<K: ServiceToken>(&self) -> Option<Arc<K::Service>> {
        if !self.is_granted(TokenId::of::<K>()) {
            log::trace!(
                "View '{}' denied read of ungranted service '{}'.",
                self.owner,
                K::NAME
            );
            return None;
        }
        self.registry.get::<K>()
    }

    /// Retrieves the service stored under `K`.
    ///
    /// Fails with [`ServiceError::Unauthorized`] when the token is outside the
    /// whitelist and with [`ServiceError::Missing`] when no module registered it.
    pub fn get_or_err<K: ServiceToken>(&self) -> Result<Arc<K::Service>, ServiceError> {
        if !self.is_granted(TokenId::of::<K>()) {
            return Err(ServiceError::Unauthorized {
                token: K::NAME,
                module: self.owner.to_string(),
            });
        }
        self.registry.get_or_err::<K>()
    }

    /// Returns `true` if `K` is both granted and registered.
    pub fn has<K: ServiceToken>(&self) -> bool {
        self.is_granted(TokenId::of::<K>()) && self.registry.has::<K>()
    }
}

impl fmt::Debug for ServiceView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let grants = self.grants.as_ref().map(|g| {
            let mut names: Vec<&str> = g.iter().map(|t| t.name()).collect();
            names.sort_unstable();
            names
        });
        f.debug_struct("ServiceView")
            .field("owner", &self.owner)
            .field("grants", &grants)
            .finish()
    }
}
