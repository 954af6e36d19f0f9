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

//! Capability tokens: zero-sized marker types naming one service interface.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A capability key for the [`ServiceRegistry`](super::ServiceRegistry).
///
/// Each token is a distinct zero-sized type, so two tokens can never collide
/// and the registry can tie the stored value to `Self::Service` at compile
/// time. Declare tokens with [`define_token!`](crate::define_token).
pub trait ServiceToken: 'static {
    /// The interface stored under this token, usually a `dyn Trait`.
    type Service: ?Sized + Send + Sync + 'static;

    /// Human-readable name used in logs and error messages.
    const NAME: &'static str;
}

/// The runtime, type-erased identity of a [`ServiceToken`].
///
/// Used where tokens of different service types must live in one collection,
/// such as capability whitelists. Equality and hashing only consider the
/// token type; the name is carried for diagnostics.
#[derive(Clone, Copy)]
pub struct TokenId {
    type_id: TypeId,
    name: &'static str,
}

impl TokenId {
    /// Returns the identity of token `K`.
    pub fn of<K: ServiceToken>() -> Self {
        Self {
            type_id: TypeId::of::<K>(),
            name: K::NAME,
        }
    }

    /// The token's diagnostic name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn type_id(&self) -> TypeId {
        self.type_id
    }
}

impl PartialEq for TokenId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for TokenId {}

impl Hash for TokenId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenId({})", self.name)
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Declares a zero-sized [`ServiceToken`] type.
///
/// ```rust
/// use tessera_core::define_token;
///
/// pub trait Clock: Send + Sync {
///     fn now_ms(&self) -> f64;
/// }
///
/// define_token!(
///     /// Read access to the frame clock.
///     pub ClockToken => dyn Clock, "clock/read"
/// );
///
/// assert_eq!(tessera_core::service::TokenId::of::<ClockToken>().name(), "clock/read");
/// ```
#[macro_export]
macro_rules! define_token {
    ($(#[$meta:meta])* $vis:vis $token:ident => $service:ty, $name:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis struct $token;

        impl $crate::service::ServiceToken for $token {
            type Service = $service;
            const NAME: &'static str = $name;
        }
    };
}
