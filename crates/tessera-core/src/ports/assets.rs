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

//! Image asset loading contract.

use async_trait::async_trait;

use crate::define_token;

/// Metadata of a loaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Loads images by key so sprite commands can reference them.
///
/// Loading is asynchronous and expected to happen from `init` or `start`;
/// lookups during the frame loop must not block.
#[async_trait]
pub trait AssetsPort: Send + Sync {
    /// Loads the image at `url` and stores it under `key`.
    async fn load_image(&self, key: &str, url: &str) -> anyhow::Result<ImageInfo>;

    /// Metadata of a previously loaded image.
    fn image(&self, key: &str) -> Option<ImageInfo>;
}

define_token!(
    /// Load and look up images.
    pub AssetsToken => dyn AssetsPort, "assets"
);
