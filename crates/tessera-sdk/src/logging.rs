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

//! Logging bootstrap for binaries and tests.

use env_logger::{Builder, Env};

/// Installs `env_logger`, honouring `RUST_LOG` and falling back to
/// `default_filter` (e.g. `"info"` or `"tessera_render=debug"`).
///
/// Calling it again after a logger is installed does nothing.
pub fn init(default_filter: &str) {
    let result = Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .try_init();
    if result.is_err() {
        log::debug!("A logger was already installed; keeping it.");
    }
}

/// Installs a test logger that cooperates with the test harness's output
/// capture. Safe to call from every test.
pub fn init_for_tests() {
    let _ = Builder::from_env(Env::default().default_filter_or("debug"))
        .is_test(true)
        .try_init();
}
