//! Configuration schema types for Forma.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod api;
mod logging;
mod stream;

pub use api::*;
pub use logging::*;
pub use stream::*;

use serde::{Deserialize, Serialize};

/// Root configuration for the `forma` host.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FormaConfig {
    pub api: ApiConfig,
    pub stream: StreamConfig,
    pub logging: LoggingConfig,
}
