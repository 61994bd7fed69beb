//! Grid configuration.

use serde::{Deserialize, Serialize};

/// Initial grid dimensions.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    pub rows: usize,
    pub cols: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig { rows: 50, cols: 26 }
    }
}
