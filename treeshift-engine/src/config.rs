//! Engine configuration.

use serde::{Deserialize, Serialize};
use treeshift_types::PageSize;

/// Settings that apply to every call on one engine.
///
/// Destructive page sizes are chosen per call; this only sizes the internal
/// listing used while copying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Page size for listing source collections during a copy.
    #[serde(default)]
    pub copy_page_size: PageSize,
}
