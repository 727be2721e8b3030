use crate::ToolInfo;
use crate::wizard::WizardData;
use serde::{Deserialize, Serialize};

/// Versioned, checksummed snapshot of the deployed configuration.
///
/// Never mutated after creation; regenerating produces a new binder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceBinder {
    pub version: u32,

    /// RFC 3339 UTC generation time.
    pub timestamp: String,

    /// Non-cryptographic configuration checksum (`0x`-prefixed hex).
    pub checksum: String,

    pub data: WizardData,
}

/// `binder.json` wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinderDocument {
    pub schema: String,
    pub tool: ToolInfo,
    pub binder: EvidenceBinder,
}

impl BinderDocument {
    pub fn new(tool: ToolInfo, binder: EvidenceBinder) -> Self {
        Self {
            schema: crate::schema::PURVIEWX_BINDER_V1.to_string(),
            tool,
            binder,
        }
    }
}

/// SHA-256 digests of every file written for one binder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub schema: String,
    pub binder_version: u32,

    #[serde(default)]
    pub files: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub path: String,
    pub sha256: String,
    pub bytes: u64,
}
