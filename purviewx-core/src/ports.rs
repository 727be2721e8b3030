//! Port traits abstracting all I/O away from the pipeline.

use camino::Utf8Path;
use purviewx_types::{EvidenceBinder, WizardData};

/// Source of the wizard configuration snapshot.
pub trait WizardSource {
    fn load_wizard(&self) -> anyhow::Result<WizardData>;
}

/// Previously generated binders.
pub trait BinderStore {
    /// The most recent binder, if one was generated before.
    fn latest(&self) -> anyhow::Result<Option<EvidenceBinder>>;
}

/// File-system write operations.
pub trait WritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()>;
    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()>;
}
