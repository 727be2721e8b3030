//! Default filesystem-backed port implementations.

use crate::ports::{BinderStore, WizardSource, WritePort};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use purviewx_types::binder::BinderDocument;
use purviewx_types::{EvidenceBinder, WizardData};
use tracing::debug;

/// File name of the binder record inside the output directory.
pub const BINDER_JSON: &str = "binder.json";

/// Loads the wizard snapshot from a JSON file.
#[derive(Debug, Clone)]
pub struct FsWizardSource {
    pub path: Utf8PathBuf,
}

impl FsWizardSource {
    pub fn new(path: Utf8PathBuf) -> Self {
        Self { path }
    }
}

impl WizardSource for FsWizardSource {
    fn load_wizard(&self) -> anyhow::Result<WizardData> {
        let contents =
            fs::read_to_string(&self.path).with_context(|| format!("read {}", self.path))?;
        serde_json::from_str(&contents).with_context(|| format!("parse {}", self.path))
    }
}

/// In-memory wizard snapshot for embedding and testing.
#[derive(Debug, Clone)]
pub struct InMemoryWizardSource {
    data: WizardData,
}

impl InMemoryWizardSource {
    pub fn new(data: WizardData) -> Self {
        Self { data }
    }
}

impl WizardSource for InMemoryWizardSource {
    fn load_wizard(&self) -> anyhow::Result<WizardData> {
        Ok(self.data.clone())
    }
}

/// Reads `binder.json` from the output directory.
#[derive(Debug, Clone)]
pub struct FsBinderStore {
    pub out_dir: Utf8PathBuf,
}

impl FsBinderStore {
    pub fn new(out_dir: Utf8PathBuf) -> Self {
        Self { out_dir }
    }
}

impl BinderStore for FsBinderStore {
    fn latest(&self) -> anyhow::Result<Option<EvidenceBinder>> {
        let path = self.out_dir.join(BINDER_JSON);
        if !path.exists() {
            debug!("no previous binder at {}", path);
            return Ok(None);
        }
        let contents = fs::read_to_string(&path).with_context(|| format!("read {}", path))?;
        let doc: BinderDocument =
            serde_json::from_str(&contents).with_context(|| format!("parse {}", path))?;
        debug!(version = doc.binder.version, "found previous binder at {}", path);
        Ok(Some(doc.binder))
    }
}

/// Filesystem write operations.
#[derive(Debug, Clone, Default)]
pub struct FsWritePort;

impl WritePort for FsWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create parent dir for {}", path))?;
        }
        fs::write(path, contents).with_context(|| format!("write {}", path))
    }

    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()> {
        fs::create_dir_all(path).with_context(|| format!("create_dir_all {}", path))
    }
}
