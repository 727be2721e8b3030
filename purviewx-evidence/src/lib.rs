//! Evidence binder generation.
//!
//! A binder is an immutable snapshot of a wizard configuration stamped with
//! a version, a generation time and the configuration checksum. Every call
//! to [`generate_binder`] builds a new binder; callers own the version
//! counter and pass `previous + 1` for the next generation.

use chrono::{DateTime, SecondsFormat, Utc};
use purviewx_types::{EvidenceBinder, WizardData};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum BinderError {
    #[error("binder version {0} is the highest supported; versions must keep increasing")]
    VersionExhausted(u32),

    #[error("serialize wizard snapshot for checksum: {0}")]
    Checksum(#[from] serde_json::Error),
}

/// Simulated time spent collecting and packaging evidence.
pub const DEFAULT_PACKAGING_DELAY: Duration = Duration::from_millis(2500);

/// Build a binder after the packaging delay.
///
/// The snapshot is taken when the call starts; the timestamp when packaging
/// finishes.
pub async fn generate_binder(
    data: &WizardData,
    version: u32,
    packaging_delay: Duration,
) -> Result<EvidenceBinder, BinderError> {
    let snapshot = data.clone();
    debug!(version, delay_ms = packaging_delay.as_millis() as u64, "packaging evidence");
    tokio::time::sleep(packaging_delay).await;

    let binder = binder_at(snapshot, version, Utc::now())?;
    info!(version, checksum = %binder.checksum, "evidence binder generated");
    Ok(binder)
}

/// Build a binder stamped with `at`. Deterministic for a fixed `at`.
pub fn binder_at(
    data: WizardData,
    version: u32,
    at: DateTime<Utc>,
) -> Result<EvidenceBinder, BinderError> {
    Ok(EvidenceBinder {
        version,
        timestamp: format_timestamp(at),
        checksum: purviewx_hash::checksum(&data)?,
        data,
    })
}

/// RFC 3339, UTC, millisecond precision, `Z` suffix.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Version for the binder that follows `previous`; 1 when there is none.
pub fn next_version(previous: Option<&EvidenceBinder>) -> Result<u32, BinderError> {
    match previous {
        None => Ok(1),
        Some(b) => b
            .version
            .checked_add(1)
            .ok_or(BinderError::VersionExhausted(b.version)),
    }
}

/// Download file name of the HTML report for a binder version.
pub fn binder_file_name(version: u32) -> String {
    format!("PurviewX-Evidence-Binder-v{}.html", version)
}
