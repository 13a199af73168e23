//! Service key file.
//!
//! The service root key signs certificates and the system witness
//! attestation. It is stored as a single line of base64 and created with
//! a fresh random key on first use.

use std::path::Path;

use zeroize::Zeroize;

use crate::error::{Result, ScoringError};
use crate::provenance::Ed25519WitnessSigner;

/// Load the service key at `path`, generating and saving one if absent.
pub fn load_or_create_service_key(path: &Path) -> Result<Ed25519WitnessSigner> {
    if path.exists() {
        return load_service_key(path);
    }

    let signer = Ed25519WitnessSigner::generate();
    let mut encoded = signer.key_pair().signing_key_base64();
    let written = write_atomic(path, format!("{encoded}\n").as_bytes());
    encoded.zeroize();
    written?;

    log::info!("created service key at {}", path.display());
    Ok(signer)
}

/// Load an existing service key.
pub fn load_service_key(path: &Path) -> Result<Ed25519WitnessSigner> {
    let mut contents = std::fs::read_to_string(path)?;
    let signer = Ed25519WitnessSigner::from_base64(contents.trim()).map_err(|e| {
        ScoringError::InvalidFileFormat(format!("invalid service key {}: {e}", path.display()))
    });
    contents.zeroize();
    signer
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Write `data` to `path` via a sibling temp file and `rename`, owner-only
/// on Unix.
fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("key.tmp");
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(&tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;

    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
