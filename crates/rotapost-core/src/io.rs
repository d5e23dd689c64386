use crate::error::Result;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Atomically write `data` to `path` using a tempfile in the same directory.
/// Prevents partial writes from corrupting state files.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Sibling backup path: `history.json` → `history.json.bak`.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".bak");
    path.with_file_name(name)
}

/// Refresh the `.bak` sibling from the current contents of `path`, then
/// atomically replace `path` with `data`.
///
/// The backup is only refreshed when `still_valid` accepts the current bytes,
/// so a torn primary never overwrites a good backup. Both files are written
/// through [`atomic_write`]; after a crash each holds either its previous
/// contents or the complete new ones. A failed backup refresh is logged and
/// does not block the write.
pub fn atomic_write_with_backup(
    path: &Path,
    data: &[u8],
    still_valid: impl FnOnce(&[u8]) -> bool,
) -> Result<()> {
    if path.exists() {
        let backup = backup_path(path);
        match std::fs::read(path) {
            Ok(current) if still_valid(&current) => {
                if let Err(e) = atomic_write(&backup, &current) {
                    tracing::warn!(path = %backup.display(), error = %e, "failed to refresh backup");
                }
            }
            Ok(_) => {
                tracing::warn!(path = %path.display(), "current file is invalid, keeping previous backup");
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read file for backup");
            }
        }
    }
    atomic_write(path, data)
}

/// Write a file only if it does not already exist. Returns true if written.
pub fn write_if_missing(path: &Path, data: &[u8]) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    atomic_write(path, data)?;
    Ok(true)
}
