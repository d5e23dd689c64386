use anyhow::Context;
use rotapost_core::pause::PauseMarker;
use rotapost_core::settings::Settings;
use std::path::Path;

fn marker(root: &Path) -> anyhow::Result<PauseMarker> {
    let settings = Settings::load(root).context("failed to load settings")?;
    Ok(PauseMarker::new(settings.pause_path(root)))
}

/// Refuse to continue while the pause marker exists.
pub fn ensure_not_paused(marker: &PauseMarker) -> anyhow::Result<()> {
    if let Some(reason) = marker.reason().context("failed to read pause marker")? {
        let reason = if reason.is_empty() { "no reason given".to_string() } else { reason };
        anyhow::bail!("posting is paused ({reason}); run `rotapost resume` to continue");
    }
    Ok(())
}

pub fn pause(root: &Path, reason: &str) -> anyhow::Result<()> {
    let marker = marker(root)?;
    let reason = if reason.trim().is_empty() { "paused by operator" } else { reason.trim() };
    marker.pause(reason).context("failed to write pause marker")?;
    println!("Paused: {reason}");
    Ok(())
}

pub fn resume(root: &Path) -> anyhow::Result<()> {
    let marker = marker(root)?;
    if marker.resume().context("failed to remove pause marker")? {
        println!("Resumed.");
    } else {
        println!("Not paused.");
    }
    Ok(())
}
