// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-to-temp-then-rename so a reader (a peer instance, or this
//! instance after a crash) never observes a partially written file.

use oms_core::{Error, ErrorKind};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Writes `contents` to `path` atomically: write to `<path>.tmp`, `fsync`,
/// then `rename` over the destination. `rename` within the same directory
/// is atomic on the filesystems this service targets.
pub fn atomic_write(path: &Path, contents: &[u8]) -> Result<(), Error> {
    let tmp_path = path.with_extension(tmp_extension(path));
    {
        let mut file = File::create(&tmp_path)
            .map_err(|e| Error::io(format!("create temp file {}", tmp_path.display()), e))?;
        file.write_all(contents)
            .map_err(|e| Error::io(format!("write temp file {}", tmp_path.display()), e))?;
        file.sync_all()
            .map_err(|e| Error::io(format!("fsync temp file {}", tmp_path.display()), e))?;
    }
    fs::rename(&tmp_path, path)
        .map_err(|e| Error::io(format!("rename {} -> {}", tmp_path.display(), path.display()), e))?;
    Ok(())
}

fn tmp_extension(path: &Path) -> String {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{ext}.tmp"),
        None => "tmp".to_string(),
    }
}

/// On corruption, move the bad file aside rather than silently discarding
/// it, keeping at most `max_bak` rotated copies (oldest deleted first).
pub fn rotate_bak(path: &Path, max_bak: usize) -> Result<(), Error> {
    if max_bak == 0 {
        return Ok(());
    }
    for i in (1..max_bak).rev() {
        let src = bak_path(path, i);
        let dst = bak_path(path, i + 1);
        if src.exists() {
            let _ = fs::rename(&src, &dst);
        }
    }
    let oldest = bak_path(path, max_bak + 1);
    let _ = fs::remove_file(&oldest);
    if path.exists() {
        fs::rename(path, bak_path(path, 1))
            .map_err(|e| Error::new(ErrorKind::Io, format!("rotate bak for {}: {e}", path.display())))?;
    }
    Ok(())
}

fn bak_path(path: &Path, index: usize) -> std::path::PathBuf {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("state");
    path.with_file_name(format!("{name}.bak{index}"))
}

#[cfg(test)]
#[path = "atomic_tests.rs"]
mod tests;
