//! Filesystem helpers

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, ErrorKind, Result};

/// Replace the contents of `target` through a sibling temp file and a rename.
///
/// Readers see either the old or the new contents, never a partial write.
/// A symlinked target is resolved first, so the link stays and the file it
/// points to is replaced. An existing file's permissions carry over to the
/// new one; ownership and other metadata do not.
pub fn write_atomic(target: &Path, data: &[u8]) -> Result<()> {
    let target = resolve_symlink(target)?;
    let file_name = target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            Error::detached(
                ErrorKind::Io,
                format!("{} does not name a file", target.display()),
            )
        })?;
    let temp = target.with_file_name(format!(".{file_name}.{}.tmp", std::process::id()));
    let permissions = fs::metadata(&target).ok().map(|meta| meta.permissions());

    fs::write(&temp, data)?;
    let replaced = match permissions {
        Some(permissions) => fs::set_permissions(&temp, permissions),
        None => Ok(()),
    }
    .and_then(|()| fs::rename(&temp, &target));
    if let Err(err) = replaced {
        let _ = fs::remove_file(&temp);
        return Err(err.into());
    }
    Ok(())
}

fn resolve_symlink(target: &Path) -> Result<PathBuf> {
    match fs::symlink_metadata(target) {
        Ok(meta) if meta.file_type().is_symlink() => Ok(fs::canonicalize(target)?),
        _ => Ok(target.to_path_buf()),
    }
}
