//! Shared fixtures for unit tests.

use std::path::{Path, PathBuf};

/// Write an executable `sh` script standing in for rustfmt and return its path.
#[cfg(unix)]
pub(crate) fn fake_tool(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-rustfmt");
    let staged = dir.join(".fake-rustfmt.tmp");
    std::fs::write(&staged, format!("#!/bin/sh\n{body}\n")).expect("failed to write fake tool");
    std::fs::set_permissions(&staged, std::fs::Permissions::from_mode(0o755))
        .expect("failed to mark fake tool executable");
    // Never exec a path that is still open for writing.
    std::fs::rename(&staged, &path).expect("failed to install fake tool");
    path
}

/// Write `contents` to `path`, creating parent directories.
pub(crate) fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("failed to create parent dir");
    }
    std::fs::write(path, contents).expect("failed to write fixture");
}
