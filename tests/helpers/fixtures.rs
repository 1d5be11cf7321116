//! Filesystem fixtures for integration tests.

#![allow(dead_code)]

use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use url::Url;

/// Write an executable `sh` script standing in for rustfmt.
#[cfg(unix)]
pub fn fake_rustfmt(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-rustfmt");
    let staged = dir.join(".fake-rustfmt.tmp");
    std::fs::write(&staged, format!("#!/bin/sh\n{body}\n")).expect("failed to write fake rustfmt");
    std::fs::set_permissions(&staged, std::fs::Permissions::from_mode(0o755))
        .expect("failed to mark fake rustfmt executable");
    // Never exec a path that is still open for writing.
    std::fs::rename(&staged, &path).expect("failed to install fake rustfmt");
    path
}

/// Write `contents` to `root/relative`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, contents: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("failed to create parent dir");
    }
    std::fs::write(&path, contents).expect("failed to write fixture");
    path
}

pub fn file_uri(path: &Path) -> String {
    Url::from_file_path(path)
        .expect("absolute path")
        .to_string()
}

/// `initialize` params for a workspace at `root` using `tool` as rustfmt.
pub fn initialize_params(root: &Path, tool: &Path) -> Value {
    json!({
        "processId": std::process::id(),
        "rootUri": file_uri(root),
        "workspaceFolders": [{ "uri": file_uri(root), "name": "workspace" }],
        "initializationOptions": { "path": tool.to_string_lossy() },
        "capabilities": {
            "workspace": { "workspaceEdit": { "documentChanges": true } },
            "window": { "workDoneProgress": true }
        }
    })
}

pub fn did_open(uri: &str, version: i32, text: &str) -> Value {
    json!({
        "textDocument": {
            "uri": uri,
            "languageId": "rust",
            "version": version,
            "text": text
        }
    })
}

pub fn formatting(uri: &str) -> Value {
    json!({
        "textDocument": { "uri": uri },
        "options": { "tabSize": 4, "insertSpaces": true }
    })
}
