//! Temporary workspace driven through a running server.

#![allow(dead_code)]

use super::fixtures::{fake_rustfmt, file_uri, initialize_params, write_file};
use super::lsp_client::LspClient;
use tempfile::TempDir;

pub struct Workspace {
    pub root: TempDir,
    pub config_home: TempDir,
    pub tools: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            root: TempDir::new().expect("failed to create workspace dir"),
            config_home: TempDir::new().expect("failed to create config dir"),
            tools: TempDir::new().expect("failed to create tools dir"),
        }
    }

    /// Start a server whose rustfmt runs `script`.
    #[cfg(unix)]
    pub fn start(&self, script: &str) -> LspClient {
        let tool = fake_rustfmt(self.tools.path(), script);
        let mut client = LspClient::new(self.config_home.path());
        let response = client.initialize(initialize_params(self.root.path(), &tool));
        assert!(response.get("result").is_some(), "initialize failed: {}", response);
        client
    }

    /// Write a source file and return its URI.
    pub fn source(&self, relative: &str, text: &str) -> String {
        file_uri(&write_file(self.root.path(), relative, text))
    }
}
