//! End-to-end tests driving the rustfmt-ls binary over stdio.
//!
//! A small shell script stands in for rustfmt, so these only run on unix.

#![cfg(unix)]

mod helpers;

use helpers::fixtures::{did_open, fake_rustfmt, formatting, initialize_params};
use helpers::lsp_client::LspClient;
use helpers::workspace::Workspace;
use serde_json::json;

#[test]
fn initialize_advertises_formatting_and_commands() {
    let workspace = Workspace::new();
    let tool = fake_rustfmt(workspace.tools.path(), "cat");
    let mut client = LspClient::new(workspace.config_home.path());

    let response = client.initialize(initialize_params(workspace.root.path(), &tool));

    let capabilities = &response["result"]["capabilities"];
    assert_eq!(capabilities["documentFormattingProvider"], json!(true));
    assert_eq!(capabilities["textDocumentSync"], json!(2));
    let commands = capabilities["executeCommandProvider"]["commands"]
        .as_array()
        .expect("commands list");
    assert!(commands.contains(&json!("rustfmt-ls.format")));
    assert!(commands.contains(&json!("rustfmt-ls.formatWorkspace")));
    assert_eq!(response["result"]["serverInfo"]["name"], json!("rustfmt-ls"));
}

#[test]
fn formatting_returns_single_full_document_edit() {
    let workspace = Workspace::new();
    let mut client = workspace.start("cat >/dev/null\nprintf 'fn main() {}\\n'");
    let uri = workspace.source("src/main.rs", "fn main(){}\n");

    client.send_notification("textDocument/didOpen", did_open(&uri, 1, "fn main(){}\n"));
    let response = client.send_request("textDocument/formatting", formatting(&uri));

    assert_eq!(
        response["result"],
        json!([{
            "range": {
                "start": { "line": 0, "character": 0 },
                "end": { "line": 1, "character": 0 }
            },
            "newText": "fn main() {}\n"
        }])
    );
}

#[test]
fn already_formatted_document_yields_no_edits() {
    let workspace = Workspace::new();
    let mut client = workspace.start("cat");
    let uri = workspace.source("src/lib.rs", "pub fn a() {}\n");

    client.send_notification("textDocument/didOpen", did_open(&uri, 1, "pub fn a() {}\n"));
    let response = client.send_request("textDocument/formatting", formatting(&uri));

    assert!(response["result"].is_null(), "expected no edits: {}", response);
}

#[test]
fn incremental_changes_are_formatted_from_synced_text() {
    let workspace = Workspace::new();
    // Echo the input back with a marker line appended.
    let mut client = workspace.start("cat\necho '// formatted'");
    let uri = workspace.source("src/lib.rs", "fn a() {}\n");

    client.send_notification("textDocument/didOpen", did_open(&uri, 1, "fn a() {}\n"));
    client.send_notification(
        "textDocument/didChange",
        json!({
            "textDocument": { "uri": uri, "version": 2 },
            "contentChanges": [{
                "range": {
                    "start": { "line": 0, "character": 3 },
                    "end": { "line": 0, "character": 4 }
                },
                "text": "日本"
            }]
        }),
    );
    let response = client.send_request("textDocument/formatting", formatting(&uri));

    let edit = &response["result"][0];
    assert_eq!(edit["newText"], json!("fn 日本() {}\n// formatted\n"));
    assert_eq!(edit["range"]["end"], json!({ "line": 1, "character": 0 }));
}

#[test]
fn rustfmt_failure_is_shown_as_error() {
    let workspace = Workspace::new();
    let mut client = workspace.start("cat >/dev/null\necho 'error: expected item' >&2\nexit 1");
    let uri = workspace.source("src/lib.rs", "fn (\n");

    client.send_notification("textDocument/didOpen", did_open(&uri, 1, "fn (\n"));
    let response = client.send_request("textDocument/formatting", formatting(&uri));

    assert!(response["result"].is_null());
    let message = client.wait_for_notification("window/showMessage", |params| {
        params["message"]
            .as_str()
            .is_some_and(|m| m.contains("expected item"))
    });
    assert_eq!(message["type"], json!(1));
}

#[test]
fn configuration_change_switches_rustfmt() {
    let workspace = Workspace::new();
    let mut client = LspClient::new(workspace.config_home.path());
    let missing = workspace.tools.path().join("missing-rustfmt");
    client.initialize(initialize_params(workspace.root.path(), &missing));
    let uri = workspace.source("src/lib.rs", "fn a(){}\n");
    client.send_notification("textDocument/didOpen", did_open(&uri, 1, "fn a(){}\n"));

    let response = client.send_request("textDocument/formatting", formatting(&uri));
    assert!(response["result"].is_null());

    let tool = fake_rustfmt(workspace.tools.path(), "cat >/dev/null\nprintf 'fn a() {}\\n'");
    client.send_notification(
        "workspace/didChangeConfiguration",
        json!({ "settings": { "rustfmt": { "path": tool.to_string_lossy() } } }),
    );
    let response = client.send_request("textDocument/formatting", formatting(&uri));

    assert_eq!(response["result"][0]["newText"], json!("fn a() {}\n"));
}

#[test]
fn format_command_applies_versioned_edit() {
    let workspace = Workspace::new();
    let mut client = workspace.start("cat >/dev/null\nprintf 'fn a() {}\\n'");
    let uri = workspace.source("src/lib.rs", "fn a(){}\n");
    client.send_notification("textDocument/didOpen", did_open(&uri, 7, "fn a(){}\n"));

    let response = client.send_request(
        "workspace/executeCommand",
        json!({ "command": "rustfmt-ls.format", "arguments": [uri] }),
    );

    assert_eq!(response["result"], json!(true));
    let edits = client.server_requests("workspace/applyEdit");
    assert_eq!(edits.len(), 1);
    let document_edit = &edits[0]["edit"]["documentChanges"][0];
    assert_eq!(document_edit["textDocument"]["uri"], json!(uri));
    assert_eq!(document_edit["textDocument"]["version"], json!(7));
    assert_eq!(document_edit["edits"][0]["newText"], json!("fn a() {}\n"));
}

#[test]
fn format_command_without_uri_is_invalid_params() {
    let workspace = Workspace::new();
    let mut client = workspace.start("cat");

    let response = client.send_request(
        "workspace/executeCommand",
        json!({ "command": "rustfmt-ls.format", "arguments": [] }),
    );

    assert_eq!(response["error"]["code"], json!(-32602));
}

#[test]
fn format_workspace_reports_progress_and_tally() {
    let workspace = Workspace::new();
    let mut client = workspace.start("cat >/dev/null\nprintf 'formatted\\n'");
    workspace.source("src/lib.rs", "fn a(){}\n");
    workspace.source("src/bin/tool.rs", "fn main(){}\n");
    workspace.source("target/debug/build.rs", "fn ignored(){}\n");

    let response = client.send_request(
        "workspace/executeCommand",
        json!({ "command": "rustfmt-ls.formatWorkspace", "arguments": [] }),
    );

    let tally = &response["result"];
    assert_eq!(tally["formatted"], json!(2));
    assert_eq!(tally["failed"], json!(0));
    assert_eq!(tally["total"], json!(2));
    assert_eq!(tally["canceled"], json!(false));

    assert_eq!(client.server_requests("workspace/applyEdit").len(), 2);
    assert_eq!(client.server_requests("window/workDoneProgress/create").len(), 1);
    let end = client.wait_for_notification("$/progress", |params| {
        params["value"]["kind"] == json!("end")
    });
    assert_eq!(
        end["value"]["message"],
        json!("Workspace formatted. Formatted: 2, skipped: 0, failed: 0.")
    );
    client.wait_for_notification("window/showMessage", |params| {
        params["message"] == json!("Workspace formatted. Formatted: 2, skipped: 0, failed: 0.")
    });
}

#[test]
fn declined_workspace_edits_count_as_failed() {
    let workspace = Workspace::new();
    let mut client = workspace.start("cat >/dev/null\nprintf 'formatted\\n'");
    client.decline_edits();
    workspace.source("src/lib.rs", "fn a(){}\n");

    let response = client.send_request(
        "workspace/executeCommand",
        json!({ "command": "rustfmt-ls.formatWorkspace", "arguments": [] }),
    );

    assert_eq!(response["result"]["formatted"], json!(0));
    assert_eq!(response["result"]["failed"], json!(1));
}

#[test]
fn format_workspace_without_rust_files_shows_message() {
    let workspace = Workspace::new();
    let mut client = workspace.start("cat");

    let response = client.send_request(
        "workspace/executeCommand",
        json!({ "command": "rustfmt-ls.formatWorkspace", "arguments": [] }),
    );

    assert!(response["result"].is_null());
    client.wait_for_notification("window/showMessage", |params| {
        params["message"] == json!("No Rust files found in workspace")
    });
}

#[test]
fn shutdown_exits_cleanly() {
    let workspace = Workspace::new();
    let mut client = workspace.start("cat");

    let status = client.shutdown().expect("server should exit after shutdown");

    assert!(status.success());
}
