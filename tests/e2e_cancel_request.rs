//! End-to-end tests for cancellation over LSP.
//!
//! - `$/cancelRequest` on `textDocument/formatting` kills the running rustfmt
//! - `window/workDoneProgress/cancel` stops `rustfmt-ls.formatWorkspace`
//!   before the next file

#![cfg(unix)]

mod helpers;

use helpers::fixtures::{did_open, formatting};
use helpers::workspace::Workspace;
use serde_json::json;
use std::path::Path;
use std::time::{Duration, Instant};

/// Pid written by the fake rustfmt, once it has started.
fn wait_for_pid(path: &Path) -> u32 {
    let start = Instant::now();
    loop {
        if let Some(pid) = std::fs::read_to_string(path)
            .ok()
            .and_then(|s| s.trim().parse().ok())
        {
            return pid;
        }
        assert!(
            start.elapsed() < Duration::from_secs(10),
            "fake rustfmt never started"
        );
        std::thread::sleep(Duration::from_millis(20));
    }
}

/// Gone or a zombie waiting to be reaped.
#[cfg(target_os = "linux")]
fn process_is_dead(pid: u32) -> bool {
    match std::fs::read_to_string(format!("/proc/{pid}/status")) {
        Ok(status) => status
            .lines()
            .any(|line| line.starts_with("State:") && line.contains('Z')),
        Err(_) => true,
    }
}

#[test]
fn cancel_request_kills_running_rustfmt() {
    let workspace = Workspace::new();
    let pid_file = workspace.tools.path().join("rustfmt.pid");
    let script = format!(
        "input=$(cat)\ncase \"$input\" in *slow*) echo $$ > '{}'; exec sleep 30 ;; esac\nprintf 'fn tidy() {{}}\\n'",
        pid_file.display()
    );
    let mut client = workspace.start(&script);
    let uri = workspace.source("src/lib.rs", "fn slow(){}\n");
    client.send_notification("textDocument/didOpen", did_open(&uri, 1, "fn slow(){}\n"));

    let started = Instant::now();
    let id = client.send_request_async("textDocument/formatting", formatting(&uri));
    let pid = wait_for_pid(&pid_file);
    client.send_notification("$/cancelRequest", json!({ "id": id }));
    let response = client.receive_response_for_id(id);

    assert_eq!(response["error"]["code"], json!(-32800), "{}", response);
    assert!(started.elapsed() < Duration::from_secs(10));

    #[cfg(target_os = "linux")]
    {
        let start = Instant::now();
        while !process_is_dead(pid) {
            assert!(
                start.elapsed() < Duration::from_secs(5),
                "rustfmt {pid} survived the canceled request"
            );
            std::thread::sleep(Duration::from_millis(20));
        }
    }
    #[cfg(not(target_os = "linux"))]
    let _ = pid;

    // The document is not left registered as busy.
    client.send_notification(
        "textDocument/didChange",
        json!({
            "textDocument": { "uri": uri, "version": 2 },
            "contentChanges": [{ "text": "fn tidy(){}\n" }]
        }),
    );
    let response = client.send_request("textDocument/formatting", formatting(&uri));
    assert_eq!(response["result"][0]["newText"], json!("fn tidy() {}\n"));
}

#[test]
fn progress_cancel_stops_workspace_format_after_current_file() {
    let workspace = Workspace::new();
    let mut client = workspace.start("cat >/dev/null\nsleep 0.5\nprintf 'formatted\\n'");
    for name in ["a", "b", "c", "d", "e"] {
        workspace.source(&format!("src/{name}.rs"), "fn x(){}\n");
    }

    let id = client.send_request_async(
        "workspace/executeCommand",
        json!({ "command": "rustfmt-ls.formatWorkspace", "arguments": [] }),
    );
    let report = client.wait_for_notification("$/progress", |params| {
        params["value"]["kind"] == json!("report")
    });
    client.send_notification(
        "window/workDoneProgress/cancel",
        json!({ "token": report["token"] }),
    );
    let response = client.receive_response_for_id(id);

    let tally = &response["result"];
    assert_eq!(tally["canceled"], json!(true), "{}", response);
    assert_eq!(tally["total"], json!(5));
    let processed = tally["processed"].as_u64().expect("processed count");
    assert!(processed < 5, "processed {processed}");
    // The file in progress when the cancel arrived still completes.
    assert_eq!(tally["formatted"], json!(processed));
    assert_eq!(tally["skipped"], json!(0));
    assert_eq!(
        client.server_requests("workspace/applyEdit").len() as u64,
        processed
    );

    client.wait_for_notification("window/showMessage", |params| {
        params["message"]
            .as_str()
            .is_some_and(|m| m.starts_with("Workspace formatting canceled."))
    });
}
