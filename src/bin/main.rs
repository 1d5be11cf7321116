use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::{stdin, stdout};
use tokio_util::sync::CancellationToken;
use tower_lsp_server::{LspService, Server};

use rustfmt_ls::format::{BatchRunner, DiskHost, Formatter, discover_rust_files};
use rustfmt_ls::lsp::{SettingsEventKind, load_settings};
use rustfmt_ls::{RustfmtLs, resolve};

/// A Language Server Protocol (LSP) server that formats Rust with rustfmt
#[derive(Parser)]
#[command(name = "rustfmt-ls")]
#[command(version)]
#[command(about = "A Language Server Protocol (LSP) server that formats Rust with rustfmt")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Format Rust files on disk
    Format {
        /// Report files that need formatting without writing them
        #[arg(long)]
        check: bool,

        /// rustfmt binary to run (default: from user config, else `rustfmt`)
        #[arg(long, value_name = "PATH")]
        rustfmt: Option<String>,

        /// Files or directories to format (default: current directory)
        paths: Vec<PathBuf>,

        /// Extra arguments passed to rustfmt
        #[arg(last = true)]
        extra: Vec<String>,
    },
    /// Print the formatting context resolved for a file as JSON
    Context {
        file: PathBuf,

        /// Directory the upward search must not leave
        #[arg(long, value_name = "DIR")]
        boundary: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Format {
            check,
            rustfmt,
            paths,
            extra,
        }) => format_paths(check, rustfmt, paths, extra).await,
        Some(Commands::Context { file, boundary }) => {
            let file = absolute(file);
            let boundary = boundary.map(absolute);
            let context = resolve(&file, boundary.as_deref()).await;
            match serde_json::to_string_pretty(&context) {
                Ok(json) => {
                    println!("{}", json);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
        None => {
            // Start LSP server (default behavior)
            let stdin = stdin();
            let stdout = stdout();

            let (service, socket) = LspService::build(RustfmtLs::new)
                .custom_method(
                    "window/workDoneProgress/cancel",
                    RustfmtLs::work_done_progress_cancel,
                )
                .finish();
            Server::new(stdin, stdout, socket).serve(service).await;
            ExitCode::SUCCESS
        }
    }
}

async fn format_paths(
    check: bool,
    rustfmt: Option<String>,
    paths: Vec<PathBuf>,
    extra: Vec<String>,
) -> ExitCode {
    let roots: Vec<PathBuf> = if paths.is_empty() {
        vec![absolute(PathBuf::from("."))]
    } else {
        paths.into_iter().map(absolute).collect()
    };

    // Project config comes from the first directory given, else the cwd.
    let project_root = roots
        .iter()
        .find(|p| p.is_dir())
        .cloned()
        .or_else(|| std::env::current_dir().ok());
    let outcome = load_settings(project_root.as_deref(), None);
    for event in &outcome.events {
        match event.kind {
            SettingsEventKind::Warning => eprintln!("Warning: {}", event.message),
            SettingsEventKind::Info => log::info!("{}", event.message),
        }
    }
    let mut config = outcome.config;
    if let Some(rustfmt) = rustfmt {
        config.tool_path = rustfmt;
    }
    if !extra.is_empty() {
        config.extra_args = extra;
    }

    let files = discover_rust_files(roots.as_slice());
    if files.is_empty() {
        eprintln!("No Rust files found");
        return ExitCode::SUCCESS;
    }

    let formatter = Formatter::new(config);
    formatter.set_workspace_folders(roots.into_iter().filter(|p| p.is_dir()).collect());
    let host = if check {
        DiskHost::check_only()
    } else {
        DiskHost::new()
    };

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let tally = BatchRunner::new(&formatter)
        .run(&files, &host, &cancel)
        .await;

    let needs_formatting = host.needs_formatting();
    if let Err(e) = print_paths(&needs_formatting) {
        // Reader closed early, e.g. `| head`.
        if e.kind() != std::io::ErrorKind::BrokenPipe {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    }
    eprintln!("{}", tally.summary());

    if tally.failed > 0 || tally.canceled || !needs_formatting.is_empty() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn print_paths(paths: &[PathBuf]) -> std::io::Result<()> {
    let mut out = std::io::stdout().lock();
    for path in paths {
        writeln!(out, "{}", path.display())?;
    }
    out.flush()
}

fn absolute(path: PathBuf) -> PathBuf {
    std::path::absolute(&path).unwrap_or(path)
}
