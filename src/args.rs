//! rustfmt command-line composition.

use crate::context::ResolvedContext;

/// Flag selecting rustfmt's stdout emission mode.
const EMIT_STDOUT: [&str; 2] = ["--emit", "stdout"];
const CONFIG_PATH_FLAG: &str = "--config-path";
const EDITION_FLAG: &str = "--edition";

/// Build the argument vector for one rustfmt invocation.
///
/// Context-derived `--config-path` and `--edition` are only injected when the
/// user's extra arguments do not already name the same option (either as a
/// separate flag or in `--flag=value` form). The user's arguments always come
/// last, unchanged.
pub fn build_args(extra_args: &[String], context: &ResolvedContext) -> Vec<String> {
    let mut args: Vec<String> = EMIT_STDOUT.iter().map(|s| s.to_string()).collect();

    if let Some(config_path) = &context.config_file_path
        && !has_arg(extra_args, CONFIG_PATH_FLAG)
    {
        args.push(CONFIG_PATH_FLAG.to_string());
        args.push(config_path.to_string_lossy().into_owned());
    }

    if let Some(edition) = &context.edition
        && !has_arg(extra_args, EDITION_FLAG)
    {
        args.push(EDITION_FLAG.to_string());
        args.push(edition.clone());
    }

    args.extend(extra_args.iter().cloned());
    args
}

/// Whether `args` already specifies `name`, as `name` or `name=value`.
fn has_arg(args: &[String], name: &str) -> bool {
    args.iter().any(|arg| {
        arg == name
            || arg
                .strip_prefix(name)
                .is_some_and(|rest| rest.starts_with('='))
    })
}
