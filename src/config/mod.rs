pub mod defaults;
pub mod settings;
pub mod user;

pub use settings::{FormatterConfig, FormatterSettings};
pub use user::{
    UserConfigError, UserConfigResult, load_settings_file, load_user_config, user_config_path,
};

/// Merge multiple settings layers in order.
/// Later layers in the slice have higher precedence (override earlier ones).
/// Use this for layered config: `merge_all(&[defaults, user, project, session])`
pub fn merge_all(layers: &[Option<FormatterSettings>]) -> Option<FormatterSettings> {
    layers.iter().cloned().reduce(merge_settings).flatten()
}

/// Merge two settings layers, preferring values from `primary` over `fallback`.
///
/// `extraArgs` is replaced as a whole, never concatenated: a layer that sets
/// it states the complete argument list.
pub fn merge_settings(
    fallback: Option<FormatterSettings>,
    primary: Option<FormatterSettings>,
) -> Option<FormatterSettings> {
    match (fallback, primary) {
        (None, None) => None,
        (Some(settings), None) | (None, Some(settings)) => Some(settings),
        (Some(fallback), Some(primary)) => Some(FormatterSettings {
            path: primary.path.or(fallback.path),
            extra_args: primary.extra_args.or(fallback.extra_args),
        }),
    }
}
