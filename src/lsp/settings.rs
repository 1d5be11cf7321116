use crate::config::defaults::{CONFIG_FILE_NAME, default_settings};
use crate::config::{
    FormatterConfig, FormatterSettings, load_settings_file, load_user_config, merge_all,
};
use serde_json::Value;
use std::path::Path;

/// Key under which clients commonly nest this server's settings.
pub const SETTINGS_SECTION: &str = "rustfmt";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingsEventKind {
    Info,
    Warning,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettingsEvent {
    pub kind: SettingsEventKind,
    pub message: String,
}

impl SettingsEvent {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: SettingsEventKind::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: SettingsEventKind::Warning,
            message: message.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingsSource {
    InitializationOptions,
    ClientConfiguration,
}

impl SettingsSource {
    fn description(self) -> &'static str {
        match self {
            SettingsSource::InitializationOptions => "initialization options",
            SettingsSource::ClientConfiguration => "client configuration",
        }
    }
}

#[derive(Debug)]
pub struct SettingsLoadOutcome {
    pub config: FormatterConfig,
    pub events: Vec<SettingsEvent>,
}

pub fn load_settings(
    root_path: Option<&Path>,
    override_settings: Option<(SettingsSource, Value)>,
) -> SettingsLoadOutcome {
    let mut events = Vec::new();

    // Layer 1: built-in defaults (lowest precedence)
    let defaults = Some(default_settings());

    // Layer 2: user config from XDG_CONFIG_HOME (~/.config/rustfmt-ls/rustfmt-ls.toml)
    let user_config = load_user_config_with_events(&mut events);

    // Layer 3: project config from root_path/rustfmt-ls.toml
    let project_settings = load_project_settings(root_path, &mut events);

    // Layer 4: initialization options or client configuration
    let override_settings = override_settings
        .and_then(|(source, value)| parse_override_settings(source, value, &mut events));

    let merged = merge_all(&[defaults, user_config, project_settings, override_settings]);
    let config = merged.map(FormatterConfig::from).unwrap_or_default();

    SettingsLoadOutcome { config, events }
}

fn load_user_config_with_events(events: &mut Vec<SettingsEvent>) -> Option<FormatterSettings> {
    match load_user_config() {
        Ok(Some(settings)) => {
            events.push(SettingsEvent::info("Loaded user config"));
            Some(settings)
        }
        Ok(None) => None,
        Err(err) => {
            events.push(SettingsEvent::warning(format!(
                "Failed to load user config: {}",
                err
            )));
            None
        }
    }
}

fn load_project_settings(
    root_path: Option<&Path>,
    events: &mut Vec<SettingsEvent>,
) -> Option<FormatterSettings> {
    let config_path = root_path?.join(CONFIG_FILE_NAME);
    match load_settings_file(&config_path) {
        Ok(Some(settings)) => {
            events.push(SettingsEvent::info(format!(
                "Loaded project config from {}",
                config_path.display()
            )));
            Some(settings)
        }
        Ok(None) => None,
        Err(err) => {
            events.push(SettingsEvent::warning(format!(
                "Failed to load project config: {}",
                err
            )));
            None
        }
    }
}

fn parse_override_settings(
    source: SettingsSource,
    value: Value,
    events: &mut Vec<SettingsEvent>,
) -> Option<FormatterSettings> {
    if value.is_null() {
        return None;
    }
    let value = unwrap_section(value);
    match serde_json::from_value::<FormatterSettings>(value) {
        Ok(settings) => {
            events.push(SettingsEvent::info(format!(
                "Applied settings from {}",
                source.description()
            )));
            Some(settings)
        }
        Err(err) => {
            events.push(SettingsEvent::warning(format!(
                "Failed to parse {}: {}",
                source.description(),
                err
            )));
            None
        }
    }
}

/// Accept both `{ "path": .. }` and `{ "rustfmt": { "path": .. } }`.
fn unwrap_section(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.get(SETTINGS_SECTION).is_some_and(Value::is_object) => {
            map.remove(SETTINGS_SECTION).unwrap_or_default()
        }
        other => other,
    }
}
