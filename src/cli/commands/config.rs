//! Config command handler
//!
//! Storage credentials are masked unless `config get --reveal` is used.
//! Changing a `server` key only affects the next `wizscholar serve`.

use crate::args::ConfigSubcommand;
use wiz_scholar::config::Config;
use wiz_scholar::info;

/// Dispatch config subcommands
pub fn run(subcommand: Option<ConfigSubcommand>, config: &mut Config, defaults: &Config) {
    match subcommand {
        None => show_all(config),
        Some(ConfigSubcommand::Get { key: None, .. }) => show_all(config),
        Some(ConfigSubcommand::Get {
            key: Some(key),
            reveal,
        }) => show_key(config, &key, reveal),
        Some(ConfigSubcommand::Set { key, value }) => {
            let before = config.get_masked(&key);
            config.set(&key, &value).unwrap_or_else(|e| super::fail(e));
            persist(config, &key, before);
        }
        Some(ConfigSubcommand::Unset { key }) => {
            let before = config.get_masked(&key);
            config
                .unset(&key, defaults)
                .unwrap_or_else(|e| super::fail(e));
            persist(config, &key, before);
        }
        Some(ConfigSubcommand::Reset) => reset(),
    }
}

fn show_all(config: &Config) {
    println!("# {}", Config::get_config_file_path().display());
    print!("{config}");
}

fn show_key(config: &Config, key: &str, reveal: bool) {
    let value = if reveal {
        config.get(key)
    } else {
        config.get_masked(key)
    };
    match value {
        Some(value) => println!("{value}"),
        None => super::fail(format!("Unknown config key: '{key}'")),
    }
}

fn persist(config: &Config, key: &str, before: Option<String>) {
    if let Err(e) = config.save() {
        super::fail(format!(
            "Failed to save {}: {e}",
            Config::get_config_file_path().display()
        ));
    }
    let after = config.get_masked(key).unwrap_or_default();
    info!("Config {key} changed");
    println!("✓ {}", describe_change(key, before.as_deref(), &after));
    if let Some(hint) = restart_hint(key) {
        println!("  {hint}");
    }
}

/// One-line summary of a config change, e.g. `server.port: 5000 -> 7000`
fn describe_change(key: &str, before: Option<&str>, after: &str) -> String {
    let name = Config::section_of(key).map_or_else(
        || key.to_string(),
        |section| format!("{section}.{}", key.rsplit('.').next().unwrap_or(key)),
    );
    match before {
        Some(before) if before == after => format!("{name} unchanged ({})", show(after)),
        Some(before) => format!("{name}: {} -> {}", show(before), show(after)),
        None => format!("{name} = {}", show(after)),
    }
}

fn show(value: &str) -> &str {
    if value.is_empty() {
        "(empty)"
    } else {
        value
    }
}

fn restart_hint(key: &str) -> Option<&'static str> {
    match Config::section_of(key)? {
        "server" | "storage" | "ai" => {
            Some("A running `wizscholar serve` picks this up after a restart")
        }
        _ => None,
    }
}

fn reset() {
    let path = Config::get_config_file_path();
    if !path.exists() {
        println!("✓ Config is already at defaults");
        return;
    }
    if !super::confirm(&format!("Delete {} and return to defaults?", path.display())) {
        println!("✗ Reset cancelled");
        return;
    }
    if let Err(e) = Config::reset() {
        super::fail(format!("Failed to remove {}: {e}", path.display()));
    }
    println!("✓ Removed {}", path.display());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_change() {
        assert_eq!(
            describe_change("port", Some("5000"), "7000"),
            "server.port: 5000 -> 7000"
        );
        assert_eq!(
            describe_change("ai.retry", Some("true"), "true"),
            "ai.retry unchanged (true)"
        );
        assert_eq!(
            describe_change("max-upload-mb", Some(""), "20"),
            "server.max-upload-mb: (empty) -> 20"
        );
    }

    #[test]
    fn test_restart_hint_only_for_server_side_keys() {
        assert!(restart_hint("server.port").is_some());
        assert!(restart_hint("api_secret").is_some());
        assert!(restart_hint("endpoint").is_some());
        assert!(restart_hint("max_credits").is_none());
        assert!(restart_hint("level").is_none());
        assert!(restart_hint("bogus").is_none());
    }
}
