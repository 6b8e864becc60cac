//! Config command implementations
//!
//! Keys are dotted paths into `config.toml`, e.g. `panel.ipc_port`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use a1_core::config::{self, ConfigFile};

use crate::output::{print_error, print_info, print_success, print_warning};

fn resolve(config_path: Option<&Path>) -> PathBuf {
    config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config::default_config_path)
}

fn default_table() -> Result<toml::Table> {
    Ok(toml::from_str(&toml::to_string(&ConfigFile::default())?)?)
}

fn read_table(path: &Path) -> Result<toml::Table> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
}

/// Print the config file location
pub fn config_path(config_path: Option<&Path>) -> Result<()> {
    println!("{}", resolve(config_path).display());
    Ok(())
}

/// Show the current configuration, or the defaults if there is no file
pub fn config_show(config_path: Option<&Path>) -> Result<()> {
    let path = resolve(config_path);

    if !path.exists() {
        print_warning(&format!("No configuration file found at {:?}", path));
        print_info("Showing defaults; run 'a1-shell config init' to create one");
        println!();
        println!("{}", toml::to_string_pretty(&ConfigFile::default())?);
        return Ok(());
    }

    print_info(&format!("Configuration file: {:?}", path));
    println!();
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    println!("{}", content);

    Ok(())
}

/// Write a default configuration file
pub fn config_init(config_path: Option<&Path>, force: bool) -> Result<()> {
    let path = resolve(config_path);

    if path.exists() && !force {
        print_error(&format!("Config file already exists: {:?}", path));
        print_info("Use --force to overwrite");
        return Ok(());
    }

    config::save_config(&path, &ConfigFile::default())?;
    print_success(&format!("Created configuration file: {:?}", path));

    Ok(())
}

/// Keys that may be absent from a valid configuration
const OPTIONAL_KEYS: &[&str] = &["panel.request_timeout"];

/// Render the value at a dotted key
fn lookup(table: toml::Table, key: &str) -> Result<String> {
    let mut current = &toml::Value::Table(table);
    for part in key.split('.') {
        let next = match current {
            toml::Value::Table(t) => t.get(part),
            _ => None,
        };
        current = match next {
            Some(v) => v,
            None if OPTIONAL_KEYS.contains(&key) => return Ok("(unset)".to_string()),
            None => anyhow::bail!("Key not found: {}", key),
        };
    }

    Ok(match current {
        toml::Value::String(s) => s.clone(),
        toml::Value::Table(_) => toml::to_string_pretty(current)?,
        other => other.to_string(),
    })
}

/// Print a config value by dotted key
pub fn config_get(config_path: Option<&Path>, key: &str) -> Result<()> {
    let path = resolve(config_path);
    let table = if path.exists() {
        read_table(&path)?
    } else {
        default_table()?
    };

    println!("{}", lookup(table, key)?);
    Ok(())
}

/// Set a config value by dotted key
///
/// The edited file must still load as a valid configuration, otherwise
/// nothing is written.
pub fn config_set(config_path: Option<&Path>, key: &str, value: &str) -> Result<()> {
    let path = resolve(config_path);
    let mut table = if path.exists() {
        read_table(&path)?
    } else {
        default_table()?
    };

    let parts: Vec<&str> = key.split('.').collect();
    let (last, parents) = match parts.split_last() {
        Some((last, parents)) if !last.is_empty() => (*last, parents),
        _ => anyhow::bail!("Invalid key: {:?}", key),
    };

    let mut current = &mut table;
    for part in parents {
        current = current
            .entry(part.to_string())
            .or_insert(toml::Value::Table(toml::Table::new()))
            .as_table_mut()
            .ok_or_else(|| anyhow::anyhow!("Cannot navigate to key: {}", key))?;
    }
    current.insert(last.to_string(), parse_value(value));

    let _validated: ConfigFile = toml::Value::Table(table.clone())
        .try_into()
        .with_context(|| format!("Invalid value for {}: {}", key, value))?;

    let content = toml::to_string_pretty(&table)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
    }
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    print_success(&format!("Set {} = {}", key, value));
    Ok(())
}

fn parse_value(value: &str) -> toml::Value {
    if let Ok(b) = value.parse::<bool>() {
        toml::Value::Boolean(b)
    } else if let Ok(i) = value.parse::<i64>() {
        toml::Value::Integer(i)
    } else if let Ok(f) = value.parse::<f64>() {
        toml::Value::Float(f)
    } else {
        toml::Value::String(value.to_string())
    }
}
