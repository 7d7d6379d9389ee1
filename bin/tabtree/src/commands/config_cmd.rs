use serde_json::Value;
use std::path::PathBuf;
use tabtree_core::Config;

use super::paths_for;

/// Show the current configuration as pretty-printed JSON.
pub async fn show(home: Option<PathBuf>) -> anyhow::Result<()> {
    let paths = paths_for(home);
    let config = Config::load_or_default(&paths)?;

    println!();
    println!("📋 Current Configuration");
    println!("  File: {}", paths.config_file().display());
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

pub async fn get(home: Option<PathBuf>, key: &str) -> anyhow::Result<()> {
    let paths = paths_for(home);
    let config = Config::load_or_default(&paths)?;
    let json = serde_json::to_value(&config)?;

    match resolve_json_path(&json, key) {
        Some(Value::String(s)) => println!("{}", s),
        Some(v) => println!("{}", serde_json::to_string_pretty(&v)?),
        None => anyhow::bail!("key '{}' not found in config", key),
    }
    Ok(())
}

/// Set a config value by dot-separated key path.
pub async fn set(home: Option<PathBuf>, key: &str, value: &str) -> anyhow::Result<()> {
    let paths = paths_for(home);
    let config = Config::load_or_default(&paths)?;
    let mut json = serde_json::to_value(&config)?;

    // Try to parse value as JSON, fall back to string
    let parsed: Value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    set_json_path(&mut json, key, parsed.clone());

    let new_config: Config = serde_json::from_value(json)?;
    new_config.validate()?;
    new_config.save(&paths.config_file())?;

    match parsed {
        Value::String(s) => println!("✓ Set {} = {}", key, s),
        other => println!("✓ Set {} = {}", key, serde_json::to_string(&other)?),
    }
    Ok(())
}

pub fn path(home: Option<PathBuf>) {
    println!("{}", paths_for(home).config_file().display());
}

pub async fn reset(home: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let paths = paths_for(home);

    if !force {
        print!("⚠ Reset config to defaults? Current config will be lost. [y/N] ");
        use std::io::Write;
        std::io::stdout().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    Config::default().save(&paths.config_file())?;
    println!("✓ Config reset to defaults: {}", paths.config_file().display());
    Ok(())
}

/// Navigate a JSON value by dot-separated path.
fn resolve_json_path(json: &Value, path: &str) -> Option<Value> {
    let mut current = json;
    for part in path.split('.') {
        current = current.get(to_camel_case(part)).or_else(|| current.get(part))?;
    }
    Some(current.clone())
}

fn set_json_path(json: &mut Value, path: &str, value: Value) {
    let parts: Vec<&str> = path.split('.').collect();
    let mut current = json;
    for (i, part) in parts.iter().enumerate() {
        let camel = to_camel_case(part);
        let key = if current.get(part).is_some() && current.get(&camel).is_none() {
            part.to_string()
        } else {
            camel
        };

        if i == parts.len() - 1 {
            current[&key] = value;
            return;
        }

        if !current.get(&key).is_some_and(Value::is_object) {
            current[&key] = serde_json::json!({});
        }
        current = &mut current[&key];
    }
}

/// snake_case to camelCase, matching the config's serde naming.
fn to_camel_case(s: &str) -> String {
    let mut result = String::new();
    let mut capitalize_next = false;
    for ch in s.chars() {
        if ch == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            result.push(ch.to_ascii_uppercase());
            capitalize_next = false;
        } else {
            result.push(ch);
        }
    }
    result
}
