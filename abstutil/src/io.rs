use std::io::Write;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

fn to_json<T: Serialize>(obj: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(obj)?)
}

fn from_json<T: DeserializeOwned>(raw: &str) -> Result<T> {
    Ok(serde_json::from_str(raw)?)
}

pub fn read_json<T: DeserializeOwned>(path: &str) -> Result<T> {
    let raw = fs_err::read_to_string(path)?;
    from_json(&raw).with_context(|| format!("parsing {}", path))
}

pub fn write_json<T: Serialize>(path: &str, obj: &T) -> Result<()> {
    write_file(path, &to_json(obj)?)
}

/// Creates parent directories as needed.
pub fn write_file(path: &str, contents: &str) -> Result<()> {
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs_err::create_dir_all(parent)?;
        }
    }
    let mut file = fs_err::File::create(path)?;
    write!(file, "{}", contents)?;
    info!("Wrote {}", path);
    Ok(())
}
