use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WeldConfig {
    /// Root for generated container files
    pub out_dir: Option<String>,
    /// Compilation-unit metadata directories, scanned one round each
    #[serde(default)]
    pub units: Vec<String>,
    /// Marker directories published by pre-compiled dependencies
    #[serde(default)]
    pub marker_dirs: Vec<String>,
    /// Where this build publishes its own markers
    pub publish_markers: Option<String>,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("weld.toml")
}

pub fn default_out_dir() -> PathBuf {
    PathBuf::from("generated").join("weld")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<WeldConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: WeldConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &WeldConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weld.toml");
        assert!(load_config(Some(&path)).unwrap().is_none());
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weld.toml");

        let config = WeldConfig {
            out_dir: Some("generated/weld".to_string()),
            units: vec!["app/meta".to_string(), "lib/meta".to_string()],
            marker_dirs: vec!["deps/markers".to_string()],
            publish_markers: None,
        };
        write_config(&path, &config, false).unwrap();

        let loaded = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(loaded.units, config.units);
        assert_eq!(loaded.out_dir, config.out_dir);

        // A second write without force refuses to clobber
        assert!(write_config(&path, &config, false).is_err());
        write_config(&path, &config, true).unwrap();
    }
}
