mod settings;

pub use settings::{ApiSettings, Config, ExportSettings};

use crate::error::{DashboardError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.dashboard/)
pub fn config_dir() -> Result<PathBuf> {
    // First try XDG-style directories
    if let Some(proj_dirs) = ProjectDirs::from("", "", "dashboard") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    // Fallback to ~/.dashboard/
    let home = dirs_home().ok_or_else(|| {
        DashboardError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".dashboard"))
}

/// Directory for session-scoped state. Prefers the per-login runtime dir so
/// nothing outlives the user's session.
pub fn session_dir() -> PathBuf {
    ProjectDirs::from("", "", "dashboard")
        .and_then(|dirs| dirs.runtime_dir().map(Path::to_path_buf))
        .unwrap_or_else(|| std::env::temp_dir().join("dashboard-session"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_home() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Resolve the export output directory; relative paths hang off the config dir.
pub fn resolve_output_dir(output_dir: &str, config_dir: &Path) -> PathBuf {
    let expanded = expand_path(output_dir);
    if expanded.is_absolute() {
        expanded
    } else {
        config_dir.join(expanded)
    }
}

/// Load the main config.toml
pub fn load_config(config_dir: &Path) -> Result<Config> {
    if !config_dir.exists() {
        return Err(DashboardError::ConfigNotFound(config_dir.to_path_buf()));
    }
    let path = config_dir.join("config.toml");
    if !path.exists() {
        return Err(DashboardError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| DashboardError::ConfigParse { path, source: e })
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[api]
base_url = "http://localhost:5000"   # reporting API origin, no trailing slash
timeout_secs = 30                    # per-request deadline, 0 = wait forever
months_back = 12                     # rolling window for month-keyed reports

[export]
output_dir = "exports"               # relative paths resolve under this directory
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_parses_with_defaults() {
        let config: Config = toml::from_str(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:5000");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.api.months_back, 12);
        assert_eq!(config.export.output_dir, "exports");
    }

    #[test]
    fn export_section_is_optional() {
        let config: Config = toml::from_str("[api]\nbase_url = \"http://x\"\n").unwrap();
        assert_eq!(config.export.output_dir, ".");
        assert_eq!(config.api.months_back, 12);
    }

    #[test]
    fn relative_output_dir_hangs_off_config_dir() {
        let dir = resolve_output_dir("exports", Path::new("/etc/dashboard"));
        assert_eq!(dir, PathBuf::from("/etc/dashboard/exports"));
        let abs = resolve_output_dir("/tmp/out", Path::new("/etc/dashboard"));
        assert_eq!(abs, PathBuf::from("/tmp/out"));
    }
}
