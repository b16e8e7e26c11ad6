//! hwinfo configuration.
//!
//! Configuration lives in /etc/hwinfo/config.toml. Every section and field
//! has a default, so a missing file or a partial file is fine.
//!
//! ```toml
//! [probe]
//! extra_exclude = ["probe.floppy"]
//! detect_display_server = true
//!
//! [classes]
//! file = "/usr/share/hwinfo/classnames.toml"
//!
//! [log]
//! level = "info"
//! ```

use crate::error::{HwinfoError, Result};
use crate::probe_path::ProbePath;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// System configuration directory
pub const SYSTEM_CONFIG_DIR: &str = "/etc/hwinfo";
const CONFIG_FILE: &str = "config.toml";

/// Probe walk settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Where the walk starts
    #[serde(default = "default_root")]
    pub root: ProbePath,

    /// Leaf whose SMBIOS entries are cleaned up
    #[serde(default = "default_bios_path")]
    pub bios_path: ProbePath,

    /// Leaf segment that gets per-processor cpuinfo merged in
    #[serde(default = "default_cpu_segment")]
    pub cpu_segment: String,

    /// Per-processor address space: `<root>.<index>.<key>`
    #[serde(default = "default_cpuinfo_root")]
    pub cpuinfo_root: ProbePath,

    /// Boolean leaf telling whether this is a User Mode Linux system
    #[serde(default = "default_uml_flag_path")]
    pub uml_flag_path: ProbePath,

    /// Paths never probed: slow, or not interesting to users
    #[serde(default = "default_exclude")]
    pub default_exclude: Vec<ProbePath>,

    /// Additional user exclusions
    #[serde(default)]
    pub extra_exclude: Vec<ProbePath>,

    /// Excluded on UML, which emulates only a few devices
    #[serde(default = "default_uml_exclude")]
    pub uml_exclude: Vec<ProbePath>,

    /// Excluded while a display server runs: probing moves the cursor
    #[serde(default = "default_pointer_sensitive")]
    pub pointer_sensitive: Vec<ProbePath>,

    /// Whether to look for a running display server at all
    #[serde(default = "default_true")]
    pub detect_display_server: bool,

    /// Process names treated as a running display server
    #[serde(default = "default_display_server_processes")]
    pub display_server_processes: Vec<String>,
}

fn probe_path(s: &str) -> ProbePath {
    ProbePath::literal(s)
}

fn probe_paths(list: &[&str]) -> Vec<ProbePath> {
    list.iter().map(|s| probe_path(s)).collect()
}

fn default_root() -> ProbePath {
    probe_path("probe")
}

fn default_bios_path() -> ProbePath {
    probe_path("probe.bios")
}

fn default_cpu_segment() -> String {
    "cpu".to_string()
}

fn default_cpuinfo_root() -> ProbePath {
    probe_path("proc.cpuinfo.value")
}

fn default_uml_flag_path() -> ProbePath {
    probe_path("probe.is_uml")
}

fn default_exclude() -> Vec<ProbePath> {
    probe_paths(&[
        "probe.byclass",
        "probe.bybus",
        "probe.ihw_data",
        "probe.system",
        "probe.status",
        "probe.cdb_isdn",
        "probe.boot_disk",
    ])
}

fn default_uml_exclude() -> Vec<ProbePath> {
    probe_paths(&[
        "probe.scsi",
        "probe.camera",
        "probe.pppoe",
        "probe.isapnp",
        "probe.tape",
        "probe.joystick",
        "probe.usb",
        "probe.ieee1394ctrl",
        "probe.usbctrl",
        "probe.cdrom",
        "probe.floppy",
        "probe.chipcard",
        "probe.mouse",
    ])
}

fn default_pointer_sensitive() -> Vec<ProbePath> {
    probe_paths(&["probe.mouse", "probe.chipcard"])
}

fn default_true() -> bool {
    true
}

fn default_display_server_processes() -> Vec<String> {
    vec!["Xorg".to_string()]
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            bios_path: default_bios_path(),
            cpu_segment: default_cpu_segment(),
            cpuinfo_root: default_cpuinfo_root(),
            uml_flag_path: default_uml_flag_path(),
            default_exclude: default_exclude(),
            extra_exclude: Vec::new(),
            uml_exclude: default_uml_exclude(),
            pointer_sensitive: default_pointer_sensitive(),
            detect_display_server: true,
            display_server_processes: default_display_server_processes(),
        }
    }
}

/// Device class table settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassConfig {
    /// Optional TOML class table merged over the built-in names
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// tracing filter directive, overridden by $HWINFO_LOG
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HwinfoConfig {
    #[serde(default)]
    pub probe: ProbeConfig,

    #[serde(default)]
    pub classes: ClassConfig,

    #[serde(default)]
    pub log: LogConfig,
}

impl HwinfoConfig {
    /// Load the system config, falling back to defaults if it is missing or
    /// unreadable.
    pub fn load() -> Self {
        let path = config_path();
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load an explicit config file. Errors are reported, not swallowed.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: HwinfoConfig = toml::from_str(content)?;
        if config.probe.cpu_segment.is_empty() {
            return Err(HwinfoError::Config("probe.cpu_segment must not be empty".into()));
        }
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| HwinfoError::Config(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Get the config file path
pub fn config_path() -> PathBuf {
    PathBuf::from(SYSTEM_CONFIG_DIR).join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HwinfoConfig::default();
        assert_eq!(config.probe.root.to_string(), "probe");
        assert_eq!(config.probe.default_exclude.len(), 7);
        assert_eq!(config.probe.uml_exclude.len(), 13);
        assert_eq!(config.log.level, "warn");
        assert!(config.classes.file.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = HwinfoConfig::from_toml_str(
            r#"
            [probe]
            extra_exclude = ["probe.floppy", ".probe.tape"]
            detect_display_server = false
            "#,
        )
        .unwrap();

        assert_eq!(config.probe.extra_exclude.len(), 2);
        assert_eq!(config.probe.extra_exclude[1].to_string(), "probe.tape");
        assert!(!config.probe.detect_display_server);
        assert_eq!(config.probe.bios_path.to_string(), "probe.bios");
        assert_eq!(config.log, LogConfig::default());
    }

    #[test]
    fn test_invalid_path_rejected() {
        assert!(HwinfoConfig::from_toml_str("[probe]\nroot = \"probe..x\"\n").is_err());
        assert!(HwinfoConfig::from_toml_str("[probe]\ncpu_segment = \"\"\n").is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("etc").join("config.toml");

        let mut config = HwinfoConfig::default();
        config.log.level = "debug".to_string();
        config.classes.file = Some(PathBuf::from("/tmp/classes.toml"));
        config.save(&path).unwrap();

        let loaded = HwinfoConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
