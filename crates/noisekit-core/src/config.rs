//! Configuration resolution for noisekit.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/noisekit/settings.json)
//! 3. Project config (.noisekit/settings.json)
//! 4. Environment variables
//! 5. CLI arguments (highest priority, applied by the binary)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use noisekit_crypto::session::DEFAULT_KDF_SALT;
use noisekit_crypto::{CipherSuite, SessionParams};
use tracing::warn;

use crate::error::{Error, Result};

/// Complete noisekit configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Parameters both peers must agree on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub cipher_suite: CipherSuite,
    /// HKDF salt, used as UTF-8 bytes.
    pub kdf_salt: String,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            cipher_suite: CipherSuite::default(),
            kdf_salt: String::from_utf8_lossy(DEFAULT_KDF_SALT).into_owned(),
        }
    }
}

impl ChannelConfig {
    pub fn session_params(&self) -> SessionParams {
        SessionParams {
            suite: self.cipher_suite,
            kdf_salt: self.kdf_salt.as_bytes().to_vec(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON log lines instead of the human-readable format.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

/// The contents of one config file. Only the fields a file sets are
/// applied on top of the layers below it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConfigLayer {
    pub channel: ChannelLayer,
    pub logging: LoggingLayer,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChannelLayer {
    pub cipher_suite: Option<CipherSuite>,
    pub kdf_salt: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingLayer {
    pub level: Option<String>,
    pub json: Option<bool>,
}

/// Load configuration with hierarchical resolution.
pub fn load_config(project_dir: Option<&Path>) -> Result<Config> {
    let env = |name: &str| std::env::var(name).ok();
    let global_path = global_config_path(env);
    load_config_from(global_path.as_deref(), project_dir, env)
}

/// Resolve configuration from an explicit global file, an optional project
/// directory and an environment lookup. Missing files are skipped.
pub fn load_config_from(
    global_path: Option<&Path>,
    project_dir: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Config> {
    let mut config = Config::default();

    if let Some(path) = global_path.filter(|p| p.exists()) {
        merge_config(&mut config, load_config_file(path)?);
    }

    if let Some(dir) = project_dir {
        let project_path = project_config_path(dir);
        if project_path.exists() {
            merge_config(&mut config, load_config_file(&project_path)?);
        }
    }

    apply_env_overrides(&mut config, lookup);

    Ok(config)
}

/// Path of the project-level config file under `dir`.
pub fn project_config_path(dir: &Path) -> PathBuf {
    dir.join(".noisekit").join("settings.json")
}

/// Get the global config file path, reading `HOME`-style variables
/// through `lookup`.
pub fn global_config_path(lookup: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        lookup("USERPROFILE").map(|h| PathBuf::from(h).join(".noisekit").join("settings.json"))
    }
    #[cfg(target_os = "macos")]
    {
        lookup("HOME")
            .map(|h| PathBuf::from(h).join("Library/Application Support/noisekit/settings.json"))
    }
    #[cfg(target_os = "linux")]
    {
        lookup("XDG_CONFIG_HOME")
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .or_else(|| lookup("HOME").map(|h| PathBuf::from(h).join(".config")))
            .map(|p| p.join("noisekit").join("settings.json"))
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
    {
        let _ = lookup;
        None
    }
}

/// Read and parse one JSON config file.
pub fn load_config_file(path: &Path) -> Result<ConfigLayer> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Overlay the fields `layer` sets onto `base`. Unset fields keep the
/// value from the lower layers.
pub fn merge_config(base: &mut Config, layer: ConfigLayer) {
    if let Some(suite) = layer.channel.cipher_suite {
        base.channel.cipher_suite = suite;
    }
    if let Some(salt) = layer.channel.kdf_salt {
        base.channel.kdf_salt = salt;
    }
    if let Some(level) = layer.logging.level {
        base.logging.level = level;
    }
    if let Some(json) = layer.logging.json {
        base.logging.json = json;
    }
}

/// Apply `NOISEKIT_*` overrides looked up through `lookup`.
///
/// An unparsable cipher suite is ignored with a warning so a typo in the
/// environment does not silently switch suites.
pub fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(val) = lookup("NOISEKIT_CIPHER_SUITE") {
        match val.parse() {
            Ok(suite) => config.channel.cipher_suite = suite,
            Err(e) => warn!(error = %e, "Ignoring NOISEKIT_CIPHER_SUITE"),
        }
    }
    if let Some(val) = lookup("NOISEKIT_KDF_SALT") {
        config.channel.kdf_salt = val;
    }
    if let Some(val) = lookup("NOISEKIT_LOG_LEVEL") {
        config.logging.level = val;
    }
    if let Some(val) = lookup("NOISEKIT_LOG_JSON") {
        config.logging.json = matches!(val.as_str(), "1" | "true" | "yes");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn default_config_uses_aes_and_default_salt() {
        let config = Config::default();
        assert_eq!(config.channel.cipher_suite, CipherSuite::Aes256Gcm);
        assert_eq!(config.channel.kdf_salt.as_bytes(), DEFAULT_KDF_SALT);
        assert_eq!(config.channel.session_params(), SessionParams::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"channel": {"cipher_suite": "chacha20-poly1305"}}"#).unwrap();
        assert_eq!(config.channel.cipher_suite, CipherSuite::ChaCha20Poly1305);
        assert_eq!(config.channel.kdf_salt.as_bytes(), DEFAULT_KDF_SALT);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    fn write_settings(path: &Path, json: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, json).unwrap();
    }

    #[test]
    fn load_config_file_reads_only_set_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        write_settings(&path, r#"{"channel": {"kdf_salt": "project-salt"}}"#);

        let layer = load_config_file(&path).unwrap();
        assert_eq!(layer.channel.kdf_salt.as_deref(), Some("project-salt"));
        assert_eq!(layer.channel.cipher_suite, None);
        assert_eq!(layer.logging, LoggingLayer::default());
    }

    #[test]
    fn load_config_file_rejects_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        write_settings(&path, "{not json");
        assert!(matches!(load_config_file(&path), Err(Error::Json { .. })));
    }

    #[test]
    fn load_config_file_rejects_unknown_suite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        write_settings(&path, r#"{"channel": {"cipher_suite": "des"}}"#);
        let err = load_config_file(&path).unwrap_err();
        assert!(matches!(err, Error::Json { .. }));
        assert!(err.to_string().contains("settings.json"));
    }

    #[test]
    fn unreadable_config_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(load_config_file(dir.path()), Err(Error::Io { .. })));
    }

    #[test]
    fn project_config_is_picked_up() {
        let dir = tempfile::tempdir().unwrap();
        write_settings(
            &project_config_path(dir.path()),
            r#"{"channel": {"kdf_salt": "from-project"}}"#,
        );

        let config = load_config_from(None, Some(dir.path()), env(&[])).unwrap();
        assert_eq!(config.channel.kdf_salt, "from-project");
        assert_eq!(config.channel.cipher_suite, CipherSuite::Aes256Gcm);
    }

    #[test]
    fn project_file_keeps_global_fields_it_does_not_set() {
        let global_dir = tempfile::tempdir().unwrap();
        let global = global_dir.path().join("settings.json");
        write_settings(
            &global,
            r#"{"channel": {"cipher_suite": "chacha20-poly1305", "kdf_salt": "global-salt"}}"#,
        );
        let project_dir = tempfile::tempdir().unwrap();
        write_settings(
            &project_config_path(project_dir.path()),
            r#"{"logging": {"level": "debug"}}"#,
        );

        let config =
            load_config_from(Some(&global), Some(project_dir.path()), env(&[])).unwrap();
        assert_eq!(config.channel.cipher_suite, CipherSuite::ChaCha20Poly1305);
        assert_eq!(config.channel.kdf_salt, "global-salt");
        assert_eq!(config.logging.level, "debug");
        assert!(!config.logging.json);
    }

    #[test]
    fn project_field_overrides_global_field() {
        let global_dir = tempfile::tempdir().unwrap();
        let global = global_dir.path().join("settings.json");
        write_settings(
            &global,
            r#"{"channel": {"cipher_suite": "chacha20-poly1305", "kdf_salt": "global-salt"}}"#,
        );
        let project_dir = tempfile::tempdir().unwrap();
        write_settings(
            &project_config_path(project_dir.path()),
            r#"{"channel": {"kdf_salt": "project-salt"}}"#,
        );

        let config = load_config_from(
            Some(&global),
            Some(project_dir.path()),
            env(&[("NOISEKIT_LOG_LEVEL", "info")]),
        )
        .unwrap();
        assert_eq!(config.channel.cipher_suite, CipherSuite::ChaCha20Poly1305);
        assert_eq!(config.channel.kdf_salt, "project-salt");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn missing_files_give_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(
            Some(&dir.path().join("absent.json")),
            Some(dir.path()),
            env(&[]),
        )
        .unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn invalid_global_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("settings.json");
        write_settings(&global, "42");
        assert!(matches!(
            load_config_from(Some(&global), None, env(&[])),
            Err(Error::Json { .. })
        ));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn global_path_prefers_xdg_config_home() {
        let path = global_config_path(env(&[("XDG_CONFIG_HOME", "/xdg"), ("HOME", "/home/u")]));
        assert_eq!(path, Some(PathBuf::from("/xdg/noisekit/settings.json")));

        let path = global_config_path(env(&[("HOME", "/home/u")]));
        assert_eq!(path, Some(PathBuf::from("/home/u/.config/noisekit/settings.json")));

        assert_eq!(global_config_path(env(&[])), None);
    }

    #[test]
    fn env_overrides_take_precedence() {
        let mut config = Config::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("NOISEKIT_CIPHER_SUITE", "chacha20-poly1305"),
                ("NOISEKIT_KDF_SALT", "env-salt"),
                ("NOISEKIT_LOG_LEVEL", "trace"),
                ("NOISEKIT_LOG_JSON", "true"),
            ]),
        );
        assert_eq!(config.channel.cipher_suite, CipherSuite::ChaCha20Poly1305);
        assert_eq!(config.channel.kdf_salt, "env-salt");
        assert_eq!(config.logging.level, "trace");
        assert!(config.logging.json);
    }

    #[test]
    fn invalid_env_suite_is_ignored() {
        let mut config = Config::default();
        apply_env_overrides(&mut config, env(&[("NOISEKIT_CIPHER_SUITE", "rot13")]));
        assert_eq!(config.channel.cipher_suite, CipherSuite::Aes256Gcm);
    }

    #[test]
    fn merge_applies_only_set_fields() {
        let mut base = Config::default();
        base.channel.cipher_suite = CipherSuite::ChaCha20Poly1305;
        let layer: ConfigLayer =
            serde_json::from_str(r#"{"logging": {"json": true}}"#).unwrap();
        merge_config(&mut base, layer);
        assert_eq!(base.channel.cipher_suite, CipherSuite::ChaCha20Poly1305);
        assert!(base.logging.json);
        assert_eq!(base.logging.level, "warn");
    }
}
