//! Tiered configuration loading.

use super::Config;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const CONFIG_FILE: &str = "config.yaml";

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    Defaults = 0,
    Project = 1,
    User = 2,
    Environment = 3,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// Directories searched for `config.yaml`.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    pub project_dir: Option<PathBuf>,
    pub user_dir: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover configuration directories from environment and defaults.
    pub fn discover() -> Self {
        let project_dir = std::env::var("TODO_STORE_PROJECT_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from(".todo-store")));

        let user_dir = std::env::var("TODO_STORE_USER_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".todo-store")));

        Self {
            project_dir,
            user_dir,
        }
    }

    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            user_dir,
        }
    }
}

/// Result of merging every tier.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: Config,
    /// Highest-priority file that contributed, if any.
    config_path: Option<PathBuf>,
    /// Tiers that contributed, lowest priority first.
    tiers: Vec<ConfigTier>,
}

impl ConfigLoader {
    /// Load from discovered paths and the process environment.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let explicit = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("TODO_STORE_CONFIG_PATH").ok().map(PathBuf::from));
        Self::load_with(ConfigPaths::discover(), explicit.as_deref(), |key| {
            std::env::var(key).ok()
        })
    }

    /// Load with explicit paths and an injectable environment lookup.
    pub fn load_with<F>(paths: ConfigPaths, explicit: Option<&Path>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut layers: Vec<Value> = vec![serde_json::to_value(Config::default())?];
        let mut tiers = vec![ConfigTier::Defaults];
        let mut config_path = None;

        if let Some(path) = explicit {
            let layer = read_layer(path)
                .with_context(|| format!("Failed to load config file {}", path.display()))?;
            debug!(path = %path.display(), "Loaded explicit config file");
            layers.push(layer);
            config_path = Some(path.to_path_buf());
        } else {
            let candidates = [
                (ConfigTier::Project, paths.project_dir.as_deref()),
                (ConfigTier::User, paths.user_dir.as_deref()),
            ];
            for (tier, dir) in candidates {
                let Some(file) = dir.map(|d| d.join(CONFIG_FILE)) else {
                    continue;
                };
                if !file.exists() {
                    continue;
                }
                match read_layer(&file) {
                    Ok(layer) => {
                        debug!(tier = %tier, path = %file.display(), "Loaded config layer");
                        layers.push(layer);
                        tiers.push(tier);
                        config_path = Some(file);
                    }
                    Err(e) => {
                        warn!(
                            tier = %tier,
                            path = %file.display(),
                            error = %e,
                            "Ignoring unreadable config file"
                        );
                    }
                }
            }
        }

        let mut config: Config = serde_json::from_value(deep_merge_all(layers))?;
        if apply_env_overrides(&mut config, env) {
            debug!(tier = %ConfigTier::Environment, "Applied environment overrides");
            tiers.push(ConfigTier::Environment);
        }

        Ok(Self {
            config,
            config_path,
            tiers,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Tiers that contributed to the merged configuration, lowest priority first.
    pub fn tiers(&self) -> &[ConfigTier] {
        &self.tiers
    }

    pub fn into_config(self) -> Config {
        self.config
    }
}

fn read_layer(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    let value: Value = serde_yaml::from_str(&content)?;
    Ok(value)
}

/// Returns true if any variable was applied.
fn apply_env_overrides<F>(config: &mut Config, env: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    let mut applied = false;

    if let Some(db_path) = env("TODO_STORE_DB_PATH") {
        config.store.db_path = PathBuf::from(db_path);
        applied = true;
    }

    if let Some(timeout) = env("TODO_STORE_BUSY_TIMEOUT_MS") {
        match timeout.parse() {
            Ok(ms) => {
                config.store.busy_timeout_ms = ms;
                applied = true;
            }
            Err(_) => warn!(
                tier = %ConfigTier::Environment,
                value = %timeout,
                "Ignoring invalid TODO_STORE_BUSY_TIMEOUT_MS"
            ),
        }
    }

    applied
}

/// Merge `overlay` onto `base`. Objects merge key by key; anything else in
/// `overlay` replaces `base`, except `null`, which leaves `base` alone.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut merged), Value::Object(overlay)) => {
            for (key, value) in overlay {
                let next = match merged.remove(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                merged.insert(key, next);
            }
            Value::Object(merged)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Fold [`deep_merge`] over layers ordered lowest priority first.
pub fn deep_merge_all(layers: impl IntoIterator<Item = Value>) -> Value {
    layers.into_iter().fold(Value::Null, deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn write_config(dir: &Path, yaml: &str) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(dir.join(CONFIG_FILE), yaml).unwrap();
    }

    #[test]
    fn merge_keeps_untouched_keys() {
        let base = json!({ "store": { "db_path": "a.db", "busy_timeout_ms": 10 } });
        let overlay = json!({ "store": { "busy_timeout_ms": 20 } });
        let merged = deep_merge(base, overlay);
        assert_eq!(merged, json!({ "store": { "db_path": "a.db", "busy_timeout_ms": 20 } }));
    }

    #[test]
    fn merge_null_preserves_base() {
        assert_eq!(deep_merge(json!(3), Value::Null), json!(3));
    }

    #[test]
    fn no_files_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::with_dirs(
            Some(temp.path().join("project")),
            Some(temp.path().join("user")),
        );
        let loader = ConfigLoader::load_with(paths, None, no_env).unwrap();
        assert_eq!(loader.config(), &Config::default());
        assert!(loader.config_path().is_none());
        assert_eq!(loader.tiers(), &[ConfigTier::Defaults]);
    }

    #[test]
    fn user_tier_overrides_project_tier() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("project");
        let user = temp.path().join("user");
        write_config(&project, "store:\n  db_path: project.db\n  busy_timeout_ms: 100\n");
        write_config(&user, "store:\n  busy_timeout_ms: 200\n");

        let paths = ConfigPaths::with_dirs(Some(project), Some(user.clone()));
        let loader = ConfigLoader::load_with(paths, None, no_env).unwrap();

        assert_eq!(loader.config().store.db_path, PathBuf::from("project.db"));
        assert_eq!(loader.config().store.busy_timeout_ms, 200);
        assert_eq!(loader.config_path(), Some(user.join(CONFIG_FILE).as_path()));
        assert_eq!(
            loader.tiers(),
            &[ConfigTier::Defaults, ConfigTier::Project, ConfigTier::User]
        );
    }

    #[test]
    fn environment_overrides_files() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("project");
        write_config(&project, "store:\n  db_path: project.db\n");

        let env = |key: &str| match key {
            "TODO_STORE_DB_PATH" => Some("env.db".to_string()),
            "TODO_STORE_BUSY_TIMEOUT_MS" => Some("not-a-number".to_string()),
            _ => None,
        };
        let paths = ConfigPaths::with_dirs(Some(project), None);
        let loader = ConfigLoader::load_with(paths, None, env).unwrap();
        assert_eq!(
            loader.tiers(),
            &[ConfigTier::Defaults, ConfigTier::Project, ConfigTier::Environment]
        );

        let config = loader.into_config();
        assert_eq!(config.store.db_path, PathBuf::from("env.db"));
        assert_eq!(config.store.busy_timeout_ms, 5000);
    }

    #[test]
    fn invalid_env_value_is_not_a_tier() {
        let env = |key: &str| match key {
            "TODO_STORE_BUSY_TIMEOUT_MS" => Some("soon".to_string()),
            _ => None,
        };
        let loader = ConfigLoader::load_with(ConfigPaths::default(), None, env).unwrap();
        assert_eq!(loader.tiers(), &[ConfigTier::Defaults]);
    }

    #[test]
    fn tiers_order_by_priority() {
        assert!(ConfigTier::Defaults < ConfigTier::Project);
        assert!(ConfigTier::User < ConfigTier::Environment);
        assert_eq!(ConfigTier::Environment.to_string(), "environment");
    }

    #[test]
    fn explicit_file_skips_tiers() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("project");
        write_config(&project, "store:\n  db_path: project.db\n");
        let explicit = temp.path().join("explicit.yaml");
        std::fs::write(&explicit, "store:\n  in_memory: true\n").unwrap();

        let paths = ConfigPaths::with_dirs(Some(project), None);
        let config = ConfigLoader::load_with(paths, Some(&explicit), no_env)
            .unwrap()
            .into_config();

        assert!(config.store.in_memory);
        assert_ne!(config.store.db_path, PathBuf::from("project.db"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.yaml");
        let result = ConfigLoader::load_with(ConfigPaths::default(), Some(&missing), no_env);
        assert!(result.is_err());
    }

    #[test]
    fn malformed_tier_is_skipped() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("project");
        write_config(&project, "store: [unclosed\n");

        let paths = ConfigPaths::with_dirs(Some(project), None);
        let loader = ConfigLoader::load_with(paths, None, no_env).unwrap();
        assert_eq!(loader.config(), &Config::default());
    }
}
