//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const PROJECT_FILES: [&str; 2] = ["conductor.toml", ".conductor.toml"];

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Explicit config path (if provided)
    /// 2. Project root: `./conductor.toml` or `./.conductor.toml`
    /// 3. XDG config: `$XDG_CONFIG_HOME/tool-conductor/config.toml`
    /// 4. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        Self::load_from(
            Self::global_config_path().as_deref(),
            Self::project_config_path().as_deref(),
            config_path.map(PathBuf::as_path),
        )
    }

    /// Merge the given sources over the defaults; missing files are skipped
    pub fn load_from(
        global: Option<&Path>,
        project: Option<&Path>,
        explicit: Option<&Path>,
    ) -> Result<FileConfig, Box<figment::Error>> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        for path in [global, project].into_iter().flatten() {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }

        // An explicit path must exist; figment reports the missing file
        if let Some(path) = explicit {
            figment = figment.merge(Toml::file_exact(path));
        }

        figment.extract().map_err(Box::new)
    }

    /// Load only default configuration
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// `$XDG_CONFIG_HOME/tool-conductor/config.toml`, or the platform's
    /// equivalent when XDG is unset
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("tool-conductor").join("config.toml"))
    }

    /// The first project file present in the working directory
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Candidate sources, highest priority first
    pub fn sources(explicit: Option<&PathBuf>) -> Vec<ConfigSource> {
        let mut sources = Vec::new();

        if let Some(path) = explicit {
            sources.push(ConfigSource::file("Explicit", path.clone()));
        }
        match Self::project_config_path() {
            Some(path) => sources.push(ConfigSource::file("Project", path)),
            None => sources.push(ConfigSource {
                label: "Project",
                location: PROJECT_FILES.map(|f| format!("./{f}")).join(" or "),
                found: false,
            }),
        }
        if let Some(path) = Self::global_config_path() {
            sources.push(ConfigSource::file("Global", path));
        }
        sources.push(ConfigSource {
            label: "Default",
            location: "built-in defaults".to_string(),
            found: true,
        });

        sources
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(explicit: Option<&PathBuf>) {
        println!("Configuration sources (in priority order):");
        for source in Self::sources(explicit) {
            println!("  {source}");
        }
    }
}

/// One place configuration may come from
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSource {
    pub label: &'static str,
    pub location: String,
    pub found: bool,
}

impl ConfigSource {
    fn file(label: &'static str, path: PathBuf) -> Self {
        Self {
            label,
            found: path.exists(),
            location: path.display().to_string(),
        }
    }
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mark = if self.found { "FOUND" } else { "     " };
        write!(f, "[{mark}] {:<8} {}", format!("{}:", self.label), self.location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults_match_orchestration_defaults() {
        let config = ConfigLoader::load_defaults();
        assert!(config.tools.is_empty());
        assert_eq!(config.orchestration.input_size_threshold, 10_000);
    }

    #[test]
    fn test_sources_order() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("custom.toml");
        fs::write(&explicit, "").unwrap();

        let sources = ConfigLoader::sources(Some(&explicit));
        let labels: Vec<_> = sources.iter().map(|s| s.label).collect();
        assert_eq!(labels.first(), Some(&"Explicit"));
        assert_eq!(labels.last(), Some(&"Default"));
        assert!(sources[0].found);
        assert!(sources[0].to_string().starts_with("[FOUND] Explicit:"));
    }

    #[test]
    fn test_missing_optional_files_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigLoader::load_from(
            Some(&dir.path().join("absent-global.toml")),
            Some(&dir.path().join("absent-project.toml")),
            None,
        )
        .unwrap();
        assert_eq!(config.hub.call_timeout_ms, 5_000);
    }

    #[test]
    fn test_project_overrides_global() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let project = dir.path().join("conductor.toml");
        fs::write(&global, "[hub]\ncall_timeout_ms = 100\nchannel_capacity = 4\n").unwrap();
        fs::write(&project, "[hub]\ncall_timeout_ms = 200\n").unwrap();

        let config = ConfigLoader::load_from(Some(&global), Some(&project), None).unwrap();
        assert_eq!(config.hub.call_timeout_ms, 200);
        // fields the project file does not set survive from the global file
        assert_eq!(config.hub.channel_capacity, 4);
    }

    #[test]
    fn test_explicit_path_has_highest_priority() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("conductor.toml");
        let explicit = dir.path().join("custom.toml");
        fs::write(&project, "[orchestration]\nbackoff_base_ms = 10\n").unwrap();
        fs::write(&explicit, "[orchestration]\nbackoff_base_ms = 1\n").unwrap();

        let config = ConfigLoader::load_from(None, Some(&project), Some(&explicit)).unwrap();
        assert_eq!(config.orchestration.backoff_base_ms, 1);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ConfigLoader::load_from(None, None, Some(&dir.path().join("nope.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_tools_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("conductor.toml");
        fs::write(
            &project,
            "[[tools]]\nid = \"license-scanner\"\nspecializations = [\"dependency-analysis\"]\n",
        )
        .unwrap();

        let config = ConfigLoader::load_from(None, Some(&project), None).unwrap();
        assert_eq!(config.tools.len(), 1);
        assert_eq!(config.tools[0].id, "license-scanner");
    }
}
