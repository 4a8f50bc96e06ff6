use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;

pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// When set to `1` or `true`, only the python interpreter may run. Meant
/// for hosting targets that ship no compilers at all.
pub const RESTRICTED_ENV_VAR: &str = "CODERUN_RESTRICTED";

#[derive(Parser)]
#[command(name = "coderun", version = "1.0", about, long_about = None)]
pub struct CliArgs {
    /// Language identifier for the submitted source (e.g. python, cpp, java)
    #[arg(long = "lang", short = 'l')]
    pub language: String,

    /// Source files to execute; reads from stdin when none are given
    pub files: Vec<PathBuf>,

    /// Path to an optional JSON configuration file
    #[arg(long = "config", short = 'c')]
    pub config_path: Option<String>,

    /// Wall-clock timeout in seconds for each execution
    #[arg(long = "timeout-secs", short = 't')]
    pub timeout_secs: Option<u64>,

    /// Refuse every language except python
    #[arg(long = "restricted", default_value_t = false)]
    pub restricted: bool,
}

/// On-disk configuration, all fields optional.
#[derive(Deserialize, Debug, Default)]
pub struct ConfigFile {
    pub timeout_secs: Option<u64>,
    pub restricted: Option<bool>,
}

/// Resolved dispatcher settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub timeout: Duration,
    pub restricted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            restricted: false,
        }
    }
}

impl CliArgs {
    /// Resolves settings from the config file, the environment and the
    /// command line, in increasing order of precedence.
    pub fn to_settings(&self) -> std::io::Result<Settings> {
        let file: ConfigFile = match &self.config_path {
            Some(path) => {
                let file = std::fs::File::open(path)?;
                let reader = std::io::BufReader::new(file);
                serde_json::from_reader(reader).map_err(std::io::Error::from)?
            }
            None => ConfigFile::default(),
        };

        let mut settings = Settings::default();
        if let Some(secs) = file.timeout_secs {
            settings.timeout = Duration::from_secs(secs);
        }
        if let Some(restricted) = file.restricted {
            settings.restricted = restricted;
        }
        if restricted_env() {
            settings.restricted = true;
        }
        if let Some(secs) = self.timeout_secs {
            settings.timeout = Duration::from_secs(secs);
        }
        if self.restricted {
            settings.restricted = true;
        }
        Ok(settings)
    }
}

/// Reads the restricted-hosting flag from the environment.
pub fn restricted_env() -> bool {
    std::env::var(RESTRICTED_ENV_VAR)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_match_the_contract() {
        let settings = Settings::default();
        assert_eq!(settings.timeout, Duration::from_secs(20));
        assert!(!settings.restricted);
    }

    #[test]
    fn config_file_deserialization() {
        let config: ConfigFile =
            serde_json::from_str(r#"{"timeout_secs": 5, "restricted": true}"#).unwrap();
        assert_eq!(config.timeout_secs, Some(5));
        assert_eq!(config.restricted, Some(true));

        let empty: ConfigFile = serde_json::from_str("{}").unwrap();
        assert!(empty.timeout_secs.is_none());
        assert!(empty.restricted.is_none());
    }

    #[test]
    fn cli_flags_override_the_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"timeout_secs": 40}"#).unwrap();

        let args = CliArgs {
            language: "python".to_string(),
            files: vec![],
            config_path: Some(path.to_string_lossy().into_owned()),
            timeout_secs: Some(3),
            restricted: true,
        };
        let settings = args.to_settings().unwrap();
        assert_eq!(settings.timeout, Duration::from_secs(3));
        assert!(settings.restricted);
    }

    #[test]
    fn config_file_alone_sets_the_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"timeout_secs": 40}"#).unwrap();

        let args = CliArgs {
            language: "python".to_string(),
            files: vec![],
            config_path: Some(path.to_string_lossy().into_owned()),
            timeout_secs: None,
            restricted: false,
        };
        let settings = args.to_settings().unwrap();
        assert_eq!(settings.timeout, Duration::from_secs(40));
    }
}
