//! Configuration management for mdsync.
//!
//! Parses `mdsync.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `confluence.base_url`
//! - `confluence.space`
//! - `confluence.username`
//! - `confluence.password`
//! - `confluence.token`
//! - `publish.title_prefix`
//! - `publish.parent_page`
//! - `publish.source_url`
//! - `publish.source_branch`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override Confluence base URL.
    pub base_url: Option<String>,
    /// Override Confluence space key.
    pub space: Option<String>,
    /// Override username for basic authentication.
    pub username: Option<String>,
    /// Override password for basic authentication.
    pub password: Option<String>,
    /// Override personal access token.
    pub token: Option<String>,
    /// Override repository root.
    pub root: Option<PathBuf>,
    /// Override docs path inside the root.
    pub path: Option<PathBuf>,
    /// Override title prefix.
    pub title_prefix: Option<String>,
    /// Override parent page title.
    pub parent_page: Option<String>,
    /// Override unsupported file policy.
    pub unsupported_files: Option<UnsupportedFiles>,
    /// Override namespace page policy.
    pub namespace_pages: Option<NamespacePages>,
    /// Override source repository URL.
    pub source_url: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdsync.toml";

/// Extensions treated as documents when none are configured.
const DEFAULT_EXTENSIONS: [&str; 2] = ["md", "markdown"];

/// Files skipped silently when no ignore list is configured.
const DEFAULT_IGNORE: [&str; 6] = ["*.png", "*.jpg", "*.jpeg", "*.gif", "*.svg", "*.webp"];

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Confluence connection settings (every field may come from the CLI instead).
    pub confluence: ConfluenceConfig,
    /// Publish configuration (paths are relative strings from TOML).
    publish: PublishConfigRaw,

    /// Resolved publish configuration (set after loading).
    #[serde(skip)]
    pub publish_resolved: PublishConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Confluence connection configuration as written in `[confluence]`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConfluenceConfig {
    /// Confluence server base URL.
    pub base_url: Option<String>,
    /// Target space key.
    pub space: Option<String>,
    /// Username for basic authentication.
    pub username: Option<String>,
    /// Password for basic authentication.
    pub password: Option<String>,
    /// Personal access token (bearer authentication).
    pub token: Option<String>,
}

/// Validated Confluence connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfluenceSettings {
    /// Base URL without trailing slash.
    pub base_url: String,
    /// Target space key.
    pub space: String,
    /// Credentials.
    pub auth: ConfluenceAuth,
}

/// Credentials for the Confluence REST API.
#[derive(Clone, PartialEq, Eq)]
pub enum ConfluenceAuth {
    /// HTTP basic authentication.
    Basic {
        /// Account name.
        username: String,
        /// Account password.
        password: String,
    },
    /// Personal access token sent as a bearer token.
    Token(String),
}

impl std::fmt::Debug for ConfluenceAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
            Self::Token(_) => f.write_str("Token(***)"),
        }
    }
}

/// How non-document files inside the docs tree are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnsupportedFiles {
    /// Abort the run before anything is published.
    #[default]
    Strict,
    /// Skip the file with a warning.
    Lenient,
}

/// When directory pages are created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamespacePages {
    /// Only when the first document of the directory is published.
    #[default]
    Lazy,
    /// As soon as the directory is entered, even if it holds no documents.
    Eager,
}

/// Case normalization applied to page titles derived from file names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitleCase {
    /// Use the file or directory name as is.
    #[default]
    Preserve,
    /// Lowercase the whole name.
    Lower,
    /// Uppercase the first character.
    Capitalize,
}

impl TitleCase {
    /// Apply this normalization to a file stem or directory name.
    #[must_use]
    pub fn apply(self, name: &str) -> String {
        match self {
            Self::Preserve => name.to_owned(),
            Self::Lower => name.to_lowercase(),
            Self::Capitalize => {
                let mut chars = name.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        }
    }
}

/// Raw publish configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct PublishConfigRaw {
    root: Option<String>,
    path: Option<String>,
    title_prefix: Option<String>,
    title_case: Option<TitleCase>,
    unsupported_files: Option<UnsupportedFiles>,
    namespace_pages: Option<NamespacePages>,
    extensions: Option<Vec<String>>,
    ignore: Option<Vec<String>>,
    parent_page: Option<String>,
    source_url: Option<String>,
    source_branch: Option<String>,
}

/// Resolved publish configuration with absolute paths.
#[derive(Debug, Clone)]
pub struct PublishConfig {
    /// Repository root.
    pub root: PathBuf,
    /// Docs directory relative to `root`.
    pub path: PathBuf,
    /// Prefix prepended to every page title.
    pub title_prefix: String,
    /// Case normalization for derived titles.
    pub title_case: TitleCase,
    /// Policy for non-document files.
    pub unsupported_files: UnsupportedFiles,
    /// Policy for directory page creation.
    pub namespace_pages: NamespacePages,
    /// File extensions treated as documents (without the dot).
    pub extensions: Vec<String>,
    /// Glob patterns for files skipped without a warning.
    pub ignore: Vec<String>,
    /// Title of the page hosting the whole tree.
    pub parent_page: Option<String>,
    /// Repository web URL used for the "generated from source" notice.
    pub source_url: Option<String>,
    /// Branch used in source links.
    pub source_branch: String,
}

impl PublishConfig {
    fn with_root(root: PathBuf) -> Self {
        Self {
            root,
            path: PathBuf::from("docs"),
            title_prefix: String::new(),
            title_case: TitleCase::default(),
            unsupported_files: UnsupportedFiles::default(),
            namespace_pages: NamespacePages::default(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|&e| e.to_owned()).collect(),
            ignore: DEFAULT_IGNORE.iter().map(|&p| p.to_owned()).collect(),
            parent_page: None,
            source_url: None,
            source_branch: "master".to_owned(),
        }
    }

    /// Directory whose contents are published.
    #[must_use]
    pub fn source_dir(&self) -> PathBuf {
        self.root.join(&self.path)
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self::with_root(PathBuf::from("."))
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`confluence.password`").
        field: String,
        /// Error message (e.g., "${`CONFLUENCE_PASSWORD`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

/// Strip leading and trailing slashes so `--path /docs/` means `docs`.
fn normalize_docs_path(path: &Path) -> PathBuf {
    let text = path.to_string_lossy();
    let trimmed = text.trim_matches('/');
    if trimmed.is_empty() {
        PathBuf::from(".")
    } else {
        PathBuf::from(trimmed)
    }
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mdsync.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        let confluence = &mut self.confluence;
        let overrides = [
            (&mut confluence.base_url, &settings.base_url),
            (&mut confluence.space, &settings.space),
            (&mut confluence.username, &settings.username),
            (&mut confluence.password, &settings.password),
            (&mut confluence.token, &settings.token),
        ];
        for (target, value) in overrides {
            if let Some(value) = value {
                *target = Some(value.clone());
            }
        }

        let publish = &mut self.publish_resolved;
        if let Some(root) = &settings.root {
            publish.root.clone_from(root);
        }
        if let Some(path) = &settings.path {
            publish.path = normalize_docs_path(path);
        }
        if let Some(prefix) = &settings.title_prefix {
            publish.title_prefix.clone_from(prefix);
        }
        if let Some(parent) = &settings.parent_page {
            publish.parent_page = Some(parent.clone());
        }
        if let Some(policy) = settings.unsupported_files {
            publish.unsupported_files = policy;
        }
        if let Some(policy) = settings.namespace_pages {
            publish.namespace_pages = policy;
        }
        if let Some(url) = &settings.source_url
            && !url.is_empty()
        {
            publish.source_url = Some(url.trim_end_matches('/').to_owned());
        }
    }

    /// Get validated Confluence settings.
    ///
    /// Required for any run that talks to Confluence. A dry run may proceed
    /// without them.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the URL, space or credentials are
    /// missing or malformed.
    pub fn require_confluence(&self) -> Result<ConfluenceSettings, ConfigError> {
        let conf = &self.confluence;

        let base_url = conf.base_url.as_deref().unwrap_or_default();
        require_non_empty(base_url, "confluence.base_url")?;
        require_http_url(base_url, "confluence.base_url")?;

        let space = conf.space.as_deref().unwrap_or_default();
        require_non_empty(space, "confluence.space")?;

        let auth = match (&conf.token, &conf.username, &conf.password) {
            (Some(token), _, _) if !token.is_empty() => ConfluenceAuth::Token(token.clone()),
            (_, Some(username), Some(password)) if !username.is_empty() => {
                require_non_empty(password, "confluence.password")?;
                ConfluenceAuth::Basic {
                    username: username.clone(),
                    password: password.clone(),
                }
            }
            (_, Some(username), None) if !username.is_empty() => {
                return Err(ConfigError::Validation(
                    "CONFLUENCE_PASSWORD must be defined to publish".to_owned(),
                ));
            }
            _ => {
                return Err(ConfigError::Validation(
                    "CONFLUENCE_USERNAME and CONFLUENCE_PASSWORD (or CONFLUENCE_TOKEN) must be defined to publish"
                        .to_owned(),
                ));
            }
        };

        Ok(ConfluenceSettings {
            base_url: base_url.trim_end_matches('/').to_owned(),
            space: space.trim_matches('"').to_owned(),
            auth,
        })
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            confluence: ConfluenceConfig::default(),
            publish: PublishConfigRaw::default(),
            publish_resolved: PublishConfig::with_root(base.to_path_buf()),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Confluence settings are checked separately by
    /// [`require_confluence`](Self::require_confluence).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let publish = &self.publish_resolved;

        if publish.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "publish.extensions cannot be empty".to_owned(),
            ));
        }
        for ext in &publish.extensions {
            require_non_empty(ext, "publish.extensions")?;
        }

        for pattern in &publish.ignore {
            glob::Pattern::new(pattern).map_err(|e| {
                ConfigError::Validation(format!("publish.ignore pattern '{pattern}': {e}"))
            })?;
        }

        require_non_empty(&publish.source_branch, "publish.source_branch")?;
        if let Some(url) = &publish.source_url {
            require_http_url(url, "publish.source_url")?;
        }
        if let Some(parent) = &publish.parent_page {
            require_non_empty(parent, "publish.parent_page")?;
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let conf = &mut self.confluence;
        conf.base_url = expand::expand_optional(conf.base_url.as_deref(), "confluence.base_url")?;
        conf.space = expand::expand_optional(conf.space.as_deref(), "confluence.space")?;
        conf.username = expand::expand_optional(conf.username.as_deref(), "confluence.username")?;
        conf.password = expand::expand_optional(conf.password.as_deref(), "confluence.password")?;
        conf.token = expand::expand_optional(conf.token.as_deref(), "confluence.token")?;

        let publish = &mut self.publish;
        publish.title_prefix =
            expand::expand_optional(publish.title_prefix.as_deref(), "publish.title_prefix")?;
        publish.parent_page =
            expand::expand_optional(publish.parent_page.as_deref(), "publish.parent_page")?;
        publish.source_url =
            expand::expand_optional(publish.source_url.as_deref(), "publish.source_url")?;
        publish.source_branch =
            expand::expand_optional(publish.source_branch.as_deref(), "publish.source_branch")?;

        Ok(())
    }

    /// Resolve the raw `[publish]` section against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let raw = std::mem::take(&mut self.publish);
        let root = raw
            .root
            .as_deref()
            .map_or_else(|| config_dir.to_path_buf(), |r| config_dir.join(r));
        let mut resolved = PublishConfig::with_root(root);

        if let Some(path) = raw.path {
            resolved.path = normalize_docs_path(Path::new(&path));
        }
        if let Some(prefix) = raw.title_prefix {
            resolved.title_prefix = prefix;
        }
        if let Some(case) = raw.title_case {
            resolved.title_case = case;
        }
        if let Some(policy) = raw.unsupported_files {
            resolved.unsupported_files = policy;
        }
        if let Some(policy) = raw.namespace_pages {
            resolved.namespace_pages = policy;
        }
        if let Some(extensions) = raw.extensions {
            resolved.extensions = extensions
                .into_iter()
                .map(|e| e.trim_start_matches('.').to_owned())
                .collect();
        }
        if let Some(ignore) = raw.ignore {
            resolved.ignore = ignore;
        }
        if let Some(branch) = raw.source_branch {
            resolved.source_branch = branch;
        }
        resolved.parent_page = raw.parent_page;
        resolved.source_url = raw.source_url.map(|u| u.trim_end_matches('/').to_owned());

        self.publish_resolved = resolved;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn load_str(toml: &str, dir: &Path) -> Config {
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();
        config.resolve_paths(dir);
        config
    }

    fn basic_auth_config() -> Config {
        let mut config = Config::default_with_base(Path::new("/repo"));
        config.confluence = ConfluenceConfig {
            base_url: Some("https://confluence.example.com/".to_owned()),
            space: Some("DOCS".to_owned()),
            username: Some("bot".to_owned()),
            password: Some("hunter2".to_owned()),
            token: None,
        };
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/repo"));
        let publish = &config.publish_resolved;
        assert_eq!(publish.source_dir(), PathBuf::from("/repo/docs"));
        assert_eq!(publish.unsupported_files, UnsupportedFiles::Strict);
        assert_eq!(publish.namespace_pages, NamespacePages::Lazy);
        assert_eq!(publish.title_case, TitleCase::Preserve);
        assert_eq!(publish.extensions, vec!["md", "markdown"]);
        assert_eq!(publish.source_branch, "master");
        assert!(publish.parent_page.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.confluence.base_url.is_none());
        assert!(config.confluence.space.is_none());
    }

    #[test]
    fn test_parse_publish_section() {
        let toml = r#"
[publish]
root = "repo"
path = "/handbook/"
title_prefix = "[preview] "
title_case = "capitalize"
unsupported_files = "lenient"
namespace_pages = "eager"
extensions = [".md"]
ignore = ["*.png"]
parent_page = "Handbook"
source_url = "https://git.example.com/team/handbook/"
source_branch = "main"
"#;
        let config = load_str(toml, Path::new("/work"));
        let publish = &config.publish_resolved;

        assert_eq!(publish.root, PathBuf::from("/work/repo"));
        assert_eq!(publish.source_dir(), PathBuf::from("/work/repo/handbook"));
        assert_eq!(publish.title_prefix, "[preview] ");
        assert_eq!(publish.title_case, TitleCase::Capitalize);
        assert_eq!(publish.unsupported_files, UnsupportedFiles::Lenient);
        assert_eq!(publish.namespace_pages, NamespacePages::Eager);
        assert_eq!(publish.extensions, vec!["md"]);
        assert_eq!(publish.ignore, vec!["*.png"]);
        assert_eq!(publish.parent_page.as_deref(), Some("Handbook"));
        assert_eq!(
            publish.source_url.as_deref(),
            Some("https://git.example.com/team/handbook")
        );
        assert_eq!(publish.source_branch, "main");
    }

    #[test]
    fn test_unknown_policy_is_parse_error() {
        let result: Result<Config, _> = toml::from_str(
            r#"
[publish]
unsupported_files = "sometimes"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            r#"
[confluence]
base_url = "https://confluence.example.com"
space = "ENG"

[publish]
path = "documentation"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
        assert_eq!(
            config.publish_resolved.source_dir(),
            dir.path().join("documentation")
        );
        assert_eq!(config.confluence.space.as_deref(), Some("ENG"));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let result = Config::load(Some(Path::new("/nonexistent/mdsync.toml")), None);
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/repo"));
        config.apply_cli_settings(&CliSettings {
            base_url: Some("https://wiki.example.com".to_owned()),
            space: Some("OPS".to_owned()),
            root: Some(PathBuf::from("/other")),
            path: Some(PathBuf::from("/runbooks/")),
            title_prefix: Some("tmp-".to_owned()),
            unsupported_files: Some(UnsupportedFiles::Lenient),
            namespace_pages: Some(NamespacePages::Eager),
            source_url: Some("https://git.example.com/ops/".to_owned()),
            ..Default::default()
        });

        assert_eq!(
            config.confluence.base_url.as_deref(),
            Some("https://wiki.example.com")
        );
        assert_eq!(config.confluence.space.as_deref(), Some("OPS"));
        let publish = &config.publish_resolved;
        assert_eq!(publish.source_dir(), PathBuf::from("/other/runbooks"));
        assert_eq!(publish.title_prefix, "tmp-");
        assert_eq!(publish.unsupported_files, UnsupportedFiles::Lenient);
        assert_eq!(publish.namespace_pages, NamespacePages::Eager);
        assert_eq!(
            publish.source_url.as_deref(),
            Some("https://git.example.com/ops")
        );
    }

    #[test]
    fn test_apply_cli_settings_empty_source_url_ignored() {
        let mut config = Config::default_with_base(Path::new("/repo"));
        config.apply_cli_settings(&CliSettings {
            source_url: Some(String::new()),
            ..Default::default()
        });
        assert!(config.publish_resolved.source_url.is_none());
    }

    #[test]
    fn test_require_confluence_basic_auth() {
        let settings = basic_auth_config().require_confluence().unwrap();
        assert_eq!(settings.base_url, "https://confluence.example.com");
        assert_eq!(settings.space, "DOCS");
        assert_eq!(
            settings.auth,
            ConfluenceAuth::Basic {
                username: "bot".to_owned(),
                password: "hunter2".to_owned(),
            }
        );
    }

    #[test]
    fn test_require_confluence_token_wins() {
        let mut config = basic_auth_config();
        config.confluence.token = Some("pat-123".to_owned());
        let settings = config.require_confluence().unwrap();
        assert_eq!(settings.auth, ConfluenceAuth::Token("pat-123".to_owned()));
    }

    #[test]
    fn test_require_confluence_missing_password() {
        let mut config = basic_auth_config();
        config.confluence.password = None;
        let err = config.require_confluence().unwrap_err();
        assert!(err.to_string().contains("CONFLUENCE_PASSWORD"));
    }

    #[test]
    fn test_require_confluence_missing_credentials() {
        let mut config = basic_auth_config();
        config.confluence.username = None;
        config.confluence.password = None;
        let err = config.require_confluence().unwrap_err();
        assert!(err.to_string().contains("CONFLUENCE_USERNAME"));
    }

    #[test]
    fn test_require_confluence_missing_space() {
        let mut config = basic_auth_config();
        config.confluence.space = None;
        let err = config.require_confluence().unwrap_err();
        assert!(err.to_string().contains("confluence.space"));
    }

    #[test]
    fn test_require_confluence_invalid_scheme() {
        let mut config = basic_auth_config();
        config.confluence.base_url = Some("ftp://confluence.example.com".to_owned());
        let err = config.require_confluence().unwrap_err();
        assert!(err.to_string().contains("http"));
    }

    #[test]
    fn test_auth_debug_hides_secrets() {
        let auth = ConfluenceAuth::Basic {
            username: "bot".to_owned(),
            password: "hunter2".to_owned(),
        };
        let rendered = format!("{auth:?}");
        assert!(rendered.contains("bot"));
        assert!(!rendered.contains("hunter2"));
        assert!(!format!("{:?}", ConfluenceAuth::Token("abc".to_owned())).contains("abc"));
    }

    #[test]
    fn test_validate_empty_extensions() {
        let mut config = Config::default_with_base(Path::new("/repo"));
        config.publish_resolved.extensions.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("publish.extensions"));
    }

    #[test]
    fn test_validate_bad_ignore_glob() {
        let mut config = Config::default_with_base(Path::new("/repo"));
        config.publish_resolved.ignore = vec!["[".to_owned()];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("publish.ignore"));
    }

    #[test]
    fn test_validate_source_url_scheme() {
        let mut config = Config::default_with_base(Path::new("/repo"));
        config.publish_resolved.source_url = Some("git@example.com:docs".to_owned());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("publish.source_url"));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(TitleCase::Preserve.apply("getting-Started"), "getting-Started");
        assert_eq!(TitleCase::Lower.apply("Getting-Started"), "getting-started");
        assert_eq!(TitleCase::Capitalize.apply("intro"), "Intro");
        assert_eq!(TitleCase::Capitalize.apply(""), "");
    }

    #[test]
    fn test_normalize_docs_path() {
        assert_eq!(normalize_docs_path(Path::new("/docs/")), PathBuf::from("docs"));
        assert_eq!(normalize_docs_path(Path::new("/")), PathBuf::from("."));
        assert_eq!(
            normalize_docs_path(Path::new("a/b")),
            PathBuf::from("a/b")
        );
    }
}
