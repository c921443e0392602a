//! Configuration for an inkpress blog
//!
//! Loaded from `inkpress.toml` at the blog root. Every section and key is
//! optional; defaults match a stock hexo-style layout so a bare blog works
//! without any configuration:
//!
//! ```toml
//! [site]
//! content_dir = "source"
//! output_dir = "public"
//! theme = "landscape"
//!
//! [build]
//! command = ["hexo", "generate"]
//!
//! [deploy]
//! target_dir = "../deploy"
//! repo = "git@github.com:user/user.github.io.git"
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{InkpressError, InkpressResult};

/// Config file name at the blog root
pub const CONFIG_FILE: &str = "inkpress.toml";

/// Warning produced while loading configuration (unknown keys)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub message: String,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Site layout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Content root, relative to the blog root
    #[serde(default = "default_content_dir")]
    pub content_dir: PathBuf,

    /// Build output directory, relative to the blog root
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_theme")]
    pub theme: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            content_dir: default_content_dir(),
            output_dir: default_output_dir(),
            theme: default_theme(),
        }
    }
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("source")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_theme() -> String {
    "landscape".to_string()
}

/// Generator invocation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Generator command line, run from the blog root
    #[serde(default = "default_build_command")]
    pub command: Vec<String>,

    /// Flag appended to the command when drafts are requested
    #[serde(default = "default_drafts_flag")]
    pub drafts_flag: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            command: default_build_command(),
            drafts_flag: default_drafts_flag(),
        }
    }
}

fn default_build_command() -> Vec<String> {
    vec!["hexo".to_string(), "generate".to_string()]
}

fn default_drafts_flag() -> String {
    "--drafts".to_string()
}

/// Preview server configuration
///
/// An empty `command` means the generator has no preview server; `watch`
/// then falls back to its own rebuild loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewConfig {
    #[serde(default = "default_preview_command")]
    pub command: Vec<String>,

    #[serde(default = "default_drafts_flag")]
    pub drafts_flag: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            command: default_preview_command(),
            drafts_flag: default_drafts_flag(),
        }
    }
}

fn default_preview_command() -> Vec<String> {
    vec!["hexo".to_string(), "server".to_string()]
}

/// Deploy target configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Deploy clone location, relative to the blog root
    #[serde(default = "default_target_dir")]
    pub target_dir: PathBuf,

    /// Repository URL used for the one-time clone of the deploy target
    #[serde(default)]
    pub repo: Option<String>,

    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default = "default_branch")]
    pub branch: String,

    /// Custom-domain marker copied into the build output; empty disables
    #[serde(default = "default_domain_file")]
    pub domain_file: String,

    #[serde(default = "default_message_prefix")]
    pub message_prefix: String,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            target_dir: default_target_dir(),
            repo: None,
            remote: default_remote(),
            branch: default_branch(),
            domain_file: default_domain_file(),
            message_prefix: default_message_prefix(),
        }
    }
}

fn default_target_dir() -> PathBuf {
    PathBuf::from("../deploy")
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_domain_file() -> String {
    "CNAME".to_string()
}

fn default_message_prefix() -> String {
    "Site updated at".to_string()
}

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub preview: PreviewConfig,

    #[serde(default)]
    pub deploy: DeployConfig,
}

impl Config {
    /// Load configuration from a blog root, discarding warnings.
    pub fn load(root: &Path) -> InkpressResult<Self> {
        Ok(Self::load_with_warnings(root)?.0)
    }

    /// Load configuration from a blog root.
    ///
    /// A missing `inkpress.toml` yields defaults; a present-but-invalid one
    /// is an error. Unknown keys are collected as warnings, not rejected.
    pub fn load_with_warnings(root: &Path) -> InkpressResult<(Self, Vec<ConfigWarning>)> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            return Ok((Self::default(), Vec::new()));
        }

        let content = fs::read_to_string(&path)?;

        let mut warnings: Vec<ConfigWarning> = Vec::new();
        let deserializer = toml::de::Deserializer::new(&content);

        let config: Self = serde_ignored::deserialize(deserializer, |p| {
            warnings.push(ConfigWarning {
                message: format!("unknown config key '{}' in {}", p, path.display()),
            });
        })
        .map_err(|e| InkpressError::InvalidConfig {
            file: path.clone(),
            message: e.to_string(),
        })?;

        Ok((config, warnings))
    }

    /// Content directory resolved against the blog root
    pub fn content_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.site.content_dir)
    }

    /// Output directory resolved against the blog root
    pub fn output_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.site.output_dir)
    }

    /// Theme directory resolved against the blog root
    pub fn theme_dir(&self, root: &Path) -> PathBuf {
        root.join("themes").join(&self.site.theme)
    }

    /// Deploy target directory resolved against the blog root
    pub fn target_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.deploy.target_dir)
    }

    /// Domain marker path, or None when disabled
    pub fn domain_file(&self, root: &Path) -> Option<PathBuf> {
        if self.deploy.domain_file.is_empty() {
            None
        } else {
            Some(root.join(&self.deploy.domain_file))
        }
    }
}
