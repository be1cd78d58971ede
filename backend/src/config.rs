//! Server configuration.
//!
//! Values are layered with figment, later sources overriding earlier ones:
//! 1. built-in defaults
//! 2. a TOML file (`certgen.toml`, or the file named by `CERTGEN_CONFIG`)
//! 3. environment variables prefixed with `CERTGEN_`, using `__` between
//!    section and key (`CERTGEN_SERVER__PORT=8080`).

use crate::error::{Error, Result};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "certgen.toml";
const CONFIG_PATH_VAR: &str = "CERTGEN_CONFIG";
const ENV_PREFIX: &str = "CERTGEN_";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub render: RenderConfig,
    pub pdf: PdfConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound for a whole multipart request body.
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub database_path: PathBuf,
    /// Where uploaded template images are written.
    pub templates_dir: PathBuf,
    /// Where rendered certificates are written and served from.
    pub certificates_dir: PathBuf,
}

/// Settings for the certificate renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Pixel size used when a field does not set `font_size`.
    pub default_font_size: f32,
    /// TrueType font tried when a field's own font cannot be loaded. When this
    /// fails as well the built-in bitmap font is used.
    pub default_font_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Directory holding the `<Family>-Regular.ttf` (and bold/italic) files genpdf loads.
    pub font_dir: PathBuf,
    /// Families tried in order.
    pub font_families: Vec<String>,
    /// Pixels per inch used to size the PDF page from the image.
    pub resolution_dpi: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5001,
            max_upload_bytes: 16 * 1024 * 1024,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("certs.db"),
            templates_dir: PathBuf::from("static/templates"),
            certificates_dir: PathBuf::from("static/certs"),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            default_font_size: 40.0,
            default_font_path: None,
        }
    }
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            font_dir: PathBuf::from("./fonts"),
            font_families: vec!["Arial".to_string(), "LiberationSans".to_string()],
            resolution_dpi: 100.0,
        }
    }
}

impl Config {
    /// Loads the configuration from defaults, the config file and the environment.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
        Self::load_from(&path)
    }

    pub fn load_from(config_file: &Path) -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__").ignore(&["config"]));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::config("server.port must be greater than 0"));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(Error::config("server.max_upload_bytes must be greater than 0"));
        }
        if !(self.render.default_font_size > 0.0) {
            return Err(Error::config(format!(
                "render.default_font_size must be positive, got {}",
                self.render.default_font_size
            )));
        }
        if !(self.pdf.resolution_dpi > 0.0) {
            return Err(Error::config(format!(
                "pdf.resolution_dpi must be positive, got {}",
                self.pdf.resolution_dpi
            )));
        }
        if self.pdf.font_families.is_empty() {
            return Err(Error::config("pdf.font_families must name at least one family"));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.server.host.clone(), self.server.port)
    }
}
