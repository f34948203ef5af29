use crate::model::{CategoryId, SpendingCategory};
use directories::ProjectDirs;
use donut::{ChartDimensions, Ease, InvalidInput};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use palette::{Srgb, Srgba};
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// `#RRGGBB` color as written in the config file.
#[derive(Debug, Clone, Copy, PartialEq, DeserializeFromStr, SerializeDisplay)]
pub struct HexColor(pub Srgba<f64>);

impl FromStr for HexColor {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rgb: Srgb<u8> = s.trim().parse().map_err(|e| ConfigError::InvalidColor {
            value: s.to_string(),
            reason: format!("{e}"),
        })?;
        let rgb: Srgb<f64> = rgb.into_format();
        Ok(Self(Srgba::new(rgb.red, rgb.green, rgb.blue, 1.0)))
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rgb: Srgb<u8> = Srgb::new(self.0.red, self.0.green, self.0.blue).into_format();
        write!(f, "#{:02x}{:02x}{:02x}", rgb.red, rgb.green, rgb.blue)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ChartConfig {
    pub spacing_degrees: f64,
    pub stroke_width: f64,
    pub selected_scale: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            spacing_degrees: donut::render::DEFAULT_SPACING_DEGREES,
            stroke_width: donut::render::DEFAULT_STROKE_WIDTH,
            selected_scale: donut::DEFAULT_SCALE_FACTOR,
        }
    }
}

impl ChartConfig {
    pub fn dimensions(&self) -> Result<ChartDimensions, InvalidInput> {
        ChartDimensions::new(self.stroke_width, self.spacing_degrees)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub progress_ms: u64,
    pub alpha_ms: u64,
    pub scale_ms: u64,
    pub ease: Ease,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            progress_ms: 1000,
            alpha_ms: 1000,
            scale_ms: 200,
            ease: Ease::FastOutSlowIn,
        }
    }
}

impl AnimationConfig {
    pub fn progress_duration(&self) -> Duration {
        Duration::from_millis(self.progress_ms)
    }

    pub fn alpha_duration(&self) -> Duration {
        Duration::from_millis(self.alpha_ms)
    }

    pub fn scale_duration(&self) -> Duration {
        Duration::from_millis(self.scale_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TransactionsConfig {
    pub page_size: usize,
    pub fetch_delay_ms: u64,
}

impl Default for TransactionsConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            fetch_delay_ms: 500,
        }
    }
}

impl TransactionsConfig {
    pub fn fetch_delay(&self) -> Duration {
        Duration::from_millis(self.fetch_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CategoryConfig {
    pub id: CategoryId,
    pub name: String,
    pub amount: f64,
    pub color: HexColor,
}

impl From<&CategoryConfig> for SpendingCategory {
    fn from(cfg: &CategoryConfig) -> Self {
        SpendingCategory {
            id: cfg.id.clone(),
            name: cfg.name.clone(),
            total_amount: cfg.amount,
            color: cfg.color.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub chart: ChartConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub transactions: TransactionsConfig,
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.chart.dimensions()?;
        if !(self.chart.selected_scale.is_finite() && self.chart.selected_scale > 0.0) {
            return Err(InvalidInput::NonPositiveDimension {
                name: "selected scale",
                value: self.chart.selected_scale,
            }
            .into());
        }
        if self.transactions.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        Ok(())
    }

    pub fn spending_categories(&self) -> Vec<SpendingCategory> {
        self.categories.iter().map(SpendingCategory::from).collect()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
    #[error("Invalid chart settings: {0}")]
    Invalid(#[from] InvalidInput),
    #[error("transactions.page_size must be at least 1")]
    ZeroPageSize,
    #[error("Invalid color '{value}': {reason}")]
    InvalidColor { value: String, reason: String },
}

pub fn get_config_path() -> Result<std::path::PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "tally", "tally").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("TALLY")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// Bundled defaults, then the user's file, then `TALLY_SECTION__KEY` variables.
pub fn load_config() -> Result<Config, ConfigError> {
    let config_path = get_config_path()?;

    let builder = config::Config::builder()
        .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
        .add_source(config::File::from(config_path).required(false))
        .add_source(environment());

    build(builder)
}

pub fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    let source = config::File::from_str(toml, config::FileFormat::Toml);
    build(config::Config::builder().add_source(source))
}

fn build(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> Result<Config, ConfigError> {
    let config: Config = builder.build()?.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

/// Falls back to the bundled defaults when the user's file is broken, so the
/// chart always has something to show.
pub fn load_or_default() -> Config {
    match load_config() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Failed to load config, using defaults: {}", e);
            parse_config(DEFAULT_CONFIG).unwrap_or_else(|e| {
                log::error!("Bundled config is invalid: {}", e);
                Config::default()
            })
        }
    }
}

pub fn write_default_config() -> std::io::Result<std::path::PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

pub const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

use crate::events::AppEvent;
use async_channel::Sender;

pub async fn run_async_watcher(tx: Sender<AppEvent>) {
    let config_path = match get_config_path() {
        Ok(p) => p,
        Err(e) => {
            log::error!("Config watcher error: {}", e);
            return;
        }
    };
    let config_dir = match config_path.parent() {
        Some(p) => p.to_path_buf(),
        None => return,
    };

    if let Err(e) = fs_err::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", e);
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch config directory: {}", e);
        return;
    }

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) => {
                if is_config_change(&event, &config_path)
                    && tx.send(AppEvent::ConfigReload).await.is_err()
                {
                    break;
                }
            }
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}

fn is_config_change(event: &notify::Event, config_path: &std::path::Path) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    ) && event.paths.iter().any(|p| p == config_path)
}
