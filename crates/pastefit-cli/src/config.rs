use anyhow::{Context, Result};
use pastefit_core::{ResampleFilter, ResizePolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const BYTES_PER_MIB: u64 = 1024 * 1024;

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Largest allowed width in pixels
    #[serde(default = "default_max_width")]
    pub max_width: u32,

    /// Largest allowed height in pixels
    #[serde(default = "default_max_height")]
    pub max_height: u32,

    /// Encoder quality for lossy formats, 0.0 to 1.0
    #[serde(default = "default_quality")]
    pub quality: f32,

    /// Resampling filter (lanczos3, catmullrom, gaussian)
    #[serde(default = "default_filter")]
    pub filter: String,

    /// Memory one image may use while decoding, in MiB
    #[serde(default = "default_max_decode_mb")]
    pub max_decode_mb: u64,

    /// Batch mode leaves files alone unless they shrink by at least this fraction
    #[serde(default = "default_skip_threshold")]
    pub skip_threshold: f64,

    /// Folder for pasted images, relative to the vault root
    #[serde(default)]
    pub attachment_folder: String,

    /// Number of parallel jobs for batch operations
    #[serde(default = "default_jobs")]
    pub parallel_jobs: usize,

    /// Show progress bars
    #[serde(default = "default_progress")]
    pub show_progress: bool,

    /// Colored output
    #[serde(default = "default_color")]
    pub colored_output: bool,
}

fn default_max_width() -> u32 {
    pastefit_core::policy::DEFAULT_MAX_WIDTH
}

fn default_max_height() -> u32 {
    pastefit_core::policy::DEFAULT_MAX_HEIGHT
}

fn default_quality() -> f32 {
    pastefit_core::policy::DEFAULT_QUALITY
}

fn default_filter() -> String {
    ResampleFilter::default().as_str().to_string()
}

fn default_max_decode_mb() -> u64 {
    pastefit_core::DEFAULT_MAX_DECODE_BYTES / BYTES_PER_MIB
}

fn default_skip_threshold() -> f64 {
    pastefit_core::batch::DEFAULT_SKIP_THRESHOLD
}

// Sequential, like rewriting files by hand
fn default_jobs() -> usize {
    1
}

fn default_progress() -> bool {
    true
}

fn default_color() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_width: default_max_width(),
            max_height: default_max_height(),
            quality: default_quality(),
            filter: default_filter(),
            max_decode_mb: default_max_decode_mb(),
            skip_threshold: default_skip_threshold(),
            attachment_folder: String::new(),
            parallel_jobs: default_jobs(),
            show_progress: default_progress(),
            colored_output: default_color(),
        }
    }
}

impl Config {
    /// Get config file path (XDG-compliant)
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = directories::ProjectDirs::from("", "", "pastefit")
            .context("Failed to determine config directory")?
            .config_dir()
            .to_path_buf();

        fs::create_dir_all(&config_dir).context("Failed to create config directory")?;

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = fs::read_to_string(&config_path).context("Failed to read config file")?;

            let config: Config = toml::from_str(&content).context("Failed to parse config file")?;

            tracing::debug!("Loaded config from {:?}", config_path);
            Ok(config)
        } else {
            let config = Self::default();
            config.save()?;
            tracing::info!("Created default config at {:?}", config_path);
            Ok(config)
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, content).context("Failed to write config file")?;

        tracing::debug!("Saved config to {:?}", config_path);
        Ok(())
    }

    /// Reset to defaults
    pub fn reset() -> Result<()> {
        let config = Self::default();
        config.save()
    }

    /// Update one key from its string form
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "max_width" => self.max_width = value.parse()?,
            "max_height" => self.max_height = value.parse()?,
            "quality" => self.quality = value.parse()?,
            "filter" => {
                let filter: ResampleFilter = value.parse()?;
                self.filter = filter.as_str().to_string();
            }
            "max_decode_mb" => self.max_decode_mb = value.parse()?,
            "skip_threshold" => self.skip_threshold = value.parse()?,
            "attachment_folder" => self.attachment_folder = value.to_string(),
            "parallel_jobs" => self.parallel_jobs = value.parse()?,
            "show_progress" => self.show_progress = value.parse()?,
            "colored_output" => self.colored_output = value.parse()?,
            _ => anyhow::bail!("Unknown config key: {}", key),
        }

        // Reject values the resizer would refuse later
        self.policy()?;
        if self.max_decode_mb == 0 {
            anyhow::bail!("max_decode_mb must be positive");
        }
        if !(0.0..1.0).contains(&self.skip_threshold) {
            anyhow::bail!("skip_threshold must be within [0, 1)");
        }
        Ok(())
    }

    /// Resize policy described by this config
    pub fn policy(&self) -> Result<ResizePolicy> {
        let filter: ResampleFilter = self.filter.parse()?;
        let policy = ResizePolicy::new(self.max_width, self.max_height, self.quality)?;
        Ok(policy
            .with_filter(filter)
            .with_max_decode_bytes(self.max_decode_mb.saturating_mul(BYTES_PER_MIB)))
    }
}
