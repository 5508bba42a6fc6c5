use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};
use tokio::fs;

// CONFIGURATION STRUCTS

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MarketConfig {
    /// Appended to symbols that carry no "." exchange delimiter.
    /// ".NS" for NSE listings; leave empty for US listings.
    pub default_suffix: String,
    pub lookback_range: String, // e.g. "1y"
    pub interval: String,       // e.g. "1d"
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ThresholdConfig {
    /// Observations needed before a trend call is made.
    pub trend_window: usize,
    /// Percent move over the trend window that flips Neutral to Bullish/Bearish.
    pub trend_pct: f64,
    pub crash_window: usize,
    /// Percent drop over the crash window that flags a Downtrend.
    pub crash_drop_pct: f64,
    /// Volatility buckets: below low_max -> Low, below medium_max -> Medium, else High.
    pub vol_low_max: f64,
    pub vol_medium_max: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ForecastConfig {
    /// Trading days past the end of the series to extrapolate to.
    pub horizon_days: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuthConfig {
    pub required: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AppConfig {
    // Nested structs organize the config logically
    pub market: MarketConfig,
    pub thresholds: ThresholdConfig,
    pub forecast: ForecastConfig,
    pub auth: AuthConfig,
    /// Currency symbol prefixed to predicted prices in output.
    pub currency: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            market: MarketConfig {
                default_suffix: ".NS".to_string(),
                lookback_range: "1y".to_string(),
                interval: "1d".to_string(),
            },
            thresholds: ThresholdConfig {
                trend_window: 21,
                trend_pct: 5.0,
                crash_window: 8,
                crash_drop_pct: 6.0,
                vol_low_max: 1.2,
                vol_medium_max: 2.5,
            },
            forecast: ForecastConfig { horizon_days: 30 },
            auth: AuthConfig { required: false },
            currency: "₹".to_string(),
        }
    }
}

// STORAGE MANAGER

#[derive(Clone)]
pub struct AsyncStorageManager {
    // Absolute path to the storage directory (e.g. ".../target/debug/storage")
    pub base_dir: PathBuf,
}

impl AsyncStorageManager {
    /// Creates a manager rooted at an explicit directory, creating it if needed.
    pub async fn new<P: Into<PathBuf>>(base_dir: P) -> anyhow::Result<Self> {
        let base_dir = base_dir.into();
        if !base_dir.exists() {
            fs::create_dir_all(&base_dir).await?;
        }
        Ok(Self { base_dir })
    }

    /// Creates a manager whose storage directory sits next to the running binary.
    pub async fn new_relative<P: AsRef<Path>>(relative_path: P) -> anyhow::Result<Self> {
        let exe_path = std::env::current_exe()?;

        let base_dir = exe_path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Could not find binary directory"))?
            .join(relative_path);

        Self::new(base_dir).await
    }

    /// Saves any `Serialize` value to `<name>.json` with a write-then-rename
    /// so a crash mid-write leaves the previous file intact.
    pub async fn save<T: Serialize>(&self, filename: &str, data: &T) -> anyhow::Result<()> {
        let file_name = format!("{}.json", filename);
        let final_path = self.base_dir.join(&file_name);
        let tmp_path = self.base_dir.join(format!("{}.tmp", file_name));

        let json_bytes = serde_json::to_vec_pretty(data)?;

        tokio::fs::write(&tmp_path, json_bytes).await?;
        tokio::fs::rename(tmp_path, final_path).await?;

        Ok(())
    }

    /// Reads `<name>.json` and deserializes it into `T`.
    pub async fn load<T: DeserializeOwned>(&self, filename: &str) -> anyhow::Result<T> {
        let path = self.base_dir.join(format!("{}.json", filename));

        // Raw bytes; serde_json scans them during parsing anyway.
        let content = fs::read(path).await?;

        let data = serde_json::from_slice(&content)?;
        Ok(data)
    }
}
