//! Command-line and environment configuration

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

pub const DEFAULT_API_BASE: &str = "https://singravedad-back.vercel.app";
pub const DEFAULT_VOLUME_PERCENT: u8 = 100;

#[derive(Debug, Clone, Parser)]
#[command(name = "band-site", version, about = "Terminal client for the band site: concerts, music and admin")]
pub struct Config {
    /// Origin of the remote API (without the /api suffix)
    #[arg(long, env = "BAND_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Directory for rolling log files
    #[arg(long, env = "BAND_LOG_DIR", default_value = ".logs")]
    pub log_dir: PathBuf,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 15)]
    pub timeout_secs: u64,

    /// Initial player volume, 0-100
    #[arg(long, default_value_t = DEFAULT_VOLUME_PERCENT, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub volume: u8,

    /// Never open the audio device, even when built with the `audio` feature
    #[arg(long)]
    pub silent: bool,
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            log_dir: PathBuf::from(".logs"),
            timeout_secs: 15,
            volume: DEFAULT_VOLUME_PERCENT,
            silent: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_overrides() {
        let config = Config::try_parse_from([
            "band-site",
            "--api-base",
            "http://localhost:4000",
            "--volume",
            "40",
            "--silent",
        ])
        .unwrap();
        assert_eq!(config.api_base, "http://localhost:4000");
        assert_eq!(config.volume, 40);
        assert!(config.silent);
    }

    #[test]
    fn rejects_volume_above_range() {
        assert!(Config::try_parse_from(["band-site", "--volume", "101"]).is_err());
    }
}
