use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.remove.bg/v1.0/removebg";

/// Output sizes accepted by the remove.bg `size` form field.
pub const SUPPORTED_SIZES: &[&str] = &[
    "auto", "preview", "small", "regular", "medium", "hd", "full", "4k", "50MP",
];

const TEMP_SUBDIR: &str = "_tmp_jpg";
const OUTPUT_SUBDIR: &str = "out";

#[derive(Parser, Clone)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Directory holding the original images (not searched recursively)
    pub input_dir: PathBuf,

    /// Where cutouts are written [default: <INPUT_DIR>/out]
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Where normalized JPEGs are written [default: <INPUT_DIR>/_tmp_jpg]
    #[arg(short, long)]
    pub temp_dir: Option<PathBuf>,

    /// remove.bg API key, sent as the `X-Api-Key` header
    #[arg(short = 'k', long, env = "REMOVE_BG_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Background-removal endpoint receiving the uploads
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Output size requested from the service
    #[arg(short, long, default_value = "auto", value_parser = check_size)]
    pub size: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: u64,

    /// JPEG quality of the normalized upload
    #[arg(short, long, default_value_t = 95, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: u8,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self::parse()
    }

    /// Config with every option at its default, for library callers.
    pub fn for_dirs(input_dir: impl Into<PathBuf>, api_key: impl Into<String>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: None,
            temp_dir: None,
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            size: "auto".to_string(),
            timeout_secs: 60,
            quality: 95,
            no_progress: false,
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| self.input_dir.join(OUTPUT_SUBDIR))
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir
            .clone()
            .unwrap_or_else(|| self.input_dir.join(TEMP_SUBDIR))
    }

    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn check_size(s: &str) -> Result<String, String> {
    if SUPPORTED_SIZES.contains(&s) {
        return Ok(s.to_string());
    }

    let supported: Vec<_> = SUPPORTED_SIZES.iter().map(|s| format!("`{}`", s)).collect();
    Err(format!(
        "{} is not supported. Supported sizes: {}",
        s,
        supported.join(", ")
    ))
}
