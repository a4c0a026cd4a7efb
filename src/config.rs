use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub cors_origin: String,
    pub store: StoreConfig,
    pub detector: DetectorConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Sled,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(StoreBackend::Memory),
            "sled" => Ok(StoreBackend::Sled),
            other => Err(format!("unknown store backend: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub sled_path: String,
}

#[derive(Debug, Clone)]
pub struct DetectorConfig {
    pub host: String,
    pub port: u16,
    pub timeout_secs: u64,
    pub health_retries: u32,
    pub health_interval_ms: u64,
}

impl DetectorConfig {
    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone)]
pub struct LimitsConfig {
    pub max_frame_bytes: usize,
    pub frame_timeout_ms: u64,
    pub max_sse_connections: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_frame_bytes: 5 * 1024 * 1024,
            frame_timeout_ms: 15_000,
            max_sse_connections: 16,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let limit_defaults = LimitsConfig::default();
        Self {
            host: env_or_parse("HOST", IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))),
            port: env_or_parse("PORT", 3000_u16),
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            cors_origin: env_or("CORS_ORIGIN", "http://localhost:5173"),
            store: StoreConfig {
                backend: env_or_parse("STORE_BACKEND", StoreBackend::Memory),
                sled_path: env_or("SLED_PATH", "./data/squat.sled"),
            },
            detector: DetectorConfig {
                host: env_or("FACE_DETECT_SERVER_HOST", "127.0.0.1"),
                port: env_or_parse("FACE_DETECT_SERVER_PORT", 8765_u16),
                timeout_secs: env_or_parse("FACE_DETECT_TIMEOUT_SECS", 10_u64),
                health_retries: env_or_parse("FACE_DETECT_HEALTH_RETRIES", 10_u32),
                health_interval_ms: env_or_parse("FACE_DETECT_HEALTH_INTERVAL_MS", 100_u64),
            },
            limits: LimitsConfig {
                max_frame_bytes: env_or_parse("MAX_FRAME_BYTES", limit_defaults.max_frame_bytes),
                frame_timeout_ms: env_or_parse("FRAME_TIMEOUT_MS", limit_defaults.frame_timeout_ms),
                max_sse_connections: env_or_parse(
                    "MAX_SSE_CONNECTIONS",
                    limit_defaults.max_sse_connections,
                ),
            },
        }
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}
