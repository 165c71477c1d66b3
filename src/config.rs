use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub admin: AdminConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub scratch: ScratchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

fn default_connect_timeout_secs() -> u64 {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    pub passphrase: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("未知的存储后端: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// 单次存储调用超时（毫秒）
    pub timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Postgres,
            timeout_ms: 5000,
        }
    }
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CorsConfig {
    /// 为空表示允许任意来源
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// 刮刮卡判定参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScratchConfig {
    pub width: u32,
    pub height: u32,
    pub brush_radius: u32,
    /// 采样步长（像素）
    pub sample_stride: u32,
    /// 刮开比例超过该值即视为揭晓
    pub reveal_threshold: f64,
}

impl Default for ScratchConfig {
    fn default() -> Self {
        Self {
            width: 300,
            height: 150,
            brush_radius: 20,
            sample_stride: 4,
            reveal_threshold: 0.70,
        }
    }
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let lookup = |name: &str| env::var(name).ok();

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let mut config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => Self::from_toml_str(&config_str)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Self::from_lookup(lookup)?,
            Err(e) => {
                return Err(format!("无法读取配置文件 {config_path}: {e}").into());
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        config.apply_overrides(lookup);
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, Box<dyn std::error::Error>> {
        toml::from_str(s).map_err(|e| format!("解析配置文件失败: {e}").into())
    }

    /// 无配置文件：使用环境变量与默认值构建
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Box<dyn std::error::Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parse = |name: &str| lookup(name).and_then(|v| v.parse::<u64>().ok());

        let store = StoreConfig {
            backend: match lookup("STORE_BACKEND") {
                Some(v) => v.parse()?,
                None => StoreBackend::Postgres,
            },
            timeout_ms: parse("STORE_TIMEOUT_MS").unwrap_or(5000),
        };

        // 数据库 URL 仅在 postgres 后端时必须提供
        let database_url = lookup("DATABASE_URL").unwrap_or_default();
        if store.backend == StoreBackend::Postgres && database_url.is_empty() {
            return Err("缺少 DATABASE_URL 环境变量，且未找到配置文件 config.toml".into());
        }

        Ok(Config {
            server: ServerConfig {
                host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: lookup("SERVER_PORT")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(8080),
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: lookup("DB_MAX_CONNECTIONS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10),
                connect_timeout_secs: parse("DB_CONNECT_TIMEOUT_SECS")
                    .unwrap_or_else(default_connect_timeout_secs),
            },
            admin: AdminConfig {
                passphrase: lookup("ADMIN_PASSPHRASE").unwrap_or_default(),
            },
            store,
            cors: CorsConfig::default(),
            scratch: ScratchConfig::default(),
        })
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("SERVER_HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            self.server.port = p;
        }
        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = v;
        }
        if let Some(v) = lookup("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            self.database.max_connections = mc;
        }
        if let Some(v) = lookup("DB_CONNECT_TIMEOUT_SECS")
            && let Ok(n) = v.parse()
        {
            self.database.connect_timeout_secs = n;
        }
        if let Some(v) = lookup("ADMIN_PASSPHRASE") {
            self.admin.passphrase = v;
        }
        if let Some(v) = lookup("STORE_BACKEND")
            && let Ok(b) = v.parse()
        {
            self.store.backend = b;
        }
        if let Some(v) = lookup("STORE_TIMEOUT_MS")
            && let Ok(n) = v.parse()
        {
            self.store.timeout_ms = n;
        }
        if let Some(v) = lookup("CORS_ALLOWED_ORIGINS") {
            self.cors.allowed_origins = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
    }

    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.admin.passphrase.is_empty() {
            return Err("ADMIN_PASSPHRASE 不能为空".into());
        }
        if !(0.0..1.0).contains(&self.scratch.reveal_threshold) {
            return Err("scratch.reveal_threshold 必须在 [0, 1) 区间".into());
        }
        if self.scratch.width == 0 || self.scratch.height == 0 || self.scratch.sample_stride == 0
        {
            return Err("scratch 尺寸与采样步长必须为正数".into());
        }
        if self.store.timeout_ms == 0 {
            return Err("store.timeout_ms 必须为正数".into());
        }
        Ok(())
    }
}
