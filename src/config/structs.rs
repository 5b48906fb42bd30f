use serde::{Deserialize, Serialize};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 环境变量前缀，示例：IPGEO__SERVER__PORT=9999
pub const ENV_PREFIX: &str = "IPGEO";

/// 静态配置（从 TOML 加载，启动时使用）
///
/// - server: 监听地址、端口、worker 数量
/// - network: 代理信任策略（X-Forwarded-For / X-Real-IP）
/// - geoip: 数据库路径与默认语言
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub geoip: GeoIpConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    pub fn load(path: Option<&str>) -> Self {
        let explicit = path.is_some();
        let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

        match Self::try_load(path, explicit) {
            Ok(config) => {
                if std::path::Path::new(path).exists() {
                    eprintln!("[INFO] Configuration loaded from: {}", path);
                }
                config
            }
            Err(e) => {
                eprintln!("[ERROR] {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// 加载配置，失败时返回错误而不是回退到默认值
    ///
    /// `required` 为 true 时配置文件必须存在。
    pub fn try_load(path: &str, required: bool) -> crate::errors::Result<Self> {
        use config::{Config, Environment, File};

        let settings = Config::builder()
            .add_source(File::with_name(path).required(required))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::errors::IpGeoError::config(format!("Failed to build config: {}", e)))?;

        settings.try_deserialize::<StaticConfig>().map_err(|e| {
            crate::errors::IpGeoError::config(format!("Failed to deserialize config: {}", e))
        })
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> crate::errors::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::errors::IpGeoError::serialization(e.to_string()))?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// 监听地址
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,
}

/// 客户端 IP 提取策略
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// 是否读取 X-Forwarded-For / X-Real-IP
    #[serde(default = "default_trust_forwarded_headers")]
    pub trust_forwarded_headers: bool,
    /// 可信代理（单 IP 或 CIDR），为空时信任所有来源
    #[serde(default)]
    pub trusted_proxies: Vec<String>,
}

/// GeoIP 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoIpConfig {
    /// MaxMind City 数据库文件路径 (GeoLite2-City.mmdb)
    #[serde(default = "default_database_path")]
    pub database_path: String,
    /// Accept-Language 缺失时使用的语言，也是名称回退链的第二级
    #[serde(default = "default_locale")]
    pub default_locale: String,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions
// ============================================================

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_keep_alive_secs() -> u64 {
    30
}

fn default_trust_forwarded_headers() -> bool {
    true
}

fn default_database_path() -> String {
    "GeoLite2-City.mmdb".to_string()
}

fn default_locale() -> String {
    "zh-CN".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
            keep_alive_secs: default_keep_alive_secs(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            trust_forwarded_headers: default_trust_forwarded_headers(),
            trusted_proxies: Vec::new(),
        }
    }
}

impl Default for GeoIpConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            default_locale: default_locale(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}
