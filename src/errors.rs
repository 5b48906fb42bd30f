use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone)]
pub enum IpGeoError {
    Validation(String),
    PayloadTooLarge(String),
    InvalidIp(String),
    NotFound(String),
    Lookup(String),
    DatabaseOpen(String),
    Config(String),
    FileOperation(String),
    Serialization(String),
}

impl IpGeoError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            IpGeoError::Validation(_) => "E001",
            IpGeoError::InvalidIp(_) => "E002",
            IpGeoError::NotFound(_) => "E003",
            IpGeoError::Lookup(_) => "E004",
            IpGeoError::DatabaseOpen(_) => "E005",
            IpGeoError::Config(_) => "E006",
            IpGeoError::FileOperation(_) => "E007",
            IpGeoError::Serialization(_) => "E008",
            IpGeoError::PayloadTooLarge(_) => "E009",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            IpGeoError::Validation(_) => "Validation Error",
            IpGeoError::InvalidIp(_) => "Invalid IP Address",
            IpGeoError::NotFound(_) => "Address Not Found",
            IpGeoError::Lookup(_) => "Lookup Error",
            IpGeoError::DatabaseOpen(_) => "Database Open Error",
            IpGeoError::Config(_) => "Configuration Error",
            IpGeoError::FileOperation(_) => "File Operation Error",
            IpGeoError::Serialization(_) => "Serialization Error",
            IpGeoError::PayloadTooLarge(_) => "Payload Too Large",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            IpGeoError::Validation(msg)
            | IpGeoError::PayloadTooLarge(msg)
            | IpGeoError::InvalidIp(msg)
            | IpGeoError::NotFound(msg)
            | IpGeoError::Lookup(msg)
            | IpGeoError::DatabaseOpen(msg)
            | IpGeoError::Config(msg)
            | IpGeoError::FileOperation(msg)
            | IpGeoError::Serialization(msg) => msg,
        }
    }

    /// 对应的 HTTP 状态码
    ///
    /// 响应体中的 `code` 字段与此保持一致。
    pub fn http_status(&self) -> StatusCode {
        match self {
            IpGeoError::Validation(_) | IpGeoError::InvalidIp(_) => StatusCode::BAD_REQUEST,
            IpGeoError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            IpGeoError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 面向客户端的错误信息，不暴露内部细节
    pub fn public_message(&self) -> &'static str {
        match self {
            IpGeoError::Validation(_) => "Invalid request parameters",
            IpGeoError::PayloadTooLarge(_) => "Request body too large",
            IpGeoError::InvalidIp(_) => "Invalid IP address",
            IpGeoError::NotFound(_) => "IP address not found",
            _ => "Request failed",
        }
    }

    /// 格式化为彩色输出（用于终端）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for IpGeoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for IpGeoError {}

// 便捷的构造函数
impl IpGeoError {
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        IpGeoError::Validation(msg.into())
    }

    pub fn payload_too_large<T: Into<String>>(msg: T) -> Self {
        IpGeoError::PayloadTooLarge(msg.into())
    }

    pub fn invalid_ip<T: Into<String>>(msg: T) -> Self {
        IpGeoError::InvalidIp(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        IpGeoError::NotFound(msg.into())
    }

    pub fn lookup<T: Into<String>>(msg: T) -> Self {
        IpGeoError::Lookup(msg.into())
    }

    pub fn database_open<T: Into<String>>(msg: T) -> Self {
        IpGeoError::DatabaseOpen(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        IpGeoError::Config(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        IpGeoError::FileOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        IpGeoError::Serialization(msg.into())
    }
}

impl From<std::io::Error> for IpGeoError {
    fn from(err: std::io::Error) -> Self {
        IpGeoError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for IpGeoError {
    fn from(err: serde_json::Error) -> Self {
        IpGeoError::Serialization(err.to_string())
    }
}

impl From<maxminddb::MaxMindDbError> for IpGeoError {
    fn from(err: maxminddb::MaxMindDbError) -> Self {
        IpGeoError::Lookup(err.to_string())
    }
}

impl From<std::net::AddrParseError> for IpGeoError {
    fn from(err: std::net::AddrParseError) -> Self {
        IpGeoError::InvalidIp(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, IpGeoError>;
