//! API 类型定义与响应构建

use std::fmt;

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

use crate::errors::IpGeoError;
use crate::services::SUCCESS_CODE;

/// 错误响应体
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
}

/// `/ip?json=true` 的响应体
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct IpOnlyBody {
    pub code: u16,
    pub ip: String,
}

/// `/` 与 `/{ip}` 接受的参数
#[derive(Deserialize, Clone, Debug, Default)]
pub struct IpQuery {
    pub ip: Option<String>,
}

/// `/ip` 接受的参数
#[derive(Deserialize, Clone, Debug, Default)]
pub struct IpOnlyQuery {
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub json: Option<bool>,
}

/// 解析布尔开关
///
/// 接受 `1/t/T/TRUE/true/True` 与 `0/f/F/FALSE/false/False`，空值视为 false。
pub fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "" | "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        _ => None,
    }
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    struct FlagVisitor;

    impl<'de> Visitor<'de> for FlagVisitor {
        type Value = Option<bool>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a boolean flag")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            parse_flag(v)
                .map(Some)
                .ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
    }

    deserializer.deserialize_any(FlagVisitor)
}

/// 构建 JSON 响应
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(body)
}

/// 构建成功响应
pub fn success_response<T: Serialize>(body: &T) -> HttpResponse {
    json_response(StatusCode::OK, body)
}

/// 从 IpGeoError 构建错误响应，`code` 与 HTTP 状态码一致
pub fn error_response(err: &IpGeoError) -> HttpResponse {
    let status = err.http_status();
    json_response(
        status,
        &ErrorBody {
            code: status.as_u16(),
            message: err.public_message().to_string(),
        },
    )
}

impl IpOnlyBody {
    pub fn new(ip: impl Into<String>) -> Self {
        Self {
            code: SUCCESS_CODE,
            ip: ip.into(),
        }
    }
}
