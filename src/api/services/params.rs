//! 请求参数绑定
//!
//! 查询串总是参与绑定；POST 携带 urlencoded 表单或 JSON 时，
//! body 中出现的字段覆盖查询串中的同名字段。

use actix_web::http::StatusCode;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::{HttpRequest, web};
use serde::de::DeserializeOwned;

use super::types::{IpOnlyQuery, IpQuery};
use crate::errors::{IpGeoError, Result};

/// 可逐字段合并的参数结构
pub trait BindParams: DeserializeOwned + Default {
    /// `other` 中的 Some 字段覆盖 self
    fn merge(self, other: Self) -> Self;
}

impl BindParams for IpQuery {
    fn merge(self, other: Self) -> Self {
        Self {
            ip: other.ip.or(self.ip),
        }
    }
}

impl BindParams for IpOnlyQuery {
    fn merge(self, other: Self) -> Self {
        Self {
            json: other.json.or(self.json),
        }
    }
}

/// 取出请求体，超出 `PayloadConfig` 限制时返回 413
pub fn read_body(body: std::result::Result<web::Bytes, actix_web::Error>) -> Result<web::Bytes> {
    body.map_err(|e| {
        if e.as_response_error().status_code() == StatusCode::PAYLOAD_TOO_LARGE {
            IpGeoError::payload_too_large(e.to_string())
        } else {
            IpGeoError::validation(format!("Unreadable request body: {}", e))
        }
    })
}

/// 从查询串和 body 绑定参数
pub fn bind_params<T: BindParams>(req: &HttpRequest, body: &[u8]) -> Result<T> {
    let query = web::Query::<T>::from_query(req.query_string())
        .map_err(|e| IpGeoError::validation(format!("Invalid query string: {}", e)))?
        .into_inner();

    if body.is_empty() {
        return Ok(query);
    }

    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let from_body: T = if content_type.starts_with("application/json") {
        serde_json::from_slice(body)
            .map_err(|e| IpGeoError::validation(format!("Invalid JSON body: {}", e)))?
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let form = std::str::from_utf8(body)
            .map_err(|e| IpGeoError::validation(format!("Form body is not UTF-8: {}", e)))?;
        web::Query::<T>::from_query(form)
            .map_err(|e| IpGeoError::validation(format!("Invalid form body: {}", e)))?
            .into_inner()
    } else {
        return Ok(query);
    };

    Ok(query.merge(from_body))
}
