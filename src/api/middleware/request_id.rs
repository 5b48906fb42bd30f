//! 请求追踪中间件
//!
//! 上游（反向代理）传入合法的 X-Request-ID 时沿用，否则生成 UUID v4。
//! ID 写入 request extensions、tracing span 和响应头，请求结束时以 debug 级别记录状态码和耗时。

use std::time::Instant;

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::middleware::Next;
use actix_web::{Error, HttpMessage};
use tracing::{Instrument, debug, info_span};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_REQUEST_ID_LEN: usize = 64;

/// 请求 ID，可从 request extensions 中提取
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    fn generate() -> Self {
        RequestId(Uuid::new_v4().to_string())
    }

    /// 沿用请求头中的 ID，缺失或不合法时生成新的
    fn from_request(req: &ServiceRequest) -> Self {
        req.headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|id| is_valid_request_id(id))
            .map(|id| RequestId(id.to_string()))
            .unwrap_or_else(Self::generate)
    }
}

/// 1 到 64 个 `[A-Za-z0-9._-]` 字符
pub fn is_valid_request_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_REQUEST_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
}

pub struct RequestTracing;

impl RequestTracing {
    /// 配合 `actix_web::middleware::from_fn` 使用
    pub async fn trace(
        req: ServiceRequest,
        next: Next<impl MessageBody>,
    ) -> Result<ServiceResponse<impl MessageBody>, Error> {
        let start = Instant::now();
        let request_id = RequestId::from_request(&req);

        let span = info_span!(
            "request",
            request_id = %request_id.0,
            method = %req.method(),
            path = %req.path(),
        );
        req.extensions_mut().insert(request_id.clone());

        async move {
            let mut response = next.call(req).await?;

            if let Ok(value) = HeaderValue::from_str(&request_id.0) {
                response
                    .headers_mut()
                    .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
            }

            debug!(
                status = response.status().as_u16(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "request completed"
            );

            Ok(response)
        }
        .instrument(span)
        .await
    }
}
