use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::types::success_response;
use crate::services::{IpLookupService, SUCCESS_CODE};

// 应用启动时间结构体
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

impl AppStartTime {
    pub fn now() -> Self {
        Self {
            start_datetime: chrono::Utc::now(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HealthResponse {
    pub code: u16,
    pub status: String,
    pub provider: String,
    pub database_type: String,
    pub build_epoch: u64,
    pub default_locale: String,
    pub timestamp: String,
    pub uptime: u64,
}

pub struct HealthService;

impl HealthService {
    /// 数据库在启动时已经打开，能响应即代表健康
    pub async fn health_check(
        service: web::Data<IpLookupService>,
        app_start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        trace!("Received health check request");

        let now = chrono::Utc::now();
        let uptime = (now - app_start_time.start_datetime).num_seconds().max(0) as u64;
        let provider = service.provider();
        let meta = provider.database_info();

        success_response(&HealthResponse {
            code: SUCCESS_CODE,
            status: "ok".to_string(),
            provider: provider.provider_name().to_string(),
            database_type: meta.database_type,
            build_epoch: meta.build_epoch,
            default_locale: service.locale_policy().default_locale().to_string(),
            timestamp: now.to_rfc3339(),
            uptime,
        })
    }

    pub async fn liveness_check() -> impl Responder {
        trace!("Received liveness check request");
        HttpResponse::NoContent().finish()
    }
}

/// 注册健康检查路由，需在 `/{ip}` 之前注册
pub fn health_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(HealthService::health_check))
        .route("/health", web::head().to(HealthService::health_check))
        .route("/health/live", web::get().to(HealthService::liveness_check));
}
