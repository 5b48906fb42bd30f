//! Server mode
//!
//! Opens the GeoIP database, configures the HTTP routes and runs the server
//! until a shutdown signal arrives.

use std::time::Duration;

use actix_web::middleware::{DefaultHeaders, from_fn};
use actix_web::{App, HttpServer, web};
use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api::middleware::RequestTracing;
use crate::api::services::{AppStartTime, health_routes, lookup_routes};
use crate::config::StaticConfig;
use crate::runtime::lifetime::shutdown::{SHUTDOWN_TIMEOUT_SECS, listen_for_shutdown};
use crate::runtime::lifetime::startup::{StartupContext, prepare_server_startup};

/// 请求体上限
pub const MAX_PAYLOAD_BYTES: usize = 64 * 1024;

/// 注册共享数据与全部路由
///
/// 健康检查和 `/ip` 必须先于 `/{ip}` 注册。
pub fn configure_app(cfg: &mut web::ServiceConfig, context: &StartupContext, start: &AppStartTime) {
    cfg.app_data(web::Data::new(context.lookup_service.clone()))
        .app_data(web::Data::new(context.ip_policy.clone()))
        .app_data(web::Data::new(start.clone()))
        .app_data(web::PayloadConfig::new(MAX_PAYLOAD_BYTES))
        .configure(health_routes)
        .configure(lookup_routes);
}

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server(config: StaticConfig) -> Result<()> {
    let app_start_time = AppStartTime::now();

    let startup = prepare_server_startup(&config).map_err(|e| {
        tracing::error!("Server startup failed: {:#}", e);
        e
    })?;

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    info!("Using {} worker(s) for the server", cpu_count);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(from_fn(RequestTracing::trace))
            .wrap(
                DefaultHeaders::new()
                    .add(("Cache-Control", "no-cache, no-store, must-revalidate")),
            )
            .configure(|cfg| configure_app(cfg, &startup, &app_start_time))
    })
    .keep_alive(Duration::from_secs(config.server.keep_alive_secs))
    .client_request_timeout(Duration::from_millis(5000))
    .client_disconnect_timeout(Duration::from_millis(1000))
    .shutdown_timeout(SHUTDOWN_TIMEOUT_SECS)
    .disable_signals()
    .workers(cpu_count);

    let bind_address = config.bind_address();
    warn!("Starting server at http://{}", bind_address);

    let server = server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run();

    let handle = server.handle();
    actix_web::rt::spawn(listen_for_shutdown(handle));

    server.await.context("HTTP server terminated with an error")?;
    info!("Server exited, GeoIP database released");

    Ok(())
}
