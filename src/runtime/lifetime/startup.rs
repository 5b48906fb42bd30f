use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::StaticConfig;
use crate::services::{GeoIpProvider, IpLookupService, LocalePolicy};
use crate::utils::ClientIpPolicy;

/// 服务启动前准备好的共享资源
///
/// 全部只读，在所有 worker 之间共享。
#[derive(Clone)]
pub struct StartupContext {
    pub lookup_service: IpLookupService,
    pub ip_policy: ClientIpPolicy,
}

/// 打开 GeoIP 数据库并构造共享上下文
///
/// 数据库打开失败是致命错误：服务不会以降级模式启动。
pub fn prepare_server_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let provider = GeoIpProvider::open(&config.geoip).context("Failed to open GeoIP database")?;

    let context = build_context(provider, config);

    info!(
        "Pre-startup completed in {:?}, default locale: {}",
        start_time.elapsed(),
        config.geoip.default_locale
    );
    Ok(context)
}

/// 用已有的 provider 构造上下文（CLI 与测试复用）
pub fn build_context(provider: GeoIpProvider, config: &StaticConfig) -> StartupContext {
    if !config.network.trust_forwarded_headers {
        info!("Forwarded headers disabled, using connection address only");
    } else if config.network.trusted_proxies.is_empty() {
        info!("Forwarded headers trusted from any peer (no trusted_proxies configured)");
    } else {
        info!(
            "Forwarded headers trusted from: {:?}",
            config.network.trusted_proxies
        );
    }

    StartupContext {
        lookup_service: IpLookupService::new(
            provider,
            LocalePolicy::new(config.geoip.default_locale.clone()),
        ),
        ip_policy: ClientIpPolicy::from_config(&config.network),
    }
}
