//! CLI mode
//!
//! One-shot commands that do not start the HTTP server.

use anyhow::{Context, Result};
use colored::Colorize;

use crate::config::StaticConfig;
use crate::services::{GeoIpProvider, IpLookupService, LocalePolicy};

/// 输出示例配置到 stdout 或文件
pub fn generate_config(output: Option<&str>) -> Result<()> {
    match output {
        Some(path) => {
            StaticConfig::default()
                .save_to_file(path)
                .with_context(|| format!("Failed to write {}", path))?;
            println!("{} Sample configuration written to {}", "✓".green(), path);
        }
        None => print!("{}", StaticConfig::generate_sample_config()),
    }
    Ok(())
}

/// 查询单个 IP 并以 JSON 打印
pub async fn lookup(config: &StaticConfig, ip: &str, lang: Option<&str>) -> Result<()> {
    let provider = GeoIpProvider::open(&config.geoip).context("Failed to open GeoIP database")?;
    let service = IpLookupService::new(
        provider,
        LocalePolicy::new(config.geoip.default_locale.clone()),
    );

    let info = service.resolve(ip, lang).await?;
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}
