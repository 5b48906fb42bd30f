//! GeoIP Provider 抽象层
//!
//! 统一的 GeoIP 查询接口。数据库句柄在启动时打开一次，
//! 之后以只读方式在所有 worker 之间共享。

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::maxmind::MaxMindProvider;
use crate::config::GeoIpConfig;
use crate::errors::Result;
use crate::services::locale::NameMapping;

/// 数据库中一条 City 记录里我们关心的部分
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoRecord {
    pub country: Option<NameMapping>,
    /// ISO 3166-1 alpha-2 国家代码 (e.g., "CN", "US")
    pub country_iso_code: Option<String>,
    pub city: Option<NameMapping>,
    /// 行政区划，按数据库顺序，第一个为最高级
    pub subdivisions: Vec<NameMapping>,
}

/// 数据库元信息（用于健康检查和日志）
#[derive(Debug, Clone, Default)]
pub struct DatabaseInfo {
    pub database_type: String,
    pub build_epoch: u64,
    pub languages: Vec<String>,
}

/// GeoIP 查询 trait
#[async_trait]
pub trait GeoIpLookup: Send + Sync {
    /// 查询 IP 地址的地理位置
    ///
    /// 没有记录时返回 `IpGeoError::NotFound`，其他读取错误返回 `IpGeoError::Lookup`。
    async fn lookup(&self, ip: IpAddr) -> Result<GeoRecord>;

    /// 获取 provider 名称（用于日志）
    fn name(&self) -> &'static str;

    /// 数据库元信息
    fn database_info(&self) -> DatabaseInfo {
        DatabaseInfo::default()
    }
}

/// 统一 GeoIP Provider
///
/// 启动时构造，克隆只增加引用计数。
#[derive(Clone)]
pub struct GeoIpProvider {
    inner: Arc<dyn GeoIpLookup>,
}

impl GeoIpProvider {
    /// 打开 MaxMind 数据库
    ///
    /// 文件缺失或损坏直接返回错误，不存在降级模式。
    pub fn open(config: &GeoIpConfig) -> Result<Self> {
        let provider = MaxMindProvider::open(&config.database_path)?;
        let meta = provider.database_info();
        info!(
            "GeoIP: Using MaxMind database at {} (type={}, build_epoch={})",
            config.database_path, meta.database_type, meta.build_epoch
        );
        Ok(Self::from_lookup(Arc::new(provider)))
    }

    /// 使用任意实现构造（测试中注入 mock）
    pub fn from_lookup(inner: Arc<dyn GeoIpLookup>) -> Self {
        Self { inner }
    }

    /// 查询 IP 地址的地理位置
    pub async fn lookup(&self, ip: IpAddr) -> Result<GeoRecord> {
        self.inner.lookup(ip).await
    }

    /// 获取当前使用的 provider 名称
    pub fn provider_name(&self) -> &'static str {
        self.inner.name()
    }

    pub fn database_info(&self) -> DatabaseInfo {
        self.inner.database_info()
    }
}
