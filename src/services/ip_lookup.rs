//! IP 查询业务逻辑
//!
//! 校验 IP → 解析语言 → 查库 → 组装 `IpInfo`。
//! HTTP handler 与 CLI 共用这条流水线。

use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::geoip::{GeoIpProvider, GeoRecord};
use super::locale::LocalePolicy;
use crate::errors::{IpGeoError, Result};

/// 成功响应中的业务码
pub const SUCCESS_CODE: u16 = 200;

/// 一次查询的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpInfo {
    pub code: u16,
    pub ip: String,
    pub country: String,
    pub region: String,
    pub city: String,
}

impl IpInfo {
    /// 用语言策略把原始记录投影为显示名称
    pub fn from_record(ip: IpAddr, record: &GeoRecord, policy: &LocalePolicy, locale: &str) -> Self {
        Self {
            code: SUCCESS_CODE,
            ip: ip.to_string(),
            country: policy.select_name(record.country.as_ref(), locale),
            region: policy.select_name(record.subdivisions.first(), locale),
            city: policy.select_name(record.city.as_ref(), locale),
        }
    }
}

/// 校验 IP 字面量，前后带空白也视为非法
pub fn parse_ip(candidate: &str) -> Result<IpAddr> {
    candidate
        .parse::<IpAddr>()
        .map_err(|_| IpGeoError::invalid_ip(format!("'{}' is not a valid IP address", candidate)))
}

/// IP 查询服务
#[derive(Clone)]
pub struct IpLookupService {
    provider: GeoIpProvider,
    locale: LocalePolicy,
}

impl IpLookupService {
    pub fn new(provider: GeoIpProvider, locale: LocalePolicy) -> Self {
        Self { provider, locale }
    }

    pub fn provider(&self) -> &GeoIpProvider {
        &self.provider
    }

    pub fn locale_policy(&self) -> &LocalePolicy {
        &self.locale
    }

    /// 查询一个候选 IP
    ///
    /// 非法输入在查库之前就返回 `InvalidIp`。
    pub async fn resolve(&self, candidate: &str, accept_language: Option<&str>) -> Result<IpInfo> {
        let ip = parse_ip(candidate)?;
        let locale = self.locale.resolve(accept_language);
        trace!("Resolving {} with locale {}", ip, locale);

        let record = self.provider.lookup(ip).await.inspect_err(|e| {
            debug!("GeoIP lookup for {} failed: {}", ip, e);
        })?;

        Ok(IpInfo::from_record(ip, &record, &self.locale, &locale))
    }
}
