//! GeoIP 服务模块
//!
//! 基于 MaxMind GeoLite2 City 本地数据库的 IP 地理位置查询

mod maxmind;
mod provider;

pub use maxmind::MaxMindProvider;
pub use provider::{DatabaseInfo, GeoIpLookup, GeoIpProvider, GeoRecord};
