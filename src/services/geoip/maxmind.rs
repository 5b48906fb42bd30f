//! MaxMind GeoLite2 数据库实现
//!
//! 使用本地 GeoLite2-City.mmdb 文件进行 IP 地理位置查询

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use maxminddb::Reader;
use serde::Deserialize;
use tracing::trace;

use super::provider::{DatabaseInfo, GeoIpLookup, GeoRecord};
use crate::errors::{IpGeoError, Result};
use crate::services::locale::NameMapping;

/// City 记录的解码结构，只取 names 与 iso_code
#[derive(Debug, Deserialize)]
struct CityRecord {
    #[serde(default)]
    country: Option<Place>,
    #[serde(default)]
    city: Option<Place>,
    #[serde(default)]
    subdivisions: Option<Vec<Place>>,
}

#[derive(Debug, Deserialize)]
struct Place {
    #[serde(default)]
    iso_code: Option<String>,
    #[serde(default)]
    names: Option<NameMapping>,
}

impl From<CityRecord> for GeoRecord {
    fn from(record: CityRecord) -> Self {
        let (country, country_iso_code) = match record.country {
            Some(place) => (place.names, place.iso_code),
            None => (None, None),
        };

        Self {
            country,
            country_iso_code,
            city: record.city.and_then(|place| place.names),
            subdivisions: record
                .subdivisions
                .unwrap_or_default()
                .into_iter()
                .map(|place| place.names.unwrap_or_default())
                .collect(),
        }
    }
}

/// MaxMind GeoIP Provider
pub struct MaxMindProvider {
    reader: Arc<Reader<Vec<u8>>>,
}

impl MaxMindProvider {
    /// 从文件路径打开数据库
    pub fn open(path: &str) -> Result<Self> {
        let reader = Reader::open_readfile(path).map_err(|e| {
            IpGeoError::database_open(format!("Failed to open MaxMind database at {}: {}", path, e))
        })?;
        Ok(Self {
            reader: Arc::new(reader),
        })
    }
}

#[async_trait]
impl GeoIpLookup for MaxMindProvider {
    async fn lookup(&self, ip: IpAddr) -> Result<GeoRecord> {
        let result = self.reader.lookup(ip)?;
        let record: CityRecord = result
            .decode()?
            .ok_or_else(|| IpGeoError::not_found(format!("No record for {}", ip)))?;

        trace!(
            "MaxMind lookup for {}: country={:?}, subdivisions={}",
            ip,
            record.country.as_ref().and_then(|c| c.iso_code.as_deref()),
            record.subdivisions.as_ref().map_or(0, Vec::len)
        );

        Ok(record.into())
    }

    fn name(&self) -> &'static str {
        "MaxMind"
    }

    fn database_info(&self) -> DatabaseInfo {
        let meta = &self.reader.metadata;
        DatabaseInfo {
            database_type: meta.database_type.clone(),
            build_epoch: meta.build_epoch,
            languages: meta.languages.clone(),
        }
    }
}
