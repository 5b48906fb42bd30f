pub mod geoip;
pub mod ip_lookup;
pub mod locale;

pub use geoip::{DatabaseInfo, GeoIpLookup, GeoIpProvider, GeoRecord, MaxMindProvider};
pub use ip_lookup::{IpInfo, IpLookupService, SUCCESS_CODE, parse_ip};
pub use locale::{FALLBACK_LOCALE, LocalePolicy, NameMapping, resolve_locale};
