//! Geo-IP lookup used to annotate click logs with a country code.
//!
//! The lookup is consumed as a contract only: a resolver maps an IP string
//! to an ISO 3166-1 alpha-2 code, or nothing. Redirects never wait on it;
//! the background click worker calls it before appending the log row.

use std::net::IpAddr;

use maxminddb::Reader;
use tracing::{debug, info};

/// Country resolution for click-log annotation.
pub trait GeoIp: Send + Sync {
    /// ISO country code for `ip`, or `None` when unknown/unresolvable.
    fn country_code(&self, ip: &str) -> Option<String>;
}

/// Resolver used when no GeoIP database is configured.
pub struct NullGeoIp;

impl GeoIp for NullGeoIp {
    fn country_code(&self, _ip: &str) -> Option<String> {
        None
    }
}

/// MaxMind GeoLite2 database resolver.
pub struct MaxMindGeoIp {
    reader: Reader<Vec<u8>>,
}

impl MaxMindGeoIp {
    /// Loads a GeoLite2 Country (or City) database from `path`.
    pub fn open(path: &str) -> Result<Self, maxminddb::MaxMindDbError> {
        let reader = Reader::open_readfile(path)?;
        info!("GeoIP: using MaxMind database at {}", path);
        Ok(Self { reader })
    }
}

impl GeoIp for MaxMindGeoIp {
    fn country_code(&self, ip: &str) -> Option<String> {
        let ip_addr: IpAddr = ip.parse().ok()?;

        let result = self.reader.lookup(ip_addr).ok()?;
        let country: maxminddb::geoip2::Country = result.decode().ok()??;

        let code = country.country.iso_code.map(String::from);
        debug!("GeoIP lookup for {}: {:?}", ip, code);
        code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_geoip_resolves_nothing() {
        assert_eq!(NullGeoIp.country_code("8.8.8.8"), None);
        assert_eq!(NullGeoIp.country_code("not-an-ip"), None);
    }
}
