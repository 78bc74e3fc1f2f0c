//! DNS resolution (reverse) and geolocation collectors. Both are pure
//! cache-layer operations: there's no dedicated time-series table for
//! either, just the `dns_cache`/`geo_cache` keyed tables, read through
//! single-flight coalescing so that the network collector's top-N lookups
//! and the glacial-tier sweep never issue duplicate external calls for the
//! same IP within the TTL window.

use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::cache::{self, Lookup};
use crate::collectors::{Collector, CollectorContext, CollectorOutcome, Tier};
use crate::common::now_secs;
use crate::runner;
use crate::store::{DnsCacheRow, GeoCacheRow};

const HTTP_TIMEOUT: Duration = Duration::from_secs(5);
const DNS_TIMEOUT: Duration = Duration::from_secs(5);

/// Resolves `ip` to a hostname, writing through `dns_cache`. Coalesces
/// concurrent callers for the same IP via the context's single-flight
/// registry; a fresh or stale-but-present cache entry short-circuits the
/// actual reverse lookup.
pub async fn resolve_dns(ctx: &CollectorContext, ip: &str) -> Result<()> {
    let existing = ctx.store.get_dns_cache(ip)?;
    let fresh = existing
        .as_ref()
        .map(|row| cache::lookup(Some(()), row.resolved_at, cache::DNS_TTL_SECS))
        .unwrap_or(Lookup::Miss);

    if matches!(fresh, Lookup::Fresh(())) {
        return Ok(());
    }

    let key = format!("dns:{ip}");
    let ip_owned = ip.to_string();
    let store = ctx.store.clone();
    ctx.single_flight
        .run(
            &key,
            {
                let store = store.clone();
                let ip_owned = ip_owned.clone();
                move || {
                    Ok(store
                        .get_dns_cache(&ip_owned)?
                        .filter(|row| now_secs() - row.resolved_at <= cache::DNS_TTL_SECS)
                        .map(|_| ()))
                }
            },
            move || {
                let store = store.clone();
                let ip_owned = ip_owned.clone();
                async move {
                    let hostname = reverse_lookup(&ip_owned).await.unwrap_or_else(|| ip_owned.clone());
                    store.put_dns_cache(&DnsCacheRow {
                        ip: ip_owned,
                        hostname,
                        resolved_at: now_secs(),
                    })?;
                    Ok(())
                }
            },
        )
        .await?;

    Ok(())
}

async fn reverse_lookup(ip: &str) -> Option<String> {
    let result = runner::run(&["host", ip], DNS_TIMEOUT).await;
    if result.outcome != runner::Outcome::Ok {
        return None;
    }
    crate::parsers::parse_host_ptr(&result.stdout)
}

#[derive(Deserialize)]
struct IpApiResponse {
    status: Option<String>,
    #[serde(rename = "countryCode")]
    country_code: Option<String>,
    city: Option<String>,
    isp: Option<String>,
}

#[derive(Deserialize)]
struct IpInfoResponse {
    country: Option<String>,
    city: Option<String>,
    org: Option<String>,
}

/// Geolocates `ip` via `ip-api.com`, falling back to `ipinfo.io` on failure.
/// Writes through `geo_cache`. The global rate limiter ensures this never
/// issues more than one request per second across every caller.
pub async fn resolve_geo(ctx: &CollectorContext, ip: &str) -> Result<()> {
    if let Some(existing) = ctx.store.get_geo_cache(ip)? {
        if now_secs() - existing.resolved_at <= cache::GEO_TTL_SECS {
            return Ok(());
        }
    }

    ctx.geo_rate_limiter.wait().await;

    let row = match fetch_ip_api(&ctx.http, ip).await {
        Ok(row) => row,
        Err(_) => fetch_ip_info(&ctx.http, ip).await?,
    };

    ctx.store.put_geo_cache(&row)?;
    Ok(())
}

async fn fetch_ip_api(client: &reqwest::Client, ip: &str) -> Result<GeoCacheRow> {
    let url = format!("http://ip-api.com/json/{ip}?fields=status,country,countryCode,city,isp");
    let response: IpApiResponse = client.get(&url).timeout(HTTP_TIMEOUT).send().await?.json().await?;
    if response.status.as_deref() != Some("success") {
        return Err(anyhow!("ip-api.com returned non-success status"));
    }
    Ok(GeoCacheRow {
        ip: ip.to_string(),
        country_code: response.country_code,
        city: response.city,
        isp: response.isp,
        resolved_at: now_secs(),
    })
}

async fn fetch_ip_info(client: &reqwest::Client, ip: &str) -> Result<GeoCacheRow> {
    let url = format!("https://ipinfo.io/{ip}/json");
    let response: IpInfoResponse = client.get(&url).timeout(HTTP_TIMEOUT).send().await?.json().await?;
    Ok(GeoCacheRow {
        ip: ip.to_string(),
        country_code: response.country,
        city: response.city,
        isp: response.org,
        resolved_at: now_secs(),
    })
}

/// Background DNS refresh: the network collector (medium tier) resolves
/// newly-seen peers inline, but entries left long enough to age past their
/// TTL would otherwise only get refreshed the next time that peer
/// reconnects. This glacial-tier sweep catches those proactively so the
/// Network panel's hostname column doesn't go stale for persistent peers.
pub struct DnsResolutionCollector;

#[async_trait]
impl Collector for DnsResolutionCollector {
    fn name(&self) -> &'static str {
        "dns_resolution"
    }

    fn tier(&self) -> Tier {
        Tier::Glacial
    }

    async fn run(&self, ctx: &CollectorContext) -> CollectorOutcome {
        let stale = match ctx.store.stale_dns_cache_ips(now_secs(), cache::DNS_TTL_SECS) {
            Ok(ips) => ips,
            Err(e) => return CollectorOutcome::Failed { error: e.to_string() },
        };

        if stale.is_empty() {
            return CollectorOutcome::Ok;
        }

        let mut last_err = None;
        for ip in &stale {
            if let Err(e) = resolve_dns(ctx, ip).await {
                last_err = Some(e);
            }
        }

        match last_err {
            Some(e) => CollectorOutcome::Degraded {
                reason: format!("some stale DNS entries failed to refresh: {e}"),
            },
            None => CollectorOutcome::Ok,
        }
    }
}

/// Refreshes `geo_cache` rows whose TTL has expired for IPs we've already
/// seen attack traffic from (the same set the attacker-nmap collector
/// targets), keeping the Security panel's country-code column populated.
pub struct GeolocationCollector;

#[async_trait]
impl Collector for GeolocationCollector {
    fn name(&self) -> &'static str {
        "geolocation"
    }

    fn tier(&self) -> Tier {
        Tier::Glacial
    }

    async fn run(&self, ctx: &CollectorContext) -> CollectorOutcome {
        let ips = match crate::collectors::attacker_nmap::top_failed_login_ips(ctx, 3) {
            Ok(ips) => ips,
            Err(e) => return CollectorOutcome::Failed { error: e.to_string() },
        };

        if ips.is_empty() {
            return CollectorOutcome::Ok;
        }

        let mut last_err = None;
        for ip in &ips {
            if let Err(e) = resolve_geo(ctx, ip).await {
                last_err = Some(e);
            }
        }

        match last_err {
            Some(e) => CollectorOutcome::Degraded {
                reason: format!("some geo lookups failed: {e}"),
            },
            None => CollectorOutcome::Ok,
        }
    }
}
