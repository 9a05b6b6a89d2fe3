//! Background worker draining the click-event channel.
//!
//! For each event the worker performs two independent writes: the atomic
//! click-counter increment on the link row and the click-log append. Each is
//! retried with exponential backoff; a write that still fails after the last
//! attempt is logged and counted, never propagated to the redirect path.
//! The two writes are deliberately not transactional; a discrepancy between
//! counter and log is logged instead.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, error};

use crate::domain::click_event::ClickEvent;
use crate::domain::entities::NewClick;
use crate::domain::repositories::{LinkRepository, StatsRepository};
use crate::infrastructure::geoip::GeoIp;

fn retry_strategy() -> impl Iterator<Item = std::time::Duration> {
    ExponentialBackoff::from_millis(50).factor(2).map(jitter).take(4)
}

/// Runs until the sending side of `rx` is dropped.
pub async fn run_click_worker(
    mut rx: mpsc::Receiver<ClickEvent>,
    links: Arc<dyn LinkRepository>,
    stats: Arc<dyn StatsRepository>,
    geoip: Arc<dyn GeoIp>,
) {
    while let Some(event) = rx.recv().await {
        process_click(&event, links.as_ref(), stats.as_ref(), geoip.as_ref()).await;
    }

    debug!("click channel closed, worker exiting");
}

async fn process_click(
    event: &ClickEvent,
    links: &dyn LinkRepository,
    stats: &dyn StatsRepository,
    geoip: &dyn GeoIp,
) {
    let country_code = event.ip.as_deref().and_then(|ip| geoip.country_code(ip));

    let increment = Retry::spawn(retry_strategy(), || {
        links.increment_clicks(&event.keyword, 1)
    })
    .await;

    match increment {
        Ok(true) => {}
        Ok(false) => {
            // Link vanished between redirect and increment (renamed away).
            debug!(keyword = %event.keyword, "click increment skipped, keyword gone");
        }
        Err(e) => {
            metrics::counter!("clicks_increment_failed").increment(1);
            error!(keyword = %event.keyword, error = %e, "click increment failed after retries");
        }
    }

    let new_click = NewClick {
        keyword: event.keyword.clone(),
        referrer: event.referrer.clone(),
        user_agent: event.user_agent.clone(),
        ip: event.ip.clone(),
        country_code,
    };

    let logged = Retry::spawn(retry_strategy(), || stats.record_click(new_click.clone())).await;

    match logged {
        Ok(_) => {
            metrics::counter!("clicks_recorded").increment(1);
        }
        Err(e) => {
            metrics::counter!("clicks_log_failed").increment(1);
            error!(keyword = %event.keyword, error = %e, "click log append failed after retries");
        }
    }
}
