//! Background cache maintenance
//!
//! Expired funding records and price pairs are only replaced on access, so
//! proposals nobody asks about would otherwise keep their entries forever.
//! The janitor drops them on a fixed interval together with uncontended
//! allocation locks.

use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::{
    configuration::{AppState, State},
    error::Error,
};

pub async fn cache_janitor_task(app_state: AppState<State>) -> Result<(), Error> {
    let period = app_state.config.cache_cleanup_interval;
    if period == 0 {
        return Err(Error::ConfigurationError(String::from(
            "CACHE_CLEANUP_INTERVAL must be positive",
        )));
    }

    info!("Starting cache janitor every {}s", period);

    // warm the price pair so the first page view does not pay for it
    let quote = app_state.reconciler.get_prices().await;
    if quote.is_empty() {
        info!("No market quotes available at startup");
    }

    let mut ticker = interval(Duration::from_secs(period));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let report = app_state.reconciler.cleanup().await;
        debug!(
            "Cache cleanup dropped {} funding, {} price entries and {} locks",
            report.funding, report.prices, report.locks
        );
    }
}
