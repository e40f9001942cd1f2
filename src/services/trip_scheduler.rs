//! Background auto-start timer

use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use crate::services::trip_lifecycle_service::TripLifecycleService;

/// Runs the auto-start sweep every `every` until the handle is aborted.
///
/// A failed sweep is logged and the next tick proceeds normally.
pub fn spawn_auto_start(service: TripLifecycleService, every: Duration) -> JoinHandle<()> {
    info!("⏱️ Auto-start sweep every {:?}", every);

    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            if let Err(e) = service.auto_start_due_trips(Utc::now()).await {
                error!("❌ Auto-start sweep failed: {}", e);
            }
        }
    })
}
