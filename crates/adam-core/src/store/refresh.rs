// ── Refresh cycle ──
//
// Fetch both bulk documents, swap in the new domain snapshot, then extract
// one reading per registered device. A bulk failure aborts the cycle before
// anything is touched; a per-device failure only marks that device.

use std::sync::Arc;

use adam_api::{Appliances, DomainObjects};
use chrono::Utc;
use tracing::{debug, error, trace, warn};

use super::{DataStore, Reading};

/// What a call to [`DataStore::refresh`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Throttled: the interval has not elapsed since the last refresh.
    Skipped,
    /// The bulk fetch failed; cached state is unchanged.
    Failed,
    /// Bulk data was applied. `failed` of `devices` readings could not be
    /// extracted.
    Completed { devices: usize, failed: usize },
}

impl DataStore {
    /// Refresh the cache from the gateway.
    ///
    /// Unless `force` is set, this is a no-op when less than the scan
    /// interval has passed since the last successful refresh. Failures are
    /// logged and contained; readers see stale or failed entries instead.
    pub async fn refresh(&self, force: bool) -> RefreshOutcome {
        if !force && !self.throttle.is_ready() {
            trace!("refresh throttled");
            return RefreshOutcome::Skipped;
        }

        let (appliances, domain) = match self.fetch_bulk().await {
            Ok(bulk) => bulk,
            Err(e) => {
                error!(error = %e, "unable to fetch data from the Plugwise gateway");
                return RefreshOutcome::Failed;
            }
        };
        debug!("device data collected from the Plugwise gateway");
        self.throttle.mark();

        self.domain.store(Arc::new(domain));
        let domain = self.domain.load_full();

        // Snapshot the registry so no map guard is held across an await.
        let registered: Vec<(String, String)> = self
            .devices
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect();

        let mut failed = 0;
        for (id, ctrl_id) in &registered {
            match self
                .api
                .get_device_data(&appliances, &domain, id, ctrl_id)
                .await
            {
                Ok(data) => {
                    self.data.insert(id.clone(), Reading::Fresh(Arc::new(data)));
                }
                Err(e) => {
                    warn!(device = %id, error = %e, "failed to read device data");
                    failed += 1;
                    let previous = self.get_data(id);
                    self.data.insert(id.clone(), previous.into_failed(e.to_string()));
                }
            }
        }

        self.last_refresh.send_replace(Some(Utc::now()));
        RefreshOutcome::Completed {
            devices: registered.len(),
            failed,
        }
    }

    async fn fetch_bulk(&self) -> Result<(Appliances, DomainObjects), adam_api::Error> {
        tokio::try_join!(self.api.get_appliances(), self.api.get_domain_objects())
    }
}
