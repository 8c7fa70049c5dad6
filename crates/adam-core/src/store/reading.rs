use std::sync::Arc;

use adam_api::DeviceData;
use serde::Serialize;

/// What the cache holds for one device.
///
/// Reads never fail: a device that was never fetched reads as
/// [`Reading::NoData`], so consumers can render "unavailable" without
/// error handling on every access.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Reading {
    /// Never successfully fetched (or not registered at all).
    #[default]
    NoData,
    /// Fetched during the most recent refresh.
    Fresh(Arc<DeviceData>),
    /// The most recent per-device fetch failed. The last good reading, if
    /// any, is kept alongside the error.
    Failed {
        error: String,
        last_known: Option<Arc<DeviceData>>,
    },
}

impl Reading {
    /// `true` only for a reading fetched in the latest refresh.
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Fresh(_))
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Best known data: the fresh reading, or the last good one after a
    /// failure.
    pub fn latest(&self) -> Option<&Arc<DeviceData>> {
        match self {
            Self::NoData => None,
            Self::Fresh(data) => Some(data),
            Self::Failed { last_known, .. } => last_known.as_ref(),
        }
    }

    /// Mark this entry failed, keeping whatever data it had.
    pub(crate) fn into_failed(self, error: String) -> Self {
        Self::Failed {
            error,
            last_known: self.latest().cloned(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn data(temp: f64) -> Arc<DeviceData> {
        Arc::new(DeviceData {
            current_temperature: Some(temp),
            ..DeviceData::default()
        })
    }

    #[test]
    fn default_is_no_data() {
        let reading = Reading::default();
        assert!(reading.is_no_data());
        assert!(reading.latest().is_none());
    }

    #[test]
    fn failing_a_fresh_reading_keeps_it() {
        let failed = Reading::Fresh(data(20.0)).into_failed("boom".into());
        assert!(failed.is_failed());
        assert!(!failed.is_available());
        assert_eq!(failed.latest().unwrap().current_temperature, Some(20.0));
    }

    #[test]
    fn failing_twice_keeps_original_data() {
        let failed = Reading::Fresh(data(18.5))
            .into_failed("one".into())
            .into_failed("two".into());
        match failed {
            Reading::Failed { error, last_known } => {
                assert_eq!(error, "two");
                assert_eq!(last_known.unwrap().current_temperature, Some(18.5));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn failing_no_data_has_nothing_to_keep() {
        let failed = Reading::NoData.into_failed("boom".into());
        assert!(failed.is_failed());
        assert!(failed.latest().is_none());
    }

    #[test]
    fn serializes_with_status_tag() {
        let json = serde_json::to_value(Reading::NoData).unwrap();
        assert_eq!(json["status"], "no_data");

        let json = serde_json::to_value(Reading::Fresh(data(21.0))).unwrap();
        assert_eq!(json["status"], "fresh");
        assert_eq!(json["current_temperature"], 21.0);
    }
}
