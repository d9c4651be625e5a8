//! Snapshot persistence for [`TripAlertManager`].
//!
//! On-disk format:
//!
//! ```json
//! {
//!   "trip_start": "2025-06-01T00:00:00",
//!   "trip_end": "2025-06-07T00:00:00",
//!   "alerts": [
//!     {
//!       "id": "…",
//!       "title": "Start Trip Planning",
//!       "description": "…",
//!       "date": "2025-05-02T00:00:00",
//!       "alert_type": "preparation",
//!       "priority": "high",
//!       "acknowledged": false
//!     }
//!   ]
//! }
//! ```
//!
//! `id` is optional on input; snapshots without it get fresh ids.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use itinera_store::SnapshotStore;

use super::{Alert, AlertError, TripAlertManager};

/// Complete serialisable state of one trip's alert timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertSnapshot {
    pub trip_start: NaiveDateTime,
    pub trip_end: NaiveDateTime,
    pub alerts: Vec<Alert>,
}

impl TripAlertManager {
    /// Capture the trip range and every alert, acknowledgement included.
    pub fn snapshot(&self) -> AlertSnapshot {
        AlertSnapshot {
            trip_start: self.trip_start,
            trip_end: self.trip_end,
            alerts: self.alerts.clone(),
        }
    }

    /// Rebuild a manager from a snapshot.
    ///
    /// The alert list is re-sorted (stably) so hand-edited snapshots still
    /// satisfy the timeline ordering.
    pub fn from_snapshot(snapshot: AlertSnapshot) -> Result<Self, AlertError> {
        let mut manager = Self::new(snapshot.trip_start, snapshot.trip_end)?;
        manager.alerts = snapshot.alerts;
        manager.alerts.sort_by_key(|a| a.timestamp);
        Ok(manager)
    }

    pub fn to_json(&self) -> Result<String, AlertError> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }

    /// Parse a snapshot. Malformed JSON, missing fields, unknown alert kinds
    /// or priorities, and an inverted trip range are all rejected.
    pub fn from_json(json: &str) -> Result<Self, AlertError> {
        let snapshot: AlertSnapshot = serde_json::from_str(json)?;
        Self::from_snapshot(snapshot)
    }

    /// Persist the full snapshot under `key`, replacing any previous one.
    pub fn save(&self, store: &dyn SnapshotStore, key: &str) -> Result<(), AlertError> {
        store.put(key, &self.to_json()?)?;
        debug!(key, alerts = self.alerts.len(), "alert snapshot saved");
        Ok(())
    }

    /// Restore a manager previously saved under `key`.
    ///
    /// Booking lead time and the upcoming window are not part of the
    /// snapshot and reset to their defaults; apply settings again with
    /// [`TripAlertManager::with_settings`].
    pub fn load(store: &dyn SnapshotStore, key: &str) -> Result<Self, AlertError> {
        let manager = Self::from_json(&store.get(key)?)?;
        debug!(key, alerts = manager.alerts.len(), "alert snapshot loaded");
        Ok(manager)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use itinera_store::{MemoryStore, StoreError};

    use super::*;
    use crate::alerts::{AlertKind, Priority};

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn populated() -> TripAlertManager {
        let mut m = TripAlertManager::new(at(1, 0), at(7, 0)).unwrap();
        m.add_alert("Pack", "Bring sunscreen", at(1, 8), AlertKind::Preparation, Priority::High);
        let id = m.add_alert("Tour", "Old town", at(2, 12), AlertKind::Activity, Priority::Normal);
        m.acknowledge_alert(id);
        m
    }

    #[test]
    fn json_round_trip_preserves_everything() {
        let original = populated();
        let restored = TripAlertManager::from_json(&original.to_json().unwrap()).unwrap();
        assert_eq!(restored, original);
        assert!(restored.alerts()[1].is_acknowledged());
    }

    #[test]
    fn serialized_field_names() {
        let json: serde_json::Value =
            serde_json::from_str(&populated().to_json().unwrap()).unwrap();
        assert_eq!(json["trip_start"], "2025-06-01T00:00:00");
        let alert = &json["alerts"][0];
        assert_eq!(alert["date"], "2025-06-01T08:00:00");
        assert_eq!(alert["alert_type"], "preparation");
        assert_eq!(alert["priority"], "high");
        assert_eq!(alert["acknowledged"], false);
    }

    #[test]
    fn loads_snapshot_without_ids() {
        let json = r#"{
            "trip_start": "2025-06-01T00:00:00",
            "trip_end": "2025-06-03T00:00:00",
            "alerts": [
                {"title": "B", "description": "", "date": "2025-06-02T12:00:00",
                 "alert_type": "activity", "priority": "normal", "acknowledged": true},
                {"title": "A", "description": "", "date": "2025-05-01T00:00:00",
                 "alert_type": "booking_deadline", "priority": "high", "acknowledged": false}
            ]
        }"#;
        let m = TripAlertManager::from_json(json).unwrap();
        let titles: Vec<&str> = m.alerts().iter().map(|a| a.title()).collect();
        assert_eq!(titles, vec!["A", "B"]);
        assert_ne!(m.alerts()[0].id(), m.alerts()[1].id());
        assert!(m.alerts()[1].is_acknowledged());
    }

    #[test]
    fn rejects_malformed_snapshots() {
        let cases = [
            "not json",
            r#"{"trip_start": "2025-06-01T00:00:00", "alerts": []}"#,
            r#"{"trip_start": "2025-06-01T00:00:00", "trip_end": "2025-06-02T00:00:00",
                "alerts": [{"title": "x", "description": "", "date": "2025-06-01T00:00:00",
                            "alert_type": "party", "priority": "high", "acknowledged": false}]}"#,
            r#"{"trip_start": "2025-06-01T00:00:00", "trip_end": "2025-06-02T00:00:00",
                "alerts": [{"title": "x", "description": "", "date": "2025-06-01T00:00:00",
                            "alert_type": "activity", "priority": "high"}]}"#,
            r#"{"trip_start": "yesterday", "trip_end": "2025-06-02T00:00:00", "alerts": []}"#,
        ];
        for json in cases {
            let err = TripAlertManager::from_json(json).unwrap_err();
            assert!(matches!(err, AlertError::Format(_)), "expected Format for {json}, got: {err}");
        }
    }

    #[test]
    fn rejects_inverted_range_in_snapshot() {
        let json = r#"{"trip_start": "2025-06-09T00:00:00", "trip_end": "2025-06-02T00:00:00", "alerts": []}"#;
        assert!(matches!(
            TripAlertManager::from_json(json),
            Err(AlertError::InvalidTripRange { .. })
        ));
    }

    #[test]
    fn save_and_load_through_store() {
        let store = MemoryStore::new();
        let original = populated();
        original.save(&store, "lisbon").unwrap();
        let restored = TripAlertManager::load(&store, "lisbon").unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn load_missing_key_reports_store_error() {
        let store = MemoryStore::new();
        let err = TripAlertManager::load(&store, "nowhere").unwrap_err();
        assert!(
            matches!(err, AlertError::Store(StoreError::NotFound(_))),
            "got: {err}"
        );
    }
}
