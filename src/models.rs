use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
}

/// Weekdays use the 0=Sunday..6=Saturday numbering the settings UI stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReminderSettings {
    pub enabled: bool,
    pub time: NaiveTime,
    pub frequency: Frequency,
    pub days_of_week: BTreeSet<u8>,
    /// Last computed occurrence, kept so a restarted worker can tell an
    /// overdue reminder from one that is still pending.
    pub next_scheduled: Option<NaiveDateTime>,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            time: NaiveTime::from_hms_opt(20, 0, 0).expect("valid default time"),
            frequency: Frequency::Daily,
            days_of_week: BTreeSet::from([1, 3, 5]),
            next_scheduled: None,
        }
    }
}

impl ReminderSettings {
    pub fn is_valid(&self) -> bool {
        if self.days_of_week.iter().any(|day| *day > 6) {
            return false;
        }
        !(self.enabled && self.frequency == Frequency::Weekly && self.days_of_week.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Granted,
    Denied,
    #[default]
    Default,
}

/// Produced whenever a notification is shown; replayed to the foreground
/// through the events endpoint when no live listener saw it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryEvent {
    pub title: String,
    pub body: String,
    pub timestamp: NaiveDateTime,
}

/// The single persisted record shared by the foreground and the worker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoredState {
    pub settings: ReminderSettings,
    pub pending_events: Vec<DeliveryEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    pub enabled: bool,
    pub time: NaiveTime,
    pub frequency: Frequency,
    #[serde(default)]
    pub days_of_week: BTreeSet<u8>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderStatusResponse {
    pub settings: ReminderSettings,
    pub permission: Permission,
    pub next_occurrence: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_match_first_run() {
        let settings = ReminderSettings::default();
        assert!(!settings.enabled);
        assert_eq!(settings.time, NaiveTime::from_hms_opt(20, 0, 0).unwrap());
        assert_eq!(settings.frequency, Frequency::Daily);
        assert_eq!(settings.days_of_week, BTreeSet::from([1, 3, 5]));
        assert!(settings.next_scheduled.is_none());
    }

    #[test]
    fn settings_serialize_with_camel_case_keys() {
        let json = serde_json::to_value(ReminderSettings::default()).unwrap();
        assert_eq!(json["enabled"], false);
        assert_eq!(json["time"], "20:00:00");
        assert_eq!(json["frequency"], "daily");
        assert_eq!(json["daysOfWeek"], serde_json::json!([1, 3, 5]));
    }

    #[test]
    fn weekly_enabled_without_days_is_invalid() {
        let settings = ReminderSettings {
            enabled: true,
            frequency: Frequency::Weekly,
            days_of_week: BTreeSet::new(),
            ..ReminderSettings::default()
        };
        assert!(!settings.is_valid());
    }

    #[test]
    fn out_of_range_weekday_is_invalid() {
        let settings = ReminderSettings {
            days_of_week: BTreeSet::from([2, 7]),
            ..ReminderSettings::default()
        };
        assert!(!settings.is_valid());
    }
}
