use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schedule::{estimate, ScheduleEstimate};
use crate::timestamp;

pub type SubscriptionId = u64;

/// Recurring watch on a channel or playlist URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub url: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_interval_hours")]
    pub check_interval_hours: u32,
    #[serde(default, with = "timestamp::option")]
    pub last_checked: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_video_count: u32,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub keep_last_n: Option<u32>,
    #[serde(default = "default_enabled")]
    pub include_members: bool,
    #[serde(default)]
    pub title_filter: Option<String>,
}

impl Subscription {
    pub fn schedule(&self, now: DateTime<Utc>) -> ScheduleEstimate {
        estimate(self.last_checked, self.check_interval_hours, self.enabled, now)
    }
}

fn default_enabled() -> bool {
    true
}

fn default_interval_hours() -> u32 {
    24
}

/// Body of `POST /subscriptions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewSubscription {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub check_interval_hours: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_last_n: Option<u32>,
    pub include_members: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_filter: Option<String>,
}

impl NewSubscription {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: None,
            check_interval_hours: default_interval_hours(),
            keep_last_n: None,
            include_members: true,
            title_filter: None,
        }
    }
}

/// Body of `PATCH /subscriptions/{id}`; only present fields are sent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SubscriptionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_interval_hours: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_last_n: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_members: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_filter: Option<String>,
}
