use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEstimate {
    pub label: String,
    pub overdue: bool,
    /// Only set when the subscription is enabled and has been checked before.
    pub next_check: Option<DateTime<Utc>>,
}

/// Time until a subscription's next check.
///
/// Pure: `now` is supplied by the caller.
pub fn estimate(
    last_checked: Option<DateTime<Utc>>,
    interval_hours: u32,
    enabled: bool,
    now: DateTime<Utc>,
) -> ScheduleEstimate {
    if !enabled {
        return ScheduleEstimate {
            label: "Paused".to_string(),
            overdue: false,
            next_check: None,
        };
    }
    let Some(last_checked) = last_checked else {
        return ScheduleEstimate {
            label: "Pending".to_string(),
            overdue: false,
            next_check: None,
        };
    };

    // An interval past chrono's range never comes due.
    let Some(next_check) =
        last_checked.checked_add_signed(Duration::hours(i64::from(interval_hours)))
    else {
        return ScheduleEstimate {
            label: "Not scheduled".to_string(),
            overdue: false,
            next_check: None,
        };
    };
    if next_check <= now {
        return ScheduleEstimate {
            label: "Due now".to_string(),
            overdue: true,
            next_check: Some(next_check),
        };
    }

    ScheduleEstimate {
        label: humanize_remaining(next_check - now),
        overdue: false,
        next_check: Some(next_check),
    }
}

fn humanize_remaining(remaining: Duration) -> String {
    // Anything still ahead reads as at least a minute.
    let minutes = remaining.num_minutes().max(1);
    let hours = minutes / 60;
    if hours > 0 {
        format!("in {}h {}m", hours, minutes % 60)
    } else {
        format!("in {minutes}m")
    }
}
