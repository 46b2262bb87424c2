use std::fmt::Write;

use corvid_core::{
    AppViewModel, ChannelState, JobRowView, NoticeLevel, PageLink, SubscriptionRowView,
};

/// Full-screen text rendering of the view model.
pub fn render(view: &AppViewModel) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{}Corvid | {} | {}",
        view.title_annotation.as_deref().unwrap_or(""),
        view.status_line,
        channel_label(view.channel)
    );

    out.push_str("\nActive\n");
    if view.active.is_empty() {
        out.push_str("  (nothing downloading)\n");
    }
    for row in &view.active {
        let _ = writeln!(out, "  {}", format_job_row(row));
    }

    let filter = view.history_filter.map_or("all", |status| status.as_str());
    let _ = writeln!(
        out,
        "\nHistory [{filter}] {} total, page {}/{}",
        view.history_total,
        view.page,
        view.total_pages.max(1)
    );
    for row in &view.history {
        let _ = writeln!(out, "  {}", format_job_row(row));
    }
    let pager = format_page_links(&view.page_links);
    if !pager.is_empty() {
        let _ = writeln!(out, "  pages: {pager}");
    }

    if !view.subscriptions.is_empty() {
        out.push_str("\nSubscriptions\n");
        for row in &view.subscriptions {
            let _ = writeln!(out, "  {}", format_subscription_row(row));
        }
    }

    if !view.notices.is_empty() {
        out.push('\n');
        for notice in &view.notices {
            let marker = match notice.level {
                NoticeLevel::Info => "*",
                NoticeLevel::Error => "!",
            };
            let _ = writeln!(out, "{marker} {}", notice.text);
        }
        out.push_str("(type 'dismiss' to clear the oldest notice)\n");
    }

    out
}

fn channel_label(channel: ChannelState) -> &'static str {
    match channel {
        ChannelState::Connecting => "connecting...",
        ChannelState::Connected => "live",
        ChannelState::Disconnected => "offline, polling",
    }
}

fn format_job_row(row: &JobRowView) -> String {
    let mut line = format!("#{} {} [{}", row.job_id, row.title, row.status.as_str());
    if row.status.is_active() && row.progress > 0.0 {
        let _ = write!(line, " {:.1}%", row.progress);
    }
    line.push(']');
    if let Some(speed) = &row.speed {
        let _ = write!(line, " {speed}");
    }
    if let Some(eta) = &row.eta {
        let _ = write!(line, " eta {eta}");
    }
    if let Some(source) = &row.source {
        let _ = write!(line, " ({source})");
    }
    if let Some(detail) = &row.detail {
        let _ = write!(line, ": {detail}");
    }
    if row.retryable {
        line.push_str(" [retry]");
    }
    line
}

fn format_subscription_row(row: &SubscriptionRowView) -> String {
    let state = if row.enabled { "" } else { " (paused)" };
    let due = if row.overdue { "!" } else { "" };
    format!(
        "#{} {}{state} | next check {}{due} | {} videos",
        row.id, row.name, row.next_check, row.last_video_count
    )
}

fn format_page_links(links: &[PageLink]) -> String {
    links
        .iter()
        .map(|link| match link {
            PageLink::Page {
                number,
                current: true,
            } => format!("[{number}]"),
            PageLink::Page { number, .. } => number.to_string(),
            PageLink::Ellipsis => "...".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
