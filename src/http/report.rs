//! Day report rendering for `GET /dayReport`.
//!
//! Four day-bucketed queries rendered through an `askama` template.

use askama::Template;
use chrono::{DateTime, NaiveDate, Utc};

use crate::error::GatewayError;
use crate::store::{Message, MessageStatus, MessageStore};

#[derive(Template)]
#[template(path = "day_report.txt")]
pub struct DayReportTemplate {
    pub date: String,
    pub delivered: Vec<Message>,
    pub sent: Vec<Message>,
    pub queued: Vec<Message>,
    pub errored: Vec<Message>,
}

/// Parses a `YYYY-MM-DD` query parameter into the start of that UTC day;
/// `None` (missing `date`) defaults to the current UTC day, mirroring the
/// original's behavior.
pub fn parse_report_date(date: Option<&str>) -> Result<DateTime<Utc>, GatewayError> {
    let naive = match date {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|e| GatewayError::Validation(format!("invalid date '{s}': {e}")))?,
        None => Utc::now().date_naive(),
    };
    Ok(DateTime::from_naive_utc_and_offset(
        naive.and_hms_opt(0, 0, 0).unwrap(),
        Utc,
    ))
}

/// Runs the four day-bucketed queries and renders the plain-text report.
pub async fn render_day_report<S: MessageStore>(
    store: &S,
    day: DateTime<Utc>,
) -> Result<String, GatewayError> {
    let delivered = store.select_for_day(day, MessageStatus::Delivered).await?;
    let sent = store.select_for_day(day, MessageStatus::Sent).await?;
    let queued = store.select_for_day(day, MessageStatus::New).await?;
    let errored = store.select_for_day(day, MessageStatus::Errored).await?;

    let template = DayReportTemplate {
        date: day.format("%Y-%m-%d").to_string(),
        delivered,
        sent,
        queued,
        errored,
    };
    template
        .render()
        .map_err(|e| GatewayError::Validation(format!("template render failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryMessageStore;

    #[test]
    fn missing_date_defaults_to_today() {
        let day = parse_report_date(None).unwrap();
        assert_eq!(day, Utc::now().date_naive().and_hms_opt(0, 0, 0).unwrap().and_utc());
    }

    #[test]
    fn parses_explicit_date() {
        let day = parse_report_date(Some("2026-01-15")).unwrap();
        assert_eq!(day.format("%Y-%m-%d").to_string(), "2026-01-15");
    }

    #[test]
    fn rejects_malformed_date() {
        assert!(parse_report_date(Some("not-a-date")).is_err());
    }

    #[tokio::test]
    async fn renders_all_four_buckets() {
        let store = InMemoryMessageStore::new();
        store.insert("ACME", "+71234567890", "hi").await.unwrap();
        let day = parse_report_date(None).unwrap();
        let report = render_day_report(&store, day).await.unwrap();
        assert!(report.contains("Queued (1)"));
        assert!(report.contains("Delivered (0)"));
    }
}
