//! Deterministic export file names.

use chrono::{DateTime, SecondsFormat, Utc};

/// Tag used for whole-session exports.
pub const AGGREGATED_TAG: &str = "aggregated";

/// Collapse every whitespace run to a single underscore.
fn underscored(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join("_")
}

/// ISO-8601 timestamp with `:` and `.` replaced so it is safe in file names.
pub fn file_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-")
}

/// `{participant}_{tag}_summary.csv`
pub fn summary_filename(participant: &str, tag: &str) -> String {
    format!("{}_{}_summary.csv", underscored(participant), tag)
}

/// `{participant}_{tag}_responses_{timestamp}.json`
pub fn responses_filename(participant: &str, tag: &str, at: DateTime<Utc>) -> String {
    format!(
        "{}_{}_responses_{}.json",
        underscored(participant),
        tag,
        file_timestamp(at)
    )
}

/// `{participant}_{title}_{task}_responses_{timestamp}.{extension}`; the
/// task segment is omitted when the task is blank.
pub fn form_filename(
    participant: &str,
    title: &str,
    task: &str,
    at: DateTime<Utc>,
    extension: &str,
) -> String {
    let mut parts = vec![underscored(participant), underscored(title)];
    if !task.trim().is_empty() {
        parts.push(underscored(task));
    }
    format!(
        "{}_responses_{}.{}",
        parts.join("_"),
        file_timestamp(at),
        extension
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap() + chrono::Duration::milliseconds(589)
    }

    #[test]
    fn timestamp_is_filename_safe() {
        assert_eq!(file_timestamp(at()), "2025-03-14T09-26-53-589Z");
    }

    #[test]
    fn summary_names() {
        assert_eq!(
            summary_filename("Jane  Q Doe", "CSQVR"),
            "Jane_Q_Doe_CSQVR_summary.csv"
        );
        assert_eq!(
            summary_filename("P1", AGGREGATED_TAG),
            "P1_aggregated_summary.csv"
        );
    }

    #[test]
    fn responses_name() {
        assert_eq!(
            responses_filename("John Doe", AGGREGATED_TAG, at()),
            "John_Doe_aggregated_responses_2025-03-14T09-26-53-589Z.json"
        );
    }

    #[test]
    fn form_name_skips_blank_task() {
        assert_eq!(
            form_filename("John Doe", "NASA TLX", "Auto run", at(), "json"),
            "John_Doe_NASA_TLX_Auto_run_responses_2025-03-14T09-26-53-589Z.json"
        );
        assert_eq!(
            form_filename("John Doe", "Usability", " ", at(), "csv"),
            "John_Doe_Usability_responses_2025-03-14T09-26-53-589Z.csv"
        );
    }
}
