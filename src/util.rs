use std::time::Duration;

use time_humanize::{Accuracy, HumanTime, Tense};

/// `m:ss` for a bounded countdown, `∞` for a free session.
pub fn format_countdown(remaining_secs: Option<u32>) -> String {
    match remaining_secs {
        Some(secs) => format!("{}:{:02}", secs / 60, secs % 60),
        None => "∞".to_string(),
    }
}

/// Whole elapsed seconds as `m:ss`; negative or non-finite input shows `0:00`.
pub fn format_elapsed(elapsed_secs: f64) -> String {
    let secs = if elapsed_secs.is_finite() && elapsed_secs > 0.0 {
        elapsed_secs.floor() as u32
    } else {
        0
    };
    format_countdown(Some(secs))
}

/// "5 minutes ago" style text for something that happened `age` in the past.
pub fn humanize_ago(age: Duration) -> String {
    if age < Duration::from_secs(10) {
        return "just now".to_string();
    }
    HumanTime::from(age).to_text_en(Accuracy::Rough, Tense::Past)
}
