//! Free-form reply interpretation
//!
//! Everything that reads the assistant's natural language lives here, so
//! the feeding loop only ever sees [`StatusReply`] and [`QuotaWait`]. All
//! matching is case-insensitive and ignores surrounding text. When nothing
//! matches, the documented fallback is returned and a warning is logged.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

/// Wait used when no duration can be found in a quota message (3 hours)
pub const DEFAULT_QUOTA_WAIT_SECS: u64 = 3 * 3600;

/// Classification of a reply to the status probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusReply {
    HasMoreWork,
    NoMoreWork,
    Unrecognized,
}

impl StatusReply {
    /// Whether the loop should keep the assistant going
    ///
    /// Unrecognized replies keep it going: stopping early is worse than an
    /// extra `continue`.
    pub fn should_continue(self) -> bool {
        !matches!(self, StatusReply::NoMoreWork)
    }
}

/// How a [`QuotaWait`] was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitSource {
    Parsed,
    Fallback,
}

/// Delay before the assistant's quota resets; always at least one second
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaWait {
    pub seconds: u64,
    pub source: WaitSource,
}

#[derive(Debug, Clone, Copy)]
enum Unit {
    Hours,
    Minutes,
}

impl Unit {
    fn seconds(self) -> u64 {
        match self {
            Unit::Hours => 3600,
            Unit::Minutes => 60,
        }
    }
}

/// Duration patterns, tried in order; the first match wins
static WAIT_PATTERNS: LazyLock<Vec<(Regex, Unit)>> = LazyLock::new(|| {
    [
        (r"(?i)limits reset in (\d+) hours?", Unit::Hours),
        (r"(?i)quota resets? in (\d+) hours?", Unit::Hours),
        (r"(?i)try again in (\d+) hours?", Unit::Hours),
        (r"(?i)limits reset in (\d+) minutes?", Unit::Minutes),
        (r"(?i)quota resets? in (\d+) minutes?", Unit::Minutes),
        (r"(?i)try again in (\d+) minutes?", Unit::Minutes),
    ]
    .into_iter()
    .map(|(pattern, unit)| (Regex::new(pattern).expect("valid wait pattern"), unit))
    .collect()
});

static QUOTA_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(usage limit|limit reached|limits? resets?|quota (?:resets?|exceeded|exhausted)|try again in)\b",
    )
    .expect("valid quota pattern")
});

/// Extract the quota wait from a message such as "limits reset in 2 hours"
///
/// Falls back to `fallback_secs` (logged) when no duration is found.
pub fn extract_wait_seconds(text: &str, fallback_secs: u64) -> QuotaWait {
    debug!(text_len = text.len(), fallback_secs, "extract_wait_seconds: called");
    for (pattern, unit) in WAIT_PATTERNS.iter() {
        let Some(caps) = pattern.captures(text) else {
            continue;
        };
        let Ok(value) = caps[1].parse::<u64>() else {
            debug!(value = &caps[1], "extract_wait_seconds: value out of range, skipping");
            continue;
        };
        let seconds = value.saturating_mul(unit.seconds()).max(1);
        debug!(value, ?unit, seconds, "extract_wait_seconds: matched");
        return QuotaWait {
            seconds,
            source: WaitSource::Parsed,
        };
    }

    warn!(
        "Could not parse quota reset time, defaulting to {} seconds",
        fallback_secs
    );
    QuotaWait {
        seconds: fallback_secs.max(1),
        source: WaitSource::Fallback,
    }
}

/// Classify a reply to the status probe: "yes", "no", or anything else
pub fn extract_status_reply(text: &str) -> StatusReply {
    let answer = text.trim().to_lowercase();
    let reply = match answer.as_str() {
        "yes" => StatusReply::HasMoreWork,
        "no" => StatusReply::NoMoreWork,
        _ => StatusReply::Unrecognized,
    };
    debug!(%answer, ?reply, "extract_status_reply: called");
    reply
}

/// Whether the text describes quota or usage-limit exhaustion
pub fn is_quota_exhausted(text: &str) -> bool {
    let exhausted = QUOTA_PATTERN.is_match(text);
    debug!(text_len = text.len(), exhausted, "is_quota_exhausted: called");
    exhausted
}
