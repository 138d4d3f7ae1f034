use std::str::FromStr;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Address the HTTP server should bind to. Defaults to `0.0.0.0`.
pub static BIND_ADDRESS: Lazy<String> =
    Lazy::new(|| read_optional_env("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0".to_string()));

/// Port the HTTP server should listen on. Defaults to `8080`.
pub static BIND_PORT: Lazy<u16> = Lazy::new(|| {
    read_optional_env("BIND_PORT")
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080)
});

/// Base URL of the booking portal. `/api/bookings` is appended to it.
pub static BOOKING_PORTAL_BASE_URL: Lazy<String> = Lazy::new(|| {
    read_optional_env("BOOKING_PORTAL_BASE_URL")
        .unwrap_or_else(|| "http://localhost:9292".to_string())
});

/// Connect and response timeout for the booking portal, in milliseconds.
/// Defaults to `5000`.
pub static BOOKING_PORTAL_TIMEOUT_MS: Lazy<u64> =
    Lazy::new(|| parse_timeout_ms(read_optional_env("BOOKING_PORTAL_TIMEOUT_MS").as_deref()));

/// Amount received above which a payment is flagged. Defaults to `100000000`.
pub static QUALITY_AMOUNT_THRESHOLD: Lazy<Decimal> =
    Lazy::new(|| parse_threshold(read_optional_env("QUALITY_AMOUNT_THRESHOLD").as_deref()));

pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_AMOUNT_THRESHOLD: Decimal = dec!(100000000);
/// An `@` with a `.` somewhere after it, line breaks included.
pub const CONTACT_ADDRESS_PATTERN: &str = r"(?s)@.*\.";

pub fn booking_portal_timeout() -> Duration {
    Duration::from_millis(*BOOKING_PORTAL_TIMEOUT_MS)
}

/// Rules the quality annotator applies. Built once at startup and handed to
/// the annotator by value.
#[derive(Debug, Clone)]
pub struct QualityRules {
    pub amount_threshold: Decimal,
    pub contact_pattern: Regex,
}

impl QualityRules {
    pub fn from_env() -> Self {
        Self {
            amount_threshold: *QUALITY_AMOUNT_THRESHOLD,
            ..Self::default()
        }
    }
}

impl Default for QualityRules {
    fn default() -> Self {
        Self {
            amount_threshold: DEFAULT_AMOUNT_THRESHOLD,
            contact_pattern: Regex::new(CONTACT_ADDRESS_PATTERN)
                .expect("contact address pattern compiles"),
        }
    }
}

fn read_optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_timeout_ms(raw: Option<&str>) -> u64 {
    raw.and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_TIMEOUT_MS)
}

fn parse_threshold(raw: Option<&str>) -> Decimal {
    raw.and_then(|value| Decimal::from_str(value).ok())
        .filter(|value| !value.is_sign_negative())
        .unwrap_or(DEFAULT_AMOUNT_THRESHOLD)
}
