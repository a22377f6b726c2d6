//! UTC calendar dates without timezone dependencies.
//!
//! Provides a lightweight `DateTimeUtc` struct, used to stamp build packages.
//!
//! # Examples
//!
//! ```ignore
//! let dt = DateTimeUtc::from_unix(1_718_461_845);
//! assert_eq!((dt.year, dt.month, dt.day), (2024, 6, 15));
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

const SECS_PER_DAY: u64 = 86_400;

/// UTC datetime without timezone complexity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTimeUtc {
    pub year: u16,
    /// Calendar month, 1-12
    pub month: u8,
    pub day: u8,
    /// Seconds since the unix epoch
    pub unix: u64,
}

impl DateTimeUtc {
    /// Convert seconds since the unix epoch into a civil UTC datetime.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub fn from_unix(unix: u64) -> Self {
        let days = (unix / SECS_PER_DAY) as i64;

        // Days-to-civil conversion over 400-year eras
        let z = days + 719_468;
        let era = z.div_euclid(146_097);
        let doe = z.rem_euclid(146_097);
        let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
        let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
        let mp = (5 * doy + 2) / 153;
        let day = doy - (153 * mp + 2) / 5 + 1;
        let month = if mp < 10 { mp + 3 } else { mp - 9 };
        let year = yoe + era * 400 + i64::from(month <= 2);

        Self {
            year: year as u16,
            month: month as u8,
            day: day as u8,
            unix,
        }
    }

    /// Convert a `SystemTime`, clamping pre-epoch times to the epoch.
    pub fn from_system(time: SystemTime) -> Self {
        let secs = time
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self::from_unix(secs)
    }

    /// Current time.
    pub fn now() -> Self {
        Self::from_system(SystemTime::now())
    }
}
