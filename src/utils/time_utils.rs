use chrono::DateTime;

pub struct TimeUtils;

impl TimeUtils {
    pub const MS_IN_S: i64 = 1000;
    pub const MS_IN_MIN: i64 = Self::MS_IN_S * 60;
    pub const MS_IN_3_MIN: i64 = Self::MS_IN_S * 60 * 3;
    pub const MS_IN_5_MIN: i64 = Self::MS_IN_S * 60 * 5;
    pub const MS_IN_15_MIN: i64 = Self::MS_IN_S * 60 * 15;
    pub const MS_IN_30_MIN: i64 = Self::MS_IN_S * 60 * 30;
    pub const MS_IN_H: i64 = Self::MS_IN_MIN * 60;
    pub const MS_IN_2_H: i64 = Self::MS_IN_MIN * 60 * 2;
    pub const MS_IN_4_H: i64 = Self::MS_IN_MIN * 60 * 4;
    pub const MS_IN_6_H: i64 = Self::MS_IN_MIN * 60 * 6;
    pub const MS_IN_8_H: i64 = Self::MS_IN_MIN * 60 * 8;
    pub const MS_IN_12_H: i64 = Self::MS_IN_MIN * 60 * 12;
    pub const MS_IN_D: i64 = Self::MS_IN_H * 24;
    pub const MS_IN_3_D: i64 = Self::MS_IN_H * 24 * 3;
    pub const MS_IN_W: i64 = Self::MS_IN_D * 7;
    pub const MS_IN_1_M: i64 = Self::MS_IN_D * 30;
    pub const STANDARD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

    /// Convert interval in milliseconds to a Binance-style shorthand (e.g. `30m`, `1h`).
    pub fn interval_to_string(interval_ms: i64) -> &'static str {
        match interval_ms {
            Self::MS_IN_S => "1s",
            Self::MS_IN_MIN => "1m",
            Self::MS_IN_3_MIN => "3m",
            Self::MS_IN_5_MIN => "5m",
            Self::MS_IN_15_MIN => "15m",
            Self::MS_IN_30_MIN => "30m",
            Self::MS_IN_H => "1h",
            Self::MS_IN_2_H => "2h",
            Self::MS_IN_4_H => "4h",
            Self::MS_IN_6_H => "6h",
            Self::MS_IN_8_H => "8h",
            Self::MS_IN_12_H => "12h",
            Self::MS_IN_D => "1d",
            Self::MS_IN_3_D => "3d",
            Self::MS_IN_W => "1w",
            Self::MS_IN_1_M => "1M",
            _ => "unknown",
        }
    }

    /// Inverse of [`TimeUtils::interval_to_string`]. Case matters: `1m` is a minute, `1M` a month.
    pub fn interval_from_string(text: &str) -> Option<i64> {
        let ms = match text.trim() {
            "1s" => Self::MS_IN_S,
            "1m" => Self::MS_IN_MIN,
            "3m" => Self::MS_IN_3_MIN,
            "5m" => Self::MS_IN_5_MIN,
            "15m" => Self::MS_IN_15_MIN,
            "30m" => Self::MS_IN_30_MIN,
            "1h" => Self::MS_IN_H,
            "2h" => Self::MS_IN_2_H,
            "4h" => Self::MS_IN_4_H,
            "6h" => Self::MS_IN_6_H,
            "8h" => Self::MS_IN_8_H,
            "12h" => Self::MS_IN_12_H,
            "1d" => Self::MS_IN_D,
            "3d" => Self::MS_IN_3_D,
            "1w" => Self::MS_IN_W,
            "1M" => Self::MS_IN_1_M,
            _ => return None,
        };
        Some(ms)
    }
}

// Time Helper functions

/// Used for display purposes. Out-of-range timestamps render as the raw number.
pub fn epoch_ms_to_utc(epoch_ms: i64) -> String {
    match DateTime::from_timestamp_millis(epoch_ms) {
        Some(dt) => format!("{}", dt.format(TimeUtils::STANDARD_TIME_FORMAT)),
        None => epoch_ms.to_string(),
    }
}

pub fn format_duration(ms: i64) -> String {
    let secs = ms / 1000;
    if secs < 60 {
        return format!("{}s", secs);
    }
    let mins = secs / 60;
    if mins < 60 {
        return format!("{}m", mins);
    }
    let hours = mins / 60;
    if hours < 24 {
        return format!("{}h", hours);
    }
    let days = hours / 24;
    if days < 30 {
        return format!("{}d", days);
    }
    let months = days / 30;
    if months < 12 {
        return format!("{}M", months);
    }
    let years = months / 12;
    let rem_months = months % 12;
    format!("{}Y {}M", years, rem_months)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_strings_round_trip() {
        for s in ["1m", "5m", "1h", "4h", "1d", "1w", "1M"] {
            let ms = TimeUtils::interval_from_string(s).unwrap();
            assert_eq!(TimeUtils::interval_to_string(ms), s);
        }
        assert_eq!(TimeUtils::interval_from_string("7h"), None);
    }

    #[test]
    fn formats_epoch_and_durations() {
        assert_eq!(epoch_ms_to_utc(0), "1970-01-01 00:00");
        assert_eq!(format_duration(90_000), "1m");
        assert_eq!(format_duration(TimeUtils::MS_IN_D * 3), "3d");
    }
}
