use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::session::Mode;

pub const FOCUS_MINUTES_MIN: i64 = 1;
pub const FOCUS_MINUTES_MAX: i64 = 180;
pub const BREAK_MINUTES_MIN: i64 = 1;
pub const BREAK_MINUTES_MAX: i64 = 60;

/// Focus and break lengths, always within bounds once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTimerConfig")]
pub struct TimerConfig {
    focus_minutes: u32,
    break_minutes: u32,
}

#[derive(Deserialize)]
struct RawTimerConfig {
    focus_minutes: i64,
    break_minutes: i64,
}

impl TryFrom<RawTimerConfig> for TimerConfig {
    type Error = ConfigError;

    fn try_from(raw: RawTimerConfig) -> Result<Self, Self::Error> {
        Self::new(raw.focus_minutes, raw.break_minutes)
    }
}

impl TimerConfig {
    /// Validate and build a config.
    ///
    /// # Errors
    /// Returns [`ConfigError::OutOfRange`] if focus is outside `[1, 180]`
    /// or break is outside `[1, 60]`.
    pub fn new(focus_minutes: i64, break_minutes: i64) -> Result<Self, ConfigError> {
        let focus_minutes = check_range(
            "focus_minutes",
            focus_minutes,
            FOCUS_MINUTES_MIN,
            FOCUS_MINUTES_MAX,
        )?;
        let break_minutes = check_range(
            "break_minutes",
            break_minutes,
            BREAK_MINUTES_MIN,
            BREAK_MINUTES_MAX,
        )?;
        Ok(Self {
            focus_minutes,
            break_minutes,
        })
    }

    pub fn focus_minutes(&self) -> u32 {
        self.focus_minutes
    }

    pub fn break_minutes(&self) -> u32 {
        self.break_minutes
    }

    pub fn minutes_for(&self, mode: Mode) -> u32 {
        match mode {
            Mode::Focus => self.focus_minutes,
            Mode::Break => self.break_minutes,
        }
    }

    /// Full countdown length for `mode`, in seconds.
    pub fn duration_secs(&self, mode: Mode) -> u64 {
        u64::from(self.minutes_for(mode)) * 60
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            focus_minutes: 25,
            break_minutes: 5,
        }
    }
}

fn check_range(key: &'static str, value: i64, min: i64, max: i64) -> Result<u32, ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            key,
            value,
            min,
            max,
        });
    }
    // In range, so it fits.
    Ok(value as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bounds_inclusive() {
        assert!(TimerConfig::new(1, 1).is_ok());
        assert!(TimerConfig::new(180, 60).is_ok());
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(matches!(
            TimerConfig::new(0, 5),
            Err(ConfigError::OutOfRange { key: "focus_minutes", .. })
        ));
        assert!(matches!(
            TimerConfig::new(181, 5),
            Err(ConfigError::OutOfRange { key: "focus_minutes", .. })
        ));
        assert!(matches!(
            TimerConfig::new(25, 61),
            Err(ConfigError::OutOfRange { key: "break_minutes", .. })
        ));
        assert!(TimerConfig::new(25, -1).is_err());
    }

    #[test]
    fn durations_in_seconds() {
        let cfg = TimerConfig::new(25, 5).unwrap();
        assert_eq!(cfg.duration_secs(Mode::Focus), 1500);
        assert_eq!(cfg.duration_secs(Mode::Break), 300);
    }

    #[test]
    fn deserialize_validates() {
        let ok: TimerConfig =
            serde_json::from_str(r#"{"focus_minutes": 50, "break_minutes": 10}"#).unwrap();
        assert_eq!(ok.focus_minutes(), 50);
        let bad = serde_json::from_str::<TimerConfig>(r#"{"focus_minutes": 0, "break_minutes": 10}"#);
        assert!(bad.is_err());
    }
}
