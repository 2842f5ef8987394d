// Settings module
// User-tunable configuration, persisted as TOML

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the shift service, e.g. `http://localhost:8080`
    pub server_url: String,
    /// 0 = Sunday, 1 = Monday, etc.
    pub first_day_of_week: u8,
    /// Length of a shift created by clicking an empty cell
    pub default_shift_minutes: i64,
    /// Resizing never shrinks a shift below this
    pub min_shift_minutes: i64,
    /// Fraction of the column width a lane-0 box occupies
    pub column_width_ratio: f32,
    /// Width shrink factor applied once per lane
    pub lane_ratio: f32,
    /// Distance from a box's bottom-right corner that starts a resize
    pub resize_tolerance: f32,
    /// Squared pointer travel below which a press/release is a click
    pub click_threshold_sq: f32,
    /// Height of one half-hour row in the grid
    pub slot_height: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8080".to_string(),
            first_day_of_week: 0, // Sunday
            default_shift_minutes: 60,
            min_shift_minutes: 15,
            column_width_ratio: 0.9,
            lane_ratio: 0.8,
            resize_tolerance: 8.0,
            click_threshold_sq: 16.0,
            slot_height: 24.0,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), String> {
        if self.server_url.trim().is_empty() {
            return Err("Server URL cannot be empty".to_string());
        }
        if self.first_day_of_week > 6 {
            return Err("First day of week must be between 0 and 6".to_string());
        }
        if self.default_shift_minutes <= 0 {
            return Err("Default shift duration must be positive".to_string());
        }
        if self.min_shift_minutes <= 0 || self.min_shift_minutes > self.default_shift_minutes {
            return Err("Minimum shift duration must be positive and not exceed the default".to_string());
        }
        if !(0.0..=1.0).contains(&self.column_width_ratio) || self.column_width_ratio == 0.0 {
            return Err("Column width ratio must be in (0, 1]".to_string());
        }
        if !(0.0..=1.0).contains(&self.lane_ratio) || self.lane_ratio == 0.0 {
            return Err("Lane ratio must be in (0, 1]".to_string());
        }
        if self.resize_tolerance < 0.0 || self.click_threshold_sq < 0.0 {
            return Err("Pointer tolerances cannot be negative".to_string());
        }
        if self.slot_height < 4.0 {
            return Err("Slot height must be at least 4 pixels".to_string());
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings = Settings::from_toml("server_url = \"https://shifts.example\"\nfirst_day_of_week = 1\n")
            .unwrap();
        assert_eq!(settings.server_url, "https://shifts.example");
        assert_eq!(settings.first_day_of_week, 1);
        assert_eq!(settings.default_shift_minutes, 60);
        assert_eq!(settings.lane_ratio, 0.8);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut settings = Settings::default();
        settings.slot_height = 30.0;
        let text = settings.to_toml().unwrap();
        assert_eq!(Settings::from_toml(&text).unwrap(), settings);
    }

    #[test_case(|s: &mut Settings| s.server_url.clear() ; "empty url")]
    #[test_case(|s: &mut Settings| s.first_day_of_week = 7 ; "weekday out of range")]
    #[test_case(|s: &mut Settings| s.default_shift_minutes = 0 ; "zero default duration")]
    #[test_case(|s: &mut Settings| s.min_shift_minutes = 90 ; "minimum above default")]
    #[test_case(|s: &mut Settings| s.lane_ratio = 0.0 ; "zero lane ratio")]
    #[test_case(|s: &mut Settings| s.column_width_ratio = 1.5 ; "column ratio above one")]
    #[test_case(|s: &mut Settings| s.slot_height = 1.0 ; "tiny rows")]
    fn test_invalid_settings(mutate: fn(&mut Settings)) {
        let mut settings = Settings::default();
        mutate(&mut settings);
        assert!(settings.validate().is_err());
    }
}
