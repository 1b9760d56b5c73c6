//! Turns a [`WeatherSnapshot`] into display strings.
//!
//! Everything here is pure: no I/O, inputs are never mutated, and the time
//! zone is passed in explicitly by [`render_in`].

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

use crate::model::{Condition, WeatherSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
        }
    }

    /// Display value for a Celsius reading: truncate toward zero first, then
    /// convert the truncated integer.
    pub fn display_degrees(&self, celsius: f64) -> i64 {
        let whole = truncate(celsius);
        match self {
            Self::Celsius => whole,
            Self::Fahrenheit => truncate(whole as f64 * 9.0 / 5.0 + 32.0),
        }
    }
}

fn truncate(value: f64) -> i64 {
    value.trunc() as i64
}

/// Locale identifiers that select Fahrenheit.
///
/// Defaults to `["[en_US]", "en_LR", "en_MM"]`. `"[en_US]"` never equals a real locale
/// identifier, so with the defaults only `en_LR` and `en_MM` switch units;
/// see [`UnitPolicy::suspicious_entries`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitPolicy {
    fahrenheit_locales: Vec<String>,
}

pub const DEFAULT_FAHRENHEIT_LOCALES: [&str; 3] = ["[en_US]", "en_LR", "en_MM"];

impl Default for UnitPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_FAHRENHEIT_LOCALES.iter().map(|s| s.to_string()).collect())
    }
}

impl UnitPolicy {
    pub fn new(fahrenheit_locales: Vec<String>) -> Self {
        Self { fahrenheit_locales }
    }

    pub fn unit_for_locale(&self, locale: &str) -> TemperatureUnit {
        if self.fahrenheit_locales.iter().any(|l| l == locale) {
            TemperatureUnit::Fahrenheit
        } else {
            TemperatureUnit::Celsius
        }
    }

    /// Entries that cannot match a locale identifier as produced by
    /// [`normalize_locale`].
    pub fn suspicious_entries(&self) -> Vec<&str> {
        self.fahrenheit_locales
            .iter()
            .filter(|l| normalize_locale(l) != l.as_str() || l.contains(['[', ']']))
            .map(String::as_str)
            .collect()
    }
}

/// Strips encoding and modifier suffixes: `en_US.UTF-8@euro` -> `en_US`.
pub fn normalize_locale(raw: &str) -> &str {
    let raw = raw.trim();
    let end = raw.find(['.', '@']).unwrap_or(raw.len());
    &raw[..end]
}

/// Active locale identifier from `LC_ALL`, `LC_MESSAGES` then `LANG`.
pub fn current_locale() -> Option<String> {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|v| !v.trim().is_empty())
        .map(|v| normalize_locale(&v).to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconCategory {
    Clear,
    Cloud,
    Rain,
    Storm,
    Snow,
}

impl IconCategory {
    /// Fixed icon-code table. Codes outside it map to `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "01d" | "01n" => Some(Self::Clear),
            "02d" | "02n" | "03d" | "03n" | "04d" | "04n" => Some(Self::Cloud),
            "10d" | "10n" => Some(Self::Rain),
            "11d" => Some(Self::Storm),
            "11n" => Some(Self::Rain),
            "13d" | "13n" => Some(Self::Snow),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Cloud => "cloud",
            Self::Rain => "rain",
            Self::Storm => "storm",
            Self::Snow => "snow",
        }
    }
}

impl std::fmt::Display for IconCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayModel {
    pub condition: String,
    pub description: String,
    pub temperature: String,
    pub min: String,
    pub max: String,
    pub humidity: String,
    pub wind: String,
    pub name: String,
    pub country: String,
    pub sunrise: String,
    pub sunset: String,
    pub unit: TemperatureUnit,
    /// `None` when no condition carried a known icon code.
    pub icon: Option<IconCategory>,
}

/// Render in the machine's current time zone.
pub fn render(snapshot: &WeatherSnapshot, unit: TemperatureUnit) -> DisplayModel {
    render_in(snapshot, unit, &Local)
}

pub fn render_in<Tz>(snapshot: &WeatherSnapshot, unit: TemperatureUnit, tz: &Tz) -> DisplayModel
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let readings = &snapshot.main;
    let last = snapshot.weather.last();

    DisplayModel {
        condition: last.map(|c| c.main.clone()).unwrap_or_default(),
        description: last.map(|c| c.description.clone()).unwrap_or_default(),
        temperature: format_degrees(readings.temp, unit),
        min: format!("{} min", format_degrees(readings.temp_min, unit)),
        max: format!("{} max", format_degrees(readings.temp_max, unit)),
        humidity: format!("{} per cent", readings.humidity),
        wind: format_plain_number(snapshot.wind.speed),
        name: snapshot.name.clone(),
        country: snapshot.sys.country.clone(),
        sunrise: format_clock(snapshot.sys.sunrise, tz),
        sunset: format_clock(snapshot.sys.sunset, tz),
        unit,
        icon: icon_for(&snapshot.weather),
    }
}

/// Conditions are applied in order, so the last known code wins.
fn icon_for(conditions: &[Condition]) -> Option<IconCategory> {
    conditions.iter().rev().find_map(|c| IconCategory::from_code(&c.icon))
}

fn format_degrees(celsius: f64, unit: TemperatureUnit) -> String {
    format!("{}{}", unit.display_degrees(celsius), unit.symbol())
}

/// Raw number, no unit. Whole values keep one decimal (`4.0`), matching how
/// the value was shown before.
fn format_plain_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e7 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

fn format_clock<Tz>(epoch_secs: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    match DateTime::from_timestamp(epoch_secs, 0) {
        Some(utc) => utc.with_timezone(tz).format("%H:%M:%S").to_string(),
        None => "--:--:--".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{bengaluru, with_temps};
    use chrono::{FixedOffset, Utc};

    #[test]
    fn truncates_toward_zero() {
        let c = TemperatureUnit::Celsius;
        assert_eq!(c.display_degrees(20.9), 20);
        assert_eq!(c.display_degrees(0.99), 0);
        assert_eq!(c.display_degrees(-1.5), -1);
        assert_eq!(c.display_degrees(-0.4), 0);
    }

    #[test]
    fn fahrenheit_converts_the_truncated_celsius() {
        let f = TemperatureUnit::Fahrenheit;
        assert_eq!(f.display_degrees(20.9), 68);
        // trunc(-1.5) = -1 -> 30.2 -> 30; converting first would give 29.
        assert_eq!(f.display_degrees(-1.5), 30);
        // trunc(-20) * 1.8 + 32 = -4.0
        assert_eq!(f.display_degrees(-20.7), -4);
        // -17 * 1.8 + 32 = 1.4 -> 1
        assert_eq!(f.display_degrees(-17.9), 1);
        // -18 * 1.8 + 32 = -0.4 -> 0
        assert_eq!(f.display_degrees(-18.2), 0);
    }

    #[test]
    fn renders_bengaluru_in_celsius() {
        let display = render_in(&bengaluru(), TemperatureUnit::Celsius, &Utc);

        assert_eq!(display.condition, "Clear");
        assert_eq!(display.description, "clear sky");
        assert_eq!(display.temperature, "28°C");
        assert_eq!(display.min, "26°C min");
        assert_eq!(display.max, "30°C max");
        assert_eq!(display.humidity, "61 per cent");
        assert_eq!(display.wind, "3.6");
        assert_eq!(display.name, "Bengaluru");
        assert_eq!(display.country, "IN");
        assert_eq!(display.icon, Some(IconCategory::Clear));
        // 1700000000 = 2023-11-14T22:13:20Z
        assert_eq!(display.sunrise, "22:13:20");
        assert_eq!(display.sunset, "09:20:00");
    }

    #[test]
    fn min_and_max_convert_independently() {
        let snapshot = with_temps(20.9, -1.5, 35.99);
        let display = render_in(&snapshot, TemperatureUnit::Fahrenheit, &Utc);

        assert_eq!(display.temperature, "68°F");
        assert_eq!(display.min, "30°F min");
        // 35 * 1.8 + 32 = 95
        assert_eq!(display.max, "95°F max");
    }

    #[test]
    fn min_max_order_is_not_assumed() {
        let snapshot = with_temps(10.0, 15.0, 5.0);
        let display = render_in(&snapshot, TemperatureUnit::Celsius, &Utc);

        assert_eq!(display.min, "15°C min");
        assert_eq!(display.max, "5°C max");
    }

    #[test]
    fn clock_uses_given_time_zone() {
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let display = render_in(&bengaluru(), TemperatureUnit::Celsius, &ist);

        assert_eq!(display.sunrise, "03:43:20");
        assert_eq!(display.sunset, "14:50:00");
    }

    #[test]
    fn wind_is_raw_number_without_unit() {
        assert_eq!(format_plain_number(3.6), "3.6");
        assert_eq!(format_plain_number(4.0), "4.0");
        assert_eq!(format_plain_number(0.0), "0.0");
        assert_eq!(format_plain_number(12.25), "12.25");
    }

    #[test]
    fn icon_table_is_exact() {
        let table = [
            ("01d", IconCategory::Clear),
            ("01n", IconCategory::Clear),
            ("02d", IconCategory::Cloud),
            ("02n", IconCategory::Cloud),
            ("03d", IconCategory::Cloud),
            ("03n", IconCategory::Cloud),
            ("04d", IconCategory::Cloud),
            ("04n", IconCategory::Cloud),
            ("10d", IconCategory::Rain),
            ("10n", IconCategory::Rain),
            ("11d", IconCategory::Storm),
            ("11n", IconCategory::Rain),
            ("13d", IconCategory::Snow),
            ("13n", IconCategory::Snow),
        ];
        for (code, expected) in table {
            assert_eq!(IconCategory::from_code(code), Some(expected), "{code}");
        }

        for code in ["09d", "09n", "50d", "50n", "", "01D"] {
            assert_eq!(IconCategory::from_code(code), None, "{code}");
        }
    }

    #[test]
    fn last_known_icon_wins_and_text_comes_from_last_condition() {
        let mut snapshot = bengaluru();
        snapshot.weather = vec![
            Condition {
                main: "Rain".into(),
                description: "light rain".into(),
                icon: "10d".into(),
            },
            Condition {
                main: "Mist".into(),
                description: "mist".into(),
                icon: "50d".into(),
            },
        ];
        let display = render_in(&snapshot, TemperatureUnit::Celsius, &Utc);

        assert_eq!(display.condition, "Mist");
        assert_eq!(display.icon, Some(IconCategory::Rain));
    }

    #[test]
    fn empty_conditions_render_blank_text_and_no_icon() {
        let mut snapshot = bengaluru();
        snapshot.weather.clear();
        let display = render_in(&snapshot, TemperatureUnit::Celsius, &Utc);

        assert_eq!(display.condition, "");
        assert_eq!(display.icon, None);
        assert_eq!(display.temperature, "28°C");
    }

    #[test]
    fn default_policy_matches_exact_identifiers_only() {
        let policy = UnitPolicy::default();

        assert_eq!(policy.unit_for_locale("en_LR"), TemperatureUnit::Fahrenheit);
        assert_eq!(policy.unit_for_locale("en_MM"), TemperatureUnit::Fahrenheit);
        // The bracketed default entry never matches a real identifier.
        assert_eq!(policy.unit_for_locale("en_US"), TemperatureUnit::Celsius);
        assert_eq!(policy.unit_for_locale("en_GB"), TemperatureUnit::Celsius);
        assert_eq!(policy.unit_for_locale("en_lr"), TemperatureUnit::Celsius);
    }

    #[test]
    fn default_policy_flags_bracketed_entry() {
        assert_eq!(UnitPolicy::default().suspicious_entries(), vec!["[en_US]"]);

        let fixed = UnitPolicy::new(vec!["en_US".into(), "en_LR".into()]);
        assert!(fixed.suspicious_entries().is_empty());
        assert_eq!(fixed.unit_for_locale("en_US"), TemperatureUnit::Fahrenheit);
    }

    #[test]
    fn normalizes_posix_locale_strings() {
        assert_eq!(normalize_locale("en_US.UTF-8"), "en_US");
        assert_eq!(normalize_locale("de_DE@euro"), "de_DE");
        assert_eq!(normalize_locale(" en_LR "), "en_LR");
        assert_eq!(normalize_locale("C"), "C");
    }
}
