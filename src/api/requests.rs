//! API request bodies

use serde::Deserialize;
use serde_json::Value;

use crate::state::{Layout, SoundKind, TimerField};

/// Body of POST /groups
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateGroupRequest {
    pub name: Option<String>,
}

/// Body of PUT /groups/active/name
#[derive(Debug, Clone, Deserialize)]
pub struct RenameRequest {
    pub name: String,
}

/// Body of PUT /timers/:id/duration.
///
/// Fields accept numbers or strings straight from input boxes; anything
/// that does not start with a number counts as 0, as do negatives.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DurationRequest {
    #[serde(default)]
    pub hours: Value,
    #[serde(default)]
    pub minutes: Value,
    #[serde(default)]
    pub seconds: Value,
}

impl DurationRequest {
    /// Hours, minutes and seconds, each at least 0
    pub fn parts(&self) -> (i64, i64, i64) {
        (
            parse_edit_input(&self.hours),
            parse_edit_input(&self.minutes),
            parse_edit_input(&self.seconds),
        )
    }
}

/// Body of PATCH /timers/:id
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimerPatch {
    pub name: Option<String>,
    /// Unknown sound names fall back to "none"
    pub sound: Option<String>,
}

impl TimerPatch {
    pub fn into_fields(self) -> Vec<TimerField> {
        let mut fields = Vec::new();
        if let Some(name) = self.name {
            fields.push(TimerField::Name(name));
        }
        if let Some(sound) = self.sound {
            fields.push(TimerField::Sound(SoundKind::parse(&sound)));
        }
        fields
    }
}

/// Body of PUT /settings/theme
#[derive(Debug, Clone, Deserialize)]
pub struct ThemeRequest {
    pub theme: String,
}

/// Body of PUT /settings/layout
#[derive(Debug, Clone, Deserialize)]
pub struct LayoutRequest {
    pub layout: Layout,
}

/// `?confirm=true` on destructive endpoints
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ConfirmQuery {
    #[serde(default)]
    pub confirm: bool,
}

/// Read a number the way a browser number box reports it: a leading integer
/// with an optional sign, everything after it ignored.
pub fn parse_edit_input(value: &Value) -> i64 {
    let parsed = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Value::String(s) => parse_leading_int(s),
        _ => 0,
    };
    parsed.max(0)
}

fn parse_leading_int(text: &str) -> i64 {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    // Only overflow can fail a non-empty run of digits
    let magnitude = match &digits[..end] {
        "" => 0,
        run => run.parse::<i64>().unwrap_or(i64::MAX),
    };
    if negative { -magnitude } else { magnitude }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn edit_inputs_parse_like_number_boxes() {
        assert_eq!(parse_edit_input(&json!(5)), 5);
        assert_eq!(parse_edit_input(&json!(2.9)), 2);
        assert_eq!(parse_edit_input(&json!("12")), 12);
        assert_eq!(parse_edit_input(&json!(" 7min")), 7);
        assert_eq!(parse_edit_input(&json!("abc")), 0);
        assert_eq!(parse_edit_input(&json!("")), 0);
        assert_eq!(parse_edit_input(&json!(null)), 0);
        assert_eq!(parse_edit_input(&json!(-3)), 0);
        assert_eq!(parse_edit_input(&json!("-3")), 0);
    }

    #[test]
    fn oversized_inputs_saturate() {
        assert_eq!(parse_edit_input(&json!("99999999999999999999")), i64::MAX);
        assert_eq!(parse_edit_input(&json!("-99999999999999999999")), 0);
        assert_eq!(parse_edit_input(&json!(18446744073709551615u64)), i64::MAX);

        let mut timer = crate::state::Timer::new(1, 60, 1);
        timer.commit_edit(0, 0, parse_edit_input(&json!("99999999999999999999")));
        assert_eq!(timer.total_duration, i64::MAX as u64);
        assert_eq!(timer.remaining, timer.total_duration);
    }

    #[test]
    fn missing_duration_fields_are_zero() {
        let request: DurationRequest = serde_json::from_value(json!({"minutes": "1", "seconds": 30})).unwrap();
        assert_eq!(request.parts(), (0, 1, 30));
    }

    #[test]
    fn patch_maps_unknown_sound_to_none() {
        let patch = TimerPatch {
            name: None,
            sound: Some("gong".to_string()),
        };
        assert_eq!(patch.into_fields(), [TimerField::Sound(SoundKind::None)]);
    }
}
