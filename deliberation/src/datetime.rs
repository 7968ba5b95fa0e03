use std::ops::Deref;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rocket::form::{self, FromFormField, ValueField};

/// Input formats accepted for a meeting time. The first one is what an HTML
/// `datetime-local` input submits.
const FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// An optional meeting time as submitted through a form.
///
/// A blank value means "not scheduled" and clears the stored time. Any other
/// value must parse with one of the supported formats; a missing field is
/// treated as blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledAt(Option<NaiveDateTime>);

impl ScheduledAt {
    pub fn into_inner(self) -> Option<NaiveDateTime> {
        self.0
    }
}

impl Deref for ScheduledAt {
    type Target = Option<NaiveDateTime>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Option<NaiveDateTime>> for ScheduledAt {
    fn from(v: Option<NaiveDateTime>) -> Self {
        ScheduledAt(v)
    }
}

impl FromStr for ScheduledAt {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(ScheduledAt(None));
        }

        let mut last_error = None;
        for format in FORMATS {
            match NaiveDateTime::parse_from_str(s, format) {
                Ok(dt) => return Ok(ScheduledAt(Some(dt))),
                Err(e) => last_error = Some(e),
            }
        }

        match last_error {
            Some(e) => Err(e),
            None => Ok(ScheduledAt(None)),
        }
    }
}

impl<'v> FromFormField<'v> for ScheduledAt {
    fn from_value(field: ValueField<'v>) -> form::Result<'v, Self> {
        let dt = Self::from_str(field.value)
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send>)?;
        Ok(dt)
    }

    fn default() -> Option<Self> {
        Some(ScheduledAt(None))
    }
}

/// Value for the `datetime-local` input when re-rendering the form.
pub fn to_input_value(value: Option<NaiveDateTime>) -> String {
    value
        .map(|dt| dt.format(FORMATS[0]).to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn parses_browser_and_plain_formats() {
        assert_eq!(*"2026-10-16T19:30".parse::<ScheduledAt>().unwrap(), Some(at(19, 30, 0)));
        assert_eq!(*"2026-10-16 19:30:15".parse::<ScheduledAt>().unwrap(), Some(at(19, 30, 15)));
    }

    #[test]
    fn blank_clears() {
        assert_eq!(*"  ".parse::<ScheduledAt>().unwrap(), None);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!("next tuesday".parse::<ScheduledAt>().is_err());
    }

    #[test]
    fn input_value_round_trips() {
        let value = to_input_value(Some(at(8, 5, 0)));
        assert_eq!(value, "2026-10-16T08:05");
        assert_eq!(to_input_value(None), "");
    }
}
