//! ODF data type conversions (Boolean, Date, DateTime, Duration).
//!
//! Conversion utilities between the ODF lexical representations (ISO 8601
//! strings) and Rust native types.

use crate::{Error, Result};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, Utc};

/// Boolean conversion between ODF "true"/"false" and Rust bool.
pub struct Boolean;

impl Boolean {
    /// Decode an ODF boolean string.
    ///
    /// # Examples
    ///
    /// ```
    /// use longan::datatype::Boolean;
    ///
    /// assert_eq!(Boolean::decode("true").unwrap(), true);
    /// assert!(Boolean::decode("TRUE").is_err());
    /// ```
    pub fn decode(data: &str) -> Result<bool> {
        match data {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(Error::InvalidArgument(format!(
                "boolean '{}' is invalid, expected 'true' or 'false'",
                data
            ))),
        }
    }

    /// Encode a bool as an ODF boolean string.
    #[inline]
    pub fn encode(value: bool) -> &'static str {
        if value { "true" } else { "false" }
    }
}

/// Date conversion between ODF "YYYY-MM-DD" and [`chrono::NaiveDate`].
pub struct Date;

impl Date {
    /// Decode an ODF date string.
    ///
    /// # Examples
    ///
    /// ```
    /// use longan::datatype::Date;
    /// use chrono::NaiveDate;
    ///
    /// let date = Date::decode("2024-01-31").unwrap();
    /// assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
    /// ```
    pub fn decode(data: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(data, "%Y-%m-%d").map_err(|e| {
            Error::InvalidArgument(format!("failed to parse ODF date '{}': {}", data, e))
        })
    }

    /// Encode a date as an ODF date string.
    #[inline]
    pub fn encode(value: &NaiveDate) -> String {
        value.format("%Y-%m-%d").to_string()
    }
}

/// DateTime conversion between ISO 8601 strings and [`chrono::DateTime`].
pub struct DateTimeOdf;

impl DateTimeOdf {
    /// Decode an ODF datetime string, with or without timezone information.
    /// Times without a zone are taken as UTC.
    pub fn decode(data: &str) -> Result<DateTime<FixedOffset>> {
        let normalized = if data.ends_with('Z') {
            data.replacen('Z', "+00:00", 1)
        } else {
            data.to_string()
        };

        if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
            return Ok(dt);
        }

        if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S") {
            return Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc).fixed_offset());
        }

        if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f") {
            return Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc).fixed_offset());
        }

        Err(Error::InvalidArgument(format!(
            "failed to parse ODF datetime '{}'",
            data
        )))
    }

    /// Encode a datetime as an ODF datetime string. UTC times end with 'Z'.
    pub fn encode(value: &DateTime<FixedOffset>) -> String {
        let formatted = value.to_rfc3339();
        if formatted.ends_with("+00:00") {
            formatted.replacen("+00:00", "Z", 1)
        } else {
            formatted
        }
    }
}

/// Duration conversion between ODF "PT1H30M" and [`chrono::Duration`].
pub struct DurationOdf;

impl DurationOdf {
    /// Decode an ISO 8601 duration string (e.g. "PT1H30M", "P1DT2H", "-PT5M").
    ///
    /// Month components are rejected: they have no fixed length in seconds.
    pub fn decode(data: &str) -> Result<Duration> {
        let (sign, data) = match data.strip_prefix('-') {
            Some(rest) => (-1, rest),
            None => (1, data),
        };

        let Some(body) = data.strip_prefix('P') else {
            return Err(Error::InvalidArgument(format!(
                "invalid duration '{}', must start with 'P'",
                data
            )));
        };

        let mut days = 0i64;
        let mut hours = 0i64;
        let mut minutes = 0i64;
        let mut seconds = 0i64;

        let mut buffer = String::new();
        let mut in_time = false;

        for c in body.chars() {
            match c {
                '0'..='9' => buffer.push(c),
                'T' => in_time = true,
                'D' => {
                    days = Self::take_component(&mut buffer, "days")?;
                },
                'H' if in_time => {
                    hours = Self::take_component(&mut buffer, "hours")?;
                },
                'M' if in_time => {
                    minutes = Self::take_component(&mut buffer, "minutes")?;
                },
                'S' if in_time => {
                    seconds = Self::take_component(&mut buffer, "seconds")?;
                },
                _ => {
                    return Err(Error::InvalidArgument(format!(
                        "invalid component '{}' in duration '{}'",
                        c, data
                    )));
                },
            }
        }

        let total = days * 86400 + hours * 3600 + minutes * 60 + seconds;
        Ok(Duration::seconds(total * sign))
    }

    fn take_component(buffer: &mut String, what: &str) -> Result<i64> {
        let value = buffer
            .parse()
            .map_err(|_| Error::InvalidArgument(format!("invalid {} in duration", what)));
        buffer.clear();
        value
    }

    /// Encode a duration as an ODF duration string ("PT#H#M#S").
    pub fn encode(value: &Duration) -> String {
        let total = value.num_seconds();
        let (sign, total) = if total < 0 { ("-", -total) } else { ("", total) };

        let hours = total / 3600;
        let minutes = (total % 3600) / 60;
        let seconds = total % 60;

        format!("{}PT{}H{}M{}S", sign, hours, minutes, seconds)
    }
}
