//! Oracle DATE codec.
//!
//! DATE is a 7-byte vendor format:
//! - byte[0]: century + 100
//! - byte[1]: year within century + 100
//! - byte[2]: month (1-12)
//! - byte[3]: day (1-31)
//! - byte[4]: hour + 1
//! - byte[5]: minute + 1
//! - byte[6]: second + 1
//!
//! An empty or zeroed payload (the backend's "empty date" literal) decodes
//! to the zero timestamp, which callers can distinguish from any valid
//! midnight value via [`is_zero_timestamp`].

use crate::error::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// The zero timestamp: 0001-01-01 00:00:00.
///
/// Used as the decode result for NULL and empty-date payloads bound for a
/// timestamp destination. No valid DATE payload decodes to this value, so
/// a zero-clock timestamp on a real date remains distinguishable.
pub fn zero_timestamp() -> NaiveDateTime {
    NaiveDateTime::new(
        NaiveDate::from_ymd_opt(1, 1, 1).expect("year 1 is valid"),
        NaiveTime::from_hms_opt(0, 0, 0).expect("midnight is valid"),
    )
}

/// Check whether a timestamp is the zero sentinel.
pub fn is_zero_timestamp(ts: &NaiveDateTime) -> bool {
    *ts == zero_timestamp()
}

/// Decode a 7-byte vendor DATE payload.
pub fn decode_date(data: &[u8]) -> Result<NaiveDateTime> {
    if data.len() != 7 {
        return Err(Error::invalid_payload(
            "DATE",
            format!("expected 7 bytes, got {}", data.len()),
        ));
    }

    // The server encodes its empty-date literal as an all-zero payload.
    if data.iter().all(|&b| b == 0) {
        return Ok(zero_timestamp());
    }

    let century = (data[0] as i32) - 100;
    let year = century * 100 + (data[1] as i32) - 100;
    let month = data[2];
    let day = data[3];
    let hour = data[4].wrapping_sub(1);
    let minute = data[5].wrapping_sub(1);
    let second = data[6].wrapping_sub(1);

    // A zeroed month or day also marks an empty date rather than a value.
    if month == 0 || day == 0 {
        return Ok(zero_timestamp());
    }

    if !(1..=12).contains(&month) {
        return Err(Error::invalid_payload("DATE", format!("month {month}")));
    }
    if !(1..=31).contains(&day) {
        return Err(Error::invalid_payload("DATE", format!("day {day}")));
    }
    if hour > 23 || minute > 59 || second > 59 {
        return Err(Error::invalid_payload(
            "DATE",
            format!("time {hour:02}:{minute:02}:{second:02}"),
        ));
    }

    let date = NaiveDate::from_ymd_opt(year, month as u32, day as u32).ok_or_else(|| {
        Error::invalid_payload("DATE", format!("date {year}-{month:02}-{day:02}"))
    })?;
    let time = NaiveTime::from_hms_opt(hour as u32, minute as u32, second as u32)
        .ok_or_else(|| Error::invalid_payload("DATE", "time out of range".to_string()))?;
    Ok(NaiveDateTime::new(date, time))
}

/// Encode a timestamp as a 7-byte vendor DATE payload.
///
/// The zero sentinel encodes as the all-zero empty-date payload.
pub fn encode_date(ts: &NaiveDateTime) -> Result<[u8; 7]> {
    use chrono::{Datelike, Timelike};

    if is_zero_timestamp(ts) {
        return Ok([0; 7]);
    }

    let year = ts.year();
    if !(1..=9999).contains(&year) {
        return Err(Error::invalid_payload("DATE", format!("year {year}")));
    }

    Ok([
        (year / 100 + 100) as u8,
        (year % 100 + 100) as u8,
        ts.month() as u8,
        ts.day() as u8,
        ts.hour() as u8 + 1,
        ts.minute() as u8 + 1,
        ts.second() as u8 + 1,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_decode_date_value() {
        // 2024-10-21 12:36:05
        let data = [0x78, 0x7C, 0x0A, 0x15, 0x0D, 0x25, 0x06];
        let result = decode_date(&data).unwrap();
        assert_eq!(result.year(), 2024);
        assert_eq!(result.month(), 10);
        assert_eq!(result.day(), 21);
        assert_eq!(result.hour(), 12);
        assert_eq!(result.minute(), 36);
        assert_eq!(result.second(), 5);
    }

    #[test]
    fn test_decode_midnight_is_not_zero() {
        // 2024-01-15 00:00:00
        let data = [0x78, 0x7C, 0x01, 0x0F, 0x01, 0x01, 0x01];
        let result = decode_date(&data).unwrap();
        assert_eq!(result.hour(), 0);
        assert!(!is_zero_timestamp(&result));
    }

    #[test]
    fn test_decode_empty_date() {
        let result = decode_date(&[0; 7]).unwrap();
        assert!(is_zero_timestamp(&result));
    }

    #[test]
    fn test_decode_wrong_length() {
        assert!(decode_date(&[0x78, 0x7C, 0x0A]).is_err());
    }

    #[test]
    fn test_decode_invalid_month() {
        let data = [0x78, 0x7C, 0x0D, 0x0F, 0x01, 0x01, 0x01];
        assert!(decode_date(&data).is_err());
    }

    #[test]
    fn test_encode_round_trip() {
        let data = [0x77, 0xC7, 0x06, 0x0F, 0x0D, 0x1F, 0x2E]; // 1999-06-15 12:30:45
        let ts = decode_date(&data).unwrap();
        assert_eq!(encode_date(&ts).unwrap(), data);
    }

    #[test]
    fn test_encode_zero_sentinel() {
        assert_eq!(encode_date(&zero_timestamp()).unwrap(), [0; 7]);
    }
}
