use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

const RECEIPT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const RECEIPT_DATE_OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S %z", "%Y-%m-%d %H:%M:%S %:z"];

/// Parses receipt dates of the form `yyyy-MM-dd HH:mm:ss <zone>`, such as
/// `2030-01-01 00:00:00 Etc/GMT`.
///
/// The zone may be an IANA name (`Etc/GMT`, `America/Los_Angeles`), `Z`, or a
/// numeric offset (`+0000`, `-05:00`). Local times that do not exist in the
/// named zone yield `None`; ambiguous ones resolve to the earlier instant.
pub(crate) fn parse_receipt_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    let (local, zone) = value.rsplit_once(' ')?;
    if let Some(tz) = parse_named_zone(zone) {
        let Ok(naive) = NaiveDateTime::parse_from_str(local.trim(), RECEIPT_DATE_FORMAT) else {
            return None;
        };
        return tz
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc));
    }
    RECEIPT_DATE_OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(value, format).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_named_zone(zone: &str) -> Option<Tz> {
    match zone {
        "Z" => Some(Tz::UTC),
        _ => zone.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_utc_aliases() {
        let expected = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        for value in [
            "2030-01-01 00:00:00 UTC",
            "2030-01-01 00:00:00 Etc/GMT",
            "2030-01-01 00:00:00 Z",
        ] {
            assert_eq!(parse_receipt_date(value), Some(expected));
        }
    }

    #[test]
    fn test_parses_named_zones() {
        assert_eq!(
            parse_receipt_date("2030-01-01 00:00:00 America/Los_Angeles"),
            Some(Utc.with_ymd_and_hms(2030, 1, 1, 8, 0, 0).unwrap())
        );
        assert_eq!(
            parse_receipt_date("2030-07-01 12:00:00 Europe/Berlin"),
            Some(Utc.with_ymd_and_hms(2030, 7, 1, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parses_numeric_offsets() {
        assert_eq!(
            parse_receipt_date("2030-01-01 00:00:00 -0500"),
            Some(Utc.with_ymd_and_hms(2030, 1, 1, 5, 0, 0).unwrap())
        );
        assert_eq!(
            parse_receipt_date("2030-01-01 09:30:00 +09:30"),
            Some(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_rejects_unknown_zone_and_garbage() {
        assert_eq!(parse_receipt_date("2030-01-01 00:00:00 Mars/Olympus"), None);
        assert_eq!(parse_receipt_date("2030-01-01 00:00:00"), None);
        assert_eq!(parse_receipt_date("not a date"), None);
        assert_eq!(parse_receipt_date(""), None);
    }
}
