use chrono::{DateTime, Duration, NaiveDate, Utc};
use sgp4::Elements;

use super::error::ElementSetError;
use super::types::{OrbitalState, RawElementSet};

const LINE_LEN: usize = 69;

/// Split a single 2LE/3LE block into its lines.
pub fn parse_tle_lines(tle: &str) -> Result<RawElementSet, ElementSetError> {
    let lines: Vec<&str> = tle.lines().map(|l| l.trim()).filter(|l| !l.is_empty()).collect();

    match lines.len() {
        2 => Ok(RawElementSet::new(None, lines[0], lines[1])),
        3 => Ok(RawElementSet::new(
            Some(clean_name(lines[0])),
            lines[1],
            lines[2],
        )),
        n => Err(ElementSetError::LineCount(n)),
    }
}

/// Parse one satellite's element text into an orbital state.
pub fn parse_tle(tle: &str) -> Result<OrbitalState, ElementSetError> {
    parse_element_set(&parse_tle_lines(tle)?)
}

/// Parse multi-satellite TLE content. Unknown lines are skipped.
pub fn split_element_sets(content: &str) -> Vec<RawElementSet> {
    let lines: Vec<&str> = content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    let mut result = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].starts_with("1 ") && i + 1 < lines.len() && lines[i + 1].starts_with("2 ") {
            result.push(RawElementSet::new(None, lines[i], lines[i + 1]));
            i += 2;
        } else if i + 2 < lines.len()
            && lines[i + 1].starts_with("1 ")
            && lines[i + 2].starts_with("2 ")
        {
            result.push(RawElementSet::new(
                Some(clean_name(lines[i])),
                lines[i + 1],
                lines[i + 2],
            ));
            i += 3;
        } else {
            log::debug!("skipping unrecognised element line {:?}", lines[i]);
            i += 1;
        }
    }

    result
}

/// Validate and decode a raw element set.
pub fn parse_element_set(raw: &RawElementSet) -> Result<OrbitalState, ElementSetError> {
    let line1 = raw.line1.trim_end();
    let line2 = raw.line2.trim_end();
    check_line(line1, 1)?;
    check_line(line2, 2)?;

    let norad1 = parse_u32("catalog number", &line1[2..7])?;
    let norad2 = parse_u32("catalog number", &line2[2..7])?;
    if norad1 != norad2 {
        return Err(ElementSetError::CatalogMismatch {
            line1: norad1,
            line2: norad2,
        });
    }

    let epoch = parse_epoch(&line1[18..32])?;
    let mean_motion_dot = parse_f64("mean motion derivative", &line1[33..43])?;
    let drag_term = parse_implied_exponent("drag term", &line1[53..61])?;
    let element_set_number = parse_u32("element set number", &line1[64..68]).unwrap_or(0);

    let inclination_deg = parse_f64("inclination", &line2[8..16])?;
    let raan_deg = parse_f64("right ascension", &line2[17..25])?;
    let eccentricity = parse_f64("eccentricity", &format!("0.{}", line2[26..33].trim()))?;
    let arg_perigee_deg = parse_f64("argument of perigee", &line2[34..42])?;
    let mean_anomaly_deg = parse_f64("mean anomaly", &line2[43..51])?;
    let mean_motion = parse_f64("mean motion", &line2[52..63])?;

    check_range("inclination", inclination_deg, |v| (0.0..=180.0).contains(&v))?;
    check_range("right ascension", raan_deg, |v| (0.0..360.0).contains(&v))?;
    check_range("eccentricity", eccentricity, |v| (0.0..1.0).contains(&v))?;
    check_range("argument of perigee", arg_perigee_deg, |v| (0.0..360.0).contains(&v))?;
    check_range("mean anomaly", mean_anomaly_deg, |v| (0.0..360.0).contains(&v))?;
    check_range("mean motion", mean_motion, |v| v > 0.0)?;

    // The propagator is seeded from these lines later; reject anything it would not accept.
    Elements::from_tle(raw.name.clone(), line1.as_bytes(), line2.as_bytes())?;

    Ok(OrbitalState {
        norad_id: norad1,
        name: raw.name.clone(),
        epoch,
        inclination_deg,
        raan_deg,
        eccentricity,
        arg_perigee_deg,
        mean_anomaly_deg,
        mean_motion,
        mean_motion_dot,
        drag_term,
        element_set_number,
        line1: line1.to_string(),
        line2: line2.to_string(),
    })
}

/// Modulo-10 sum of digits, '-' counting as one.
pub fn checksum(line: &str) -> u32 {
    line.bytes()
        .take(LINE_LEN - 1)
        .map(|b| match b {
            b'0'..=b'9' => (b - b'0') as u32,
            b'-' => 1,
            _ => 0,
        })
        .sum::<u32>()
        % 10
}

fn clean_name(line: &str) -> String {
    line.strip_prefix("0 ").unwrap_or(line).trim().to_string()
}

fn check_line(line: &str, number: u8) -> Result<(), ElementSetError> {
    if !line.is_ascii() {
        return Err(ElementSetError::NonAscii { line: number });
    }
    if line.len() != LINE_LEN {
        return Err(ElementSetError::LineLength {
            line: number,
            len: line.len(),
        });
    }
    let prefix = [b'0' + number, b' '];
    if !line.as_bytes().starts_with(&prefix) {
        return Err(ElementSetError::LineNumber { line: number });
    }

    let expected = checksum(line);
    let found = match line.as_bytes()[LINE_LEN - 1] {
        b @ b'0'..=b'9' => (b - b'0') as u32,
        _ => {
            return Err(ElementSetError::NonNumeric {
                field: "checksum",
                value: line[LINE_LEN - 1..].to_string(),
            })
        }
    };
    if expected != found {
        return Err(ElementSetError::Checksum {
            line: number,
            expected,
            found,
        });
    }
    Ok(())
}

fn parse_f64(field: &'static str, s: &str) -> Result<f64, ElementSetError> {
    let trimmed = s.trim();
    // ".00000000" / "-.00000132" style fields
    let normalized = match trimmed.strip_prefix('-') {
        Some(rest) if rest.starts_with('.') => format!("-0{}", rest),
        _ if trimmed.starts_with('.') => format!("0{}", trimmed),
        _ => trimmed.to_string(),
    };
    normalized
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ElementSetError::NonNumeric {
            field,
            value: s.to_string(),
        })
}

fn check_range(
    field: &'static str,
    value: f64,
    valid: impl Fn(f64) -> bool,
) -> Result<(), ElementSetError> {
    if valid(value) {
        Ok(())
    } else {
        Err(ElementSetError::OutOfRange { field, value })
    }
}

fn parse_u32(field: &'static str, s: &str) -> Result<u32, ElementSetError> {
    s.trim().parse().map_err(|_| ElementSetError::NonNumeric {
        field,
        value: s.to_string(),
    })
}

/// Fields like " 12345-4" meaning 0.12345e-4.
fn parse_implied_exponent(field: &'static str, s: &str) -> Result<f64, ElementSetError> {
    let err = || ElementSetError::NonNumeric {
        field,
        value: s.to_string(),
    };
    let trimmed = s.trim();
    if trimmed.len() < 3 {
        return Err(err());
    }
    let (sign, body) = match trimmed.as_bytes()[0] {
        b'-' => (-1.0, &trimmed[1..]),
        b'+' => (1.0, &trimmed[1..]),
        _ => (1.0, trimmed),
    };
    let split = body.len().checked_sub(2).ok_or_else(err)?;
    let (mantissa, exponent) = body.split_at(split);
    let mantissa: f64 = format!("0.{}", mantissa).parse().map_err(|_| err())?;
    let exponent: i32 = exponent.parse().map_err(|_| err())?;
    Ok(sign * mantissa * 10f64.powi(exponent))
}

fn parse_epoch(s: &str) -> Result<DateTime<Utc>, ElementSetError> {
    let err = || ElementSetError::Epoch(s.to_string());
    let yy: i32 = s[..2].trim().parse().map_err(|_| err())?;
    let day: f64 = s[2..].trim().parse().map_err(|_| err())?;
    let year = if yy < 57 { 2000 + yy } else { 1900 + yy };
    if !(1.0..367.0).contains(&day) {
        return Err(err());
    }

    let start = NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(err)?
        .and_utc();
    let micros = ((day - 1.0) * 86_400_000_000.0).round() as i64;
    Ok(start + Duration::microseconds(micros))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::{TimeZone, Timelike};

    const ISS: &str = "ISS (ZARYA)
1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927
2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";

    const NAVIC: &str = include_str!("../../testdata/navic_2024.tle");

    #[test]
    fn parses_reference_element_set() {
        let state = parse_tle(ISS).unwrap();
        assert_eq!(state.norad_id, 25544);
        assert_eq!(state.name.as_deref(), Some("ISS (ZARYA)"));
        assert_abs_diff_eq!(state.inclination_deg, 51.6416, epsilon = 1e-9);
        assert_abs_diff_eq!(state.raan_deg, 247.4627, epsilon = 1e-9);
        assert_abs_diff_eq!(state.eccentricity, 0.0006703, epsilon = 1e-12);
        assert_abs_diff_eq!(state.arg_perigee_deg, 130.5360, epsilon = 1e-9);
        assert_abs_diff_eq!(state.mean_anomaly_deg, 325.0288, epsilon = 1e-9);
        assert_abs_diff_eq!(state.mean_motion, 15.72125391, epsilon = 1e-9);
        assert_abs_diff_eq!(state.mean_motion_dot, -0.00002182, epsilon = 1e-12);
        assert_abs_diff_eq!(state.drag_term, -0.11606e-4, epsilon = 1e-12);
        assert_eq!(state.element_set_number, 292);
    }

    #[test]
    fn parses_epoch_to_the_microsecond() {
        let state = parse_tle(ISS).unwrap();
        let expected = Utc.with_ymd_and_hms(2008, 9, 20, 12, 25, 40).unwrap();
        assert_eq!(state.epoch.with_nanosecond(0).unwrap(), expected);
        assert_eq!(state.epoch.nanosecond() / 1000, 104_192);
    }

    #[test]
    fn two_line_block_has_no_name() {
        let two_lines: String = ISS.lines().skip(1).collect::<Vec<_>>().join("\n");
        let state = parse_tle(&two_lines).unwrap();
        assert_eq!(state.name, None);
    }

    #[test]
    fn rejects_bad_checksum() {
        let tampered = ISS.replace("0  2927", "0  2928");
        let err = parse_tle(&tampered).unwrap_err();
        assert!(matches!(err, ElementSetError::Checksum { line: 1, .. }));
    }

    const ISS_LINE1: &str =
        "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927";

    /// Replace the checksum column so only the tampered field is wrong.
    fn resign(line: &str) -> String {
        format!("{}{}", &line[..68], checksum(line))
    }

    #[test]
    fn rejects_non_numeric_field_with_valid_checksum() {
        let line2 = resign("2 25544  51.6416 247.4627 0006703 130.5360 325.0288 1X.72125391563537");
        let raw = RawElementSet::new(None, ISS_LINE1, line2);
        let err = parse_element_set(&raw).unwrap_err();
        assert!(matches!(err, ElementSetError::NonNumeric { field: "mean motion", .. }));
    }

    #[test]
    fn rejects_wrong_line_count_and_length() {
        assert_eq!(
            parse_tle("only one line").unwrap_err(),
            ElementSetError::LineCount(1)
        );
        let raw = RawElementSet::new(None, "1 25544U", "2 25544");
        assert!(matches!(
            parse_element_set(&raw).unwrap_err(),
            ElementSetError::LineLength { line: 1, len: 8 }
        ));
    }

    #[test]
    fn rejects_catalog_mismatch() {
        let line2 = resign("2 25545  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537");
        let raw = RawElementSet::new(None, ISS_LINE1, line2);
        assert_eq!(
            parse_element_set(&raw).unwrap_err(),
            ElementSetError::CatalogMismatch {
                line1: 25544,
                line2: 25545
            }
        );
    }

    #[test]
    fn rejects_inclination_out_of_range() {
        let line2 = resign("2 25544 181.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537");
        let raw = RawElementSet::new(None, ISS_LINE1, line2);
        assert!(matches!(
            parse_element_set(&raw).unwrap_err(),
            ElementSetError::OutOfRange { field: "inclination", .. }
        ));
    }

    #[test]
    fn checksum_counts_minus_as_one() {
        assert_eq!(checksum(ISS_LINE1), 7);
    }

    #[test]
    fn splits_mixed_documents() {
        let doc = format!("garbage\n{}\n\n{}", NAVIC, ISS.lines().skip(1).collect::<Vec<_>>().join("\n"));
        let sets = split_element_sets(&doc);
        assert_eq!(sets.len(), 8);
        assert_eq!(sets[0].name.as_deref(), Some("IRNSS-1B"));
        assert_eq!(sets[7].name, None);
        assert!(sets.iter().all(|s| parse_element_set(s).is_ok()));
    }

    #[test]
    fn geosynchronous_altitude_from_mean_motion() {
        let sets = split_element_sets(NAVIC);
        let state = parse_element_set(&sets[1]).unwrap();
        assert_eq!(state.norad_id, 40269);
        assert_abs_diff_eq!(state.semi_major_axis_km(), 42_164.2, epsilon = 1.0);
        assert_abs_diff_eq!(state.altitude_km(), 35_786.0, epsilon = 1.5);
    }
}
