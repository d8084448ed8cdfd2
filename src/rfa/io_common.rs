use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};

// The formats found in the dumps, tried in this order.
const DATETIME_FORMATS: [&str; 7] = [
    "%H:%M, %d %B %Y",
    "%H:%M, %B %d, %Y",
    "%H:%M %d %B %Y",
    "%H:%M, %Y-%m-%d",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

const DATE_FORMATS: [&str; 3] = ["%d %B %Y", "%B %d, %Y", "%Y-%m-%d"];

pub const OUTPUT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Resolves a path from a configuration file against the directory of that file.
pub fn resolve_path(root: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        root.join(p)
    }
}

/// Parses a timestamp in any of the known formats.
/// Returns None if nothing matches.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    let s = s.strip_suffix("(UTC)").unwrap_or(s).trim_end();
    if s.is_empty() {
        return None;
    }
    for fmt in DATETIME_FORMATS.iter() {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS.iter() {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

pub fn format_timestamp(ts: Option<NaiveDateTime>) -> String {
    ts.map(|t| t.format(OUTPUT_DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// Reads a number the lenient way: `1`, `1.0` and ` 1 ` are all fine.
pub fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|x| x.is_finite())
}

/// A number that must be a whole one.
pub fn parse_integer(s: &str) -> Option<i64> {
    parse_number(s).and_then(|x| {
        if x.fract() == 0.0 {
            Some(x as i64)
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn dump_dates() {
        assert_eq!(
            parse_timestamp("19:53, 25 January 2013"),
            Some(at(2013, 1, 25, 19, 53))
        );
        assert_eq!(
            parse_timestamp("01:02, 3 Feb 2006"),
            Some(at(2006, 2, 3, 1, 2))
        );
        assert_eq!(
            parse_timestamp("23:27, 7 June 2013 (UTC)"),
            Some(at(2013, 6, 7, 23, 27))
        );
        assert_eq!(
            parse_timestamp("14:47, July 1, 2012"),
            Some(at(2012, 7, 1, 14, 47))
        );
        assert_eq!(parse_timestamp("2010-01-03 20:44"), Some(at(2010, 1, 3, 20, 44)));
        assert_eq!(parse_timestamp("5 May 2005"), Some(at(2005, 5, 5, 0, 0)));
        assert_eq!(parse_timestamp("08:15, 2007-05-26"), Some(at(2007, 5, 26, 8, 15)));
        assert_eq!(
            parse_timestamp("2008-05-24T03:29:00"),
            Some(at(2008, 5, 24, 3, 29))
        );
        assert_eq!(parse_timestamp("May 24, 2008"), Some(at(2008, 5, 24, 0, 0)));
        assert_eq!(parse_timestamp("2008-05-24"), Some(at(2008, 5, 24, 0, 0)));
    }

    #[test]
    fn bad_dates() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("25:61, 40 Smarch 2013"), None);
    }

    #[test]
    fn numbers() {
        assert_eq!(parse_integer("1"), Some(1));
        assert_eq!(parse_integer("-1.0"), Some(-1));
        assert_eq!(parse_integer(" 2008 "), Some(2008));
        assert_eq!(parse_integer("0.5"), None);
        assert_eq!(parse_integer("x"), None);
        assert_eq!(parse_integer(""), None);
    }

    #[test]
    fn file_names() {
        assert_eq!(simplify_file_name("/data/wiki-RfA.txt"), "wiki-RfA.txt");
        assert_eq!(
            resolve_path(Path::new("/cfg"), "votes.txt"),
            PathBuf::from("/cfg/votes.txt")
        );
        assert_eq!(
            resolve_path(Path::new("/cfg"), "/abs/votes.txt"),
            PathBuf::from("/abs/votes.txt")
        );
    }
}
