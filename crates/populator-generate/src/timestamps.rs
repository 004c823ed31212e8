//! Back-dating of generated files so the tree looks lived-in.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use filetime::FileTime;
use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};
use regex::{Captures, Regex};

const MAX_DAYS_BACK: i64 = 730;
const MAX_ACCESS_DELAY_SECS: i64 = 30 * 86_400;
const BUSINESS_HOUR_PROBABILITY: f64 = 0.8;
const OFF_HOURS: &[u32] = &[0, 1, 2, 3, 4, 5, 6, 7, 18, 19, 20, 21, 22, 23];

/// Modification and access times for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileTimes {
    pub modified: NaiveDateTime,
    pub accessed: NaiveDateTime,
}

type Extractor = fn(&Captures<'_>) -> Option<(i32, u32, u32)>;

fn group(caps: &Captures<'_>, index: usize) -> Option<u32> {
    caps.get(index)?.as_str().parse().ok()
}

fn patterns() -> &'static [(Regex, Extractor)] {
    static PATTERNS: OnceLock<Vec<(Regex, Extractor)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let table: [(&str, Extractor); 5] = [
            // YYYY-MM-DD / YYYY_MM_DD
            (r"(\d{4})[-_](\d{2})[-_](\d{2})", |c| {
                Some((group(c, 1)? as i32, group(c, 2)?, group(c, 3)?))
            }),
            // YYYYMMDD
            (r"(\d{4})(\d{2})(\d{2})", |c| {
                Some((group(c, 1)? as i32, group(c, 2)?, group(c, 3)?))
            }),
            // MMDDYYYY
            (r"(\d{2})(\d{2})(\d{4})", |c| {
                Some((group(c, 3)? as i32, group(c, 1)?, group(c, 2)?))
            }),
            // YYYYMM, first of the month
            (r"(\d{4})(\d{2})(?:\D|$)", |c| Some((group(c, 1)? as i32, group(c, 2)?, 1))),
            // Q<n>_YYYY, middle of the quarter's last month
            (r"Q([1-4])[-_](\d{4})", |c| Some((group(c, 2)? as i32, group(c, 1)? * 3, 15))),
        ];
        table
            .into_iter()
            .filter_map(|(pattern, extract)| Regex::new(pattern).ok().map(|re| (re, extract)))
            .collect()
    })
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    u32::try_from((next - first).num_days()).ok()
}

/// Find a plausible date embedded in a file name.
///
/// Years outside 2000-2030 and impossible months are ignored; days past the
/// end of the month are clamped to its last day.
pub fn extract_date_from_filename(file_name: &str) -> Option<NaiveDate> {
    patterns().iter().find_map(|(pattern, extract)| {
        let caps = pattern.captures(file_name)?;
        let (year, month, day) = extract(&caps)?;
        if !(2000..=2030).contains(&year) || !(1..=12).contains(&month) || !(1..=31).contains(&day)
        {
            return None;
        }
        let day = day.min(days_in_month(year, month)?);
        NaiveDate::from_ymd_opt(year, month, day)
    })
}

/// Pick modification and access times for `file_name`.
///
/// The day comes from the name when it carries one, otherwise 1 to 730 days
/// before `reference_date`. Neither time is later than `now`.
pub fn plan_file_times(
    file_name: &str,
    reference_date: NaiveDate,
    now: NaiveDateTime,
    rng: &mut dyn RngCore,
) -> FileTimes {
    let date = extract_date_from_filename(file_name)
        .unwrap_or_else(|| reference_date - Duration::days(rng.random_range(1..=MAX_DAYS_BACK)));

    let hour = if rng.random_bool(BUSINESS_HOUR_PROBABILITY) {
        rng.random_range(8..=17)
    } else {
        OFF_HOURS.choose(rng).copied().unwrap_or(20)
    };
    let time = NaiveTime::from_hms_opt(hour, rng.random_range(0..60), rng.random_range(0..60))
        .unwrap_or(NaiveTime::MIN);

    let modified = date.and_time(time).min(now);
    let accessed =
        (modified + Duration::seconds(rng.random_range(0..=MAX_ACCESS_DELAY_SECS))).min(now);

    FileTimes { modified, accessed }
}

fn to_file_time(value: NaiveDateTime) -> FileTime {
    let seconds = Local
        .from_local_datetime(&value)
        .earliest()
        .map(|local| local.timestamp())
        .unwrap_or_else(|| value.and_utc().timestamp());
    FileTime::from_unix_time(seconds, 0)
}

/// Set mtime/atime on `path`. A missing file is skipped.
pub async fn apply_file_times(path: PathBuf, times: FileTimes) -> io::Result<()> {
    tokio::task::spawn_blocking(move || set_times_blocking(&path, times))
        .await
        .map_err(io::Error::other)?
}

fn set_times_blocking(path: &Path, times: FileTimes) -> io::Result<()> {
    if !path.exists() {
        return Ok(());
    }
    filetime::set_file_times(path, to_file_time(times.accessed), to_file_time(times.modified))
}

/// Upper bound for generated times: the end of `reference_date`, or now if earlier.
pub fn timestamp_ceiling(reference_date: NaiveDate) -> NaiveDateTime {
    let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    reference_date
        .and_time(end_of_day)
        .min(Local::now().naive_local())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn extracts_supported_formats() {
        assert_eq!(extract_date_from_filename("Budget_2024-03-11.xlsx"), Some(date(2024, 3, 11)));
        assert_eq!(extract_date_from_filename("Budget_2024_03_11.xlsx"), Some(date(2024, 3, 11)));
        assert_eq!(extract_date_from_filename("Invoice_20230105_v2.pdf"), Some(date(2023, 1, 5)));
        assert_eq!(extract_date_from_filename("Memo_06302024.docx"), Some(date(2024, 6, 30)));
        assert_eq!(extract_date_from_filename("Report_202311.pdf"), Some(date(2023, 11, 1)));
        assert_eq!(extract_date_from_filename("Review_Q2_2024.pptx"), Some(date(2024, 6, 15)));
    }

    #[test]
    fn rejects_names_without_dates() {
        assert_eq!(extract_date_from_filename("Policy_final.docx"), None);
        assert_eq!(extract_date_from_filename("Budget_v3.2.xlsx"), None);
        assert_eq!(extract_date_from_filename("Archive_1999-01-01.txt"), None);
    }

    #[test]
    fn clamps_day_to_month_length() {
        assert_eq!(extract_date_from_filename("x_2023-02-31.txt"), Some(date(2023, 2, 28)));
        assert_eq!(extract_date_from_filename("x_2024-02-30.txt"), Some(date(2024, 2, 29)));
        assert_eq!(extract_date_from_filename("x_2024-04-31.txt"), Some(date(2024, 4, 30)));
    }

    #[test]
    fn planned_times_stay_in_window() {
        let reference = date(2024, 6, 30);
        let now = reference.and_hms_opt(12, 0, 0).expect("valid time");
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        for _ in 0..500 {
            let times = plan_file_times("Policy_final.docx", reference, now, &mut rng);
            assert!(times.modified <= now);
            assert!(times.accessed <= now);
            assert!(times.accessed >= times.modified);
            assert!(times.modified.date() >= reference - Duration::days(MAX_DAYS_BACK));
        }
    }

    #[test]
    fn planned_times_follow_embedded_date() {
        let reference = date(2024, 6, 30);
        let now = reference.and_hms_opt(23, 0, 0).expect("valid time");
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let times = plan_file_times("Budget_2024-03-11_v2.1.xlsx", reference, now, &mut rng);
        assert_eq!(times.modified.date(), date(2024, 3, 11));
    }

    #[test]
    fn quarter_names_land_in_the_quarter_end_month() {
        let reference = date(2024, 6, 30);
        let now = reference.and_hms_opt(23, 0, 0).expect("valid time");
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let times = plan_file_times("Review_Q3_2023.pptx", reference, now, &mut rng);
        assert_eq!(times.modified.year(), 2023);
        assert_eq!(times.modified.month(), 9);
    }

    #[tokio::test]
    async fn applies_times_to_existing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("a.txt");
        std::fs::write(&path, b"hello").expect("write");
        let modified = date(2023, 1, 2).and_hms_opt(9, 30, 0).expect("valid time");
        let times = FileTimes {
            modified,
            accessed: modified + Duration::days(1),
        };
        apply_file_times(path.clone(), times).await.expect("apply");

        let metadata = std::fs::metadata(&path).expect("metadata");
        let mtime = FileTime::from_last_modification_time(&metadata);
        assert_eq!(mtime, to_file_time(modified));
    }

    #[tokio::test]
    async fn missing_file_is_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let now = Local::now().naive_local();
        let times = FileTimes {
            modified: now,
            accessed: now,
        };
        apply_file_times(dir.path().join("missing.txt"), times)
            .await
            .expect("missing file is not an error");
    }
}
