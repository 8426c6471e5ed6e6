//! Per-day append-only attendance ledger with a daily cap.
//!
//! One CSV file per calendar date, named `attendance_YYYY-MM-DD.csv`.
//! The first row is always the header `Name,Time`; data rows are
//! `identity,HH:MM:SS` in append order. Files are created lazily on the
//! first mark of the day.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Fixed header row of every ledger file.
const LEDGER_HEADER: &str = "Name,Time";

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("ledger io: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed ledger row at line {line}: {row:?}")]
    Malformed { line: usize, row: String },
}

/// Result of a mark attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    Marked,
    /// The identity already holds `daily_cap` records for this date;
    /// nothing was written.
    LimitReached,
}

/// Attendance ledger rooted at a directory, one file per date.
pub struct AttendanceLedger {
    dir: PathBuf,
    daily_cap: usize,
}

impl AttendanceLedger {
    pub fn new(dir: impl Into<PathBuf>, daily_cap: usize) -> Self {
        Self {
            dir: dir.into(),
            daily_cap,
        }
    }

    pub fn daily_cap(&self) -> usize {
        self.daily_cap
    }

    /// Path of the ledger file for `date`.
    pub fn ledger_path(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("attendance_{}.csv", date.format("%Y-%m-%d")))
    }

    /// Count of records for `identity` on `date`. Absent file counts as 0;
    /// a data row without the `identity,HH:MM:SS` shape is `Malformed`.
    /// Identity comparison is exact and case-sensitive — ledger rows hold
    /// the string the matcher returned, unnormalized.
    pub fn count_on(&self, identity: &str, date: NaiveDate) -> Result<usize, LedgerError> {
        let path = self.ledger_path(date);
        let contents = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(LedgerError::Io(e)),
        };

        let mut count = 0;
        for (i, line) in contents.lines().enumerate().skip(1) {
            if line.is_empty() {
                continue;
            }
            let Some((name, _time)) = line.split_once(',') else {
                return Err(LedgerError::Malformed {
                    line: i + 1,
                    row: line.to_string(),
                });
            };
            if name == identity {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Append a record for `identity` at `timestamp`, unless the identity
    /// is already at the daily cap for the timestamp's date.
    ///
    /// Lazily creates the day's file with its header; header and first row
    /// go out in a single write so a fresh file is never left headerless.
    pub fn mark(
        &self,
        identity: &str,
        timestamp: NaiveDateTime,
    ) -> Result<MarkOutcome, LedgerError> {
        let date = timestamp.date();
        let count = self.count_on(identity, date)?;
        if count >= self.daily_cap {
            tracing::warn!(
                identity,
                count,
                cap = self.daily_cap,
                "attendance limit reached; not marking"
            );
            return Ok(MarkOutcome::LimitReached);
        }

        fs::create_dir_all(&self.dir)?;
        let path = self.ledger_path(date);
        let existed = path.exists();

        let mut record = String::new();
        if !existed {
            record.push_str(LEDGER_HEADER);
            record.push('\n');
        }
        record.push_str(identity);
        record.push(',');
        record.push_str(&timestamp.format("%H:%M:%S").to_string());
        record.push('\n');

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(record.as_bytes())?;

        tracing::info!(identity, %date, "attendance marked");
        Ok(MarkOutcome::Marked)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn ts(date: NaiveDate, h: u32, m: u32, s: u32) -> NaiveDateTime {
        date.and_time(NaiveTime::from_hms_opt(h, m, s).unwrap())
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 28).unwrap()
    }

    #[test]
    fn test_count_absent_file_is_zero() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = AttendanceLedger::new(dir.path(), 2);
        assert_eq!(ledger.count_on("alice", date()).unwrap(), 0);
    }

    #[test]
    fn test_first_mark_creates_file_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = AttendanceLedger::new(dir.path().join("attendance"), 2);

        let outcome = ledger.mark("alice", ts(date(), 9, 0, 0)).unwrap();
        assert_eq!(outcome, MarkOutcome::Marked);

        let contents = fs::read_to_string(ledger.ledger_path(date())).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines, vec!["Name,Time", "alice,09:00:00"]);
    }

    #[test]
    fn test_header_stays_first_across_appends() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = AttendanceLedger::new(dir.path(), 5);

        ledger.mark("alice", ts(date(), 9, 0, 0)).unwrap();
        ledger.mark("bob", ts(date(), 9, 5, 0)).unwrap();
        ledger.mark("alice", ts(date(), 10, 0, 0)).unwrap();

        let contents = fs::read_to_string(ledger.ledger_path(date())).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "Name,Time");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_cap_enforced_and_no_row_appended_beyond_it() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = AttendanceLedger::new(dir.path(), 2);

        assert_eq!(ledger.mark("alice", ts(date(), 9, 0, 0)).unwrap(), MarkOutcome::Marked);
        assert_eq!(ledger.mark("alice", ts(date(), 10, 0, 0)).unwrap(), MarkOutcome::Marked);
        // (cap+1)-th attempt: refused, ledger unchanged
        assert_eq!(
            ledger.mark("alice", ts(date(), 11, 0, 0)).unwrap(),
            MarkOutcome::LimitReached
        );
        assert_eq!(ledger.count_on("alice", date()).unwrap(), 2);

        let contents = fs::read_to_string(ledger.ledger_path(date())).unwrap();
        assert_eq!(contents.lines().count(), 3); // header + 2 rows
    }

    #[test]
    fn test_cap_never_exceeded_under_repeated_marks() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = AttendanceLedger::new(dir.path(), 2);

        for hour in 6..18 {
            ledger.mark("alice", ts(date(), hour, 0, 0)).unwrap();
        }
        assert_eq!(ledger.count_on("alice", date()).unwrap(), 2);
    }

    #[test]
    fn test_cap_is_per_identity() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = AttendanceLedger::new(dir.path(), 2);

        ledger.mark("alice", ts(date(), 9, 0, 0)).unwrap();
        ledger.mark("alice", ts(date(), 10, 0, 0)).unwrap();
        assert_eq!(ledger.mark("bob", ts(date(), 11, 0, 0)).unwrap(), MarkOutcome::Marked);
    }

    #[test]
    fn test_cap_is_per_date() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = AttendanceLedger::new(dir.path(), 2);
        let next = date().succ_opt().unwrap();

        ledger.mark("alice", ts(date(), 9, 0, 0)).unwrap();
        ledger.mark("alice", ts(date(), 10, 0, 0)).unwrap();
        assert_eq!(ledger.mark("alice", ts(next, 9, 0, 0)).unwrap(), MarkOutcome::Marked);
        assert!(ledger.ledger_path(next).exists());
    }

    #[test]
    fn test_identity_match_is_case_sensitive() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = AttendanceLedger::new(dir.path(), 2);

        ledger.mark("Alice", ts(date(), 9, 0, 0)).unwrap();
        assert_eq!(ledger.count_on("Alice", date()).unwrap(), 1);
        assert_eq!(ledger.count_on("alice", date()).unwrap(), 0);
    }

    #[test]
    fn test_malformed_row_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = AttendanceLedger::new(dir.path(), 2);
        fs::write(
            ledger.ledger_path(date()),
            "Name,Time\nalice,09:00:00\nno-comma-here\n",
        )
        .unwrap();

        match ledger.count_on("alice", date()) {
            Err(LedgerError::Malformed { line, row }) => {
                assert_eq!(line, 3);
                assert_eq!(row, "no-comma-here");
            }
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn test_file_name_keyed_by_date() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = AttendanceLedger::new(dir.path(), 2);
        assert_eq!(
            ledger.ledger_path(date()).file_name().unwrap(),
            "attendance_2026-08-28.csv"
        );
    }
}
