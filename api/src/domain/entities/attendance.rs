//! Attendance domain entity
//!
//! One record per user per calendar date. Work hours default from the
//! status when the caller does not supply them.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::organization::OrganizationId;
use super::user::UserId;
use crate::error::DomainError;

uuid_id!(
    /// Unique identifier for an attendance record
    AttendanceId
);

/// Attendance status for a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    HalfDay,
    Late,
    Holiday,
}

impl AttendanceStatus {
    /// Hours credited for the day when none are recorded explicitly
    pub fn default_work_hours(self) -> f64 {
        match self {
            AttendanceStatus::Present => 8.0,
            AttendanceStatus::HalfDay => 4.0,
            AttendanceStatus::Late => 7.0,
            AttendanceStatus::Absent | AttendanceStatus::Holiday => 0.0,
        }
    }

    /// Resolve the hours to store: an explicit value wins over the default
    pub fn work_hours_or_default(self, explicit: Option<f64>) -> f64 {
        explicit.unwrap_or_else(|| self.default_work_hours())
    }
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttendanceStatus::Present => write!(f, "present"),
            AttendanceStatus::Absent => write!(f, "absent"),
            AttendanceStatus::HalfDay => write!(f, "half_day"),
            AttendanceStatus::Late => write!(f, "late"),
            AttendanceStatus::Holiday => write!(f, "holiday"),
        }
    }
}

impl std::str::FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "present" => Ok(AttendanceStatus::Present),
            "absent" => Ok(AttendanceStatus::Absent),
            "half_day" => Ok(AttendanceStatus::HalfDay),
            "late" => Ok(AttendanceStatus::Late),
            "holiday" => Ok(AttendanceStatus::Holiday),
            _ => Err(format!("Unknown attendance status: {}", s)),
        }
    }
}

/// A stored attendance record
#[derive(Debug, Clone, Serialize)]
pub struct AttendanceRecord {
    pub id: AttendanceId,
    pub organization_id: OrganizationId,
    pub user_id: UserId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub work_hours: f64,
    pub sales_amount: f64,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
    pub notes: Option<String>,
    pub marked_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

/// Data needed to mark attendance; an existing record for the same
/// user and date is replaced
#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub organization_id: OrganizationId,
    pub user_id: UserId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub work_hours: f64,
    pub sales_amount: f64,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
    pub notes: Option<String>,
    pub marked_by: Option<UserId>,
}

/// Partial update of an attendance record
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttendanceUpdate {
    pub status: Option<AttendanceStatus>,
    pub work_hours: Option<f64>,
    pub sales_amount: Option<f64>,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
    pub notes: Option<String>,
}

/// Inclusive date range used to query attendance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendanceFilter {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// A calendar month, parsed from `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
}

impl MonthRange {
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let invalid =
            || DomainError::Validation(format!("Invalid month '{}', expected YYYY-MM", value));

        // Exactly YYYY-MM: no sign, padding or single-digit month
        let bytes = value.as_bytes();
        let well_formed = bytes.len() == 7
            && bytes[4] == b'-'
            && bytes[..4].iter().all(u8::is_ascii_digit)
            && bytes[5..].iter().all(u8::is_ascii_digit);
        if !well_formed {
            return Err(invalid());
        }
        let year: i32 = value[..4].parse().map_err(|_| invalid())?;
        let month: u32 = value[5..].parse().map_err(|_| invalid())?;

        let first_day = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        Ok(Self::containing(first_day))
    }

    /// The month a given date falls in
    pub fn containing(date: NaiveDate) -> Self {
        let first_day = date.with_day(1).unwrap_or(date);
        let next_month = if first_day.month() == 12 {
            NaiveDate::from_ymd_opt(first_day.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(first_day.year(), first_day.month() + 1, 1)
        };
        let last_day = next_month
            .and_then(|d| d.pred_opt())
            .unwrap_or(first_day);
        Self {
            first_day,
            last_day,
        }
    }

    pub fn as_filter(&self) -> AttendanceFilter {
        AttendanceFilter {
            from: self.first_day,
            to: self.last_day,
        }
    }

    pub fn label(&self) -> String {
        self.first_day.format("%Y-%m").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_hours_per_status() {
        assert_eq!(AttendanceStatus::Present.default_work_hours(), 8.0);
        assert_eq!(AttendanceStatus::HalfDay.default_work_hours(), 4.0);
        assert_eq!(AttendanceStatus::Late.default_work_hours(), 7.0);
        assert_eq!(AttendanceStatus::Absent.default_work_hours(), 0.0);
        assert_eq!(AttendanceStatus::Holiday.default_work_hours(), 0.0);
    }

    #[test]
    fn explicit_hours_override_default() {
        assert_eq!(AttendanceStatus::Present.work_hours_or_default(Some(9.5)), 9.5);
        assert_eq!(AttendanceStatus::Absent.work_hours_or_default(Some(2.0)), 2.0);
        assert_eq!(AttendanceStatus::Late.work_hours_or_default(None), 7.0);
    }

    #[test]
    fn status_serde_uses_snake_case() {
        let json = serde_json::to_string(&AttendanceStatus::HalfDay).unwrap();
        assert_eq!(json, "\"half_day\"");
        let parsed: AttendanceStatus = serde_json::from_str("\"holiday\"").unwrap();
        assert_eq!(parsed, AttendanceStatus::Holiday);
    }

    #[test]
    fn month_range_regular_month() {
        let range = MonthRange::parse("2024-04").unwrap();
        assert_eq!(range.first_day, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        assert_eq!(range.last_day, NaiveDate::from_ymd_opt(2024, 4, 30).unwrap());
        assert_eq!(range.label(), "2024-04");
    }

    #[test]
    fn month_range_leap_february_and_december() {
        let feb = MonthRange::parse("2024-02").unwrap();
        assert_eq!(feb.last_day, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        let dec = MonthRange::parse("2023-12").unwrap();
        assert_eq!(dec.last_day, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }

    #[test]
    fn month_range_rejects_garbage() {
        assert!(MonthRange::parse("2024").is_err());
        assert!(MonthRange::parse("2024-13").is_err());
        assert!(MonthRange::parse("abcd-01").is_err());
    }

    #[test]
    fn month_range_requires_exact_shape() {
        for value in ["2024-4", "+2024-04", " 2024-05", "2024-05 ", "2024-005", "02024-05"] {
            assert!(MonthRange::parse(value).is_err(), "accepted {:?}", value);
        }
    }
}
