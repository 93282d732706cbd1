//! Monthly salary computation
//!
//! Salary is derived from a staff member's salary profile and the month's
//! attendance rows:
//!
//! - incentive = sales × incentive_percentage / 100 when sales reach the target
//! - deduction depends on the configured [`DeductionPolicy`]
//! - final salary = max(0, base + incentive − deduction)

use serde::{Deserialize, Serialize};

use super::attendance::{AttendanceRecord, AttendanceStatus};
use super::money::round_money;

/// Salary is prorated over a fixed 30-day month
pub const SALARY_DAYS_PER_MONTH: f64 = 30.0;

/// Equivalent absences forgiven each month before deductions start
pub const FREE_ABSENCE_ALLOWANCE: f64 = 1.0;

/// How absences reduce pay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeductionPolicy {
    /// Absences plus half of half-days, minus one free absence, at base/30 per day
    #[default]
    EquivalentAbsent,
    /// Absences are never deducted
    Legacy,
}

impl DeductionPolicy {
    /// Number of days that are actually deducted under this policy
    pub fn deductible_days(self, attendance: &AttendanceSummary) -> f64 {
        match self {
            DeductionPolicy::EquivalentAbsent => {
                (attendance.equivalent_absents() - FREE_ABSENCE_ALLOWANCE).max(0.0)
            }
            DeductionPolicy::Legacy => 0.0,
        }
    }
}

impl std::fmt::Display for DeductionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeductionPolicy::EquivalentAbsent => write!(f, "equivalent_absent"),
            DeductionPolicy::Legacy => write!(f, "legacy"),
        }
    }
}

impl std::str::FromStr for DeductionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "equivalent_absent" => Ok(DeductionPolicy::EquivalentAbsent),
            "legacy" => Ok(DeductionPolicy::Legacy),
            _ => Err(format!("Unknown deduction policy: {}", s)),
        }
    }
}

/// Salary parameters of a staff member
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SalaryProfile {
    pub base_salary: f64,
    pub target_amount: f64,
    pub incentive_percentage: f64,
}

impl SalaryProfile {
    /// Incentive earned for a month's sales; zero below target
    pub fn incentive(&self, sales: f64) -> f64 {
        if sales >= self.target_amount {
            round_money(sales * self.incentive_percentage / 100.0)
        } else {
            0.0
        }
    }

    pub fn daily_salary(&self) -> f64 {
        self.base_salary / SALARY_DAYS_PER_MONTH
    }
}

/// Per-status counts and totals over a month of attendance
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttendanceSummary {
    pub recorded_days: u32,
    pub present_days: u32,
    pub absent_days: u32,
    pub half_days: u32,
    pub late_days: u32,
    pub holidays: u32,
    pub total_work_hours: f64,
    pub total_sales: f64,
}

impl AttendanceSummary {
    pub fn from_records(records: &[AttendanceRecord]) -> Self {
        let mut summary = AttendanceSummary::default();
        for record in records {
            summary.recorded_days += 1;
            match record.status {
                AttendanceStatus::Present => summary.present_days += 1,
                AttendanceStatus::Absent => summary.absent_days += 1,
                AttendanceStatus::HalfDay => summary.half_days += 1,
                AttendanceStatus::Late => summary.late_days += 1,
                AttendanceStatus::Holiday => summary.holidays += 1,
            }
            summary.total_work_hours += record.work_hours;
            summary.total_sales += record.sales_amount;
        }
        summary.total_work_hours = round_money(summary.total_work_hours);
        summary.total_sales = round_money(summary.total_sales);
        summary
    }

    /// Absences with each half-day counting as half an absence
    pub fn equivalent_absents(&self) -> f64 {
        self.absent_days as f64 + self.half_days as f64 / 2.0
    }
}

/// A computed monthly salary with every intermediate figure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryBreakdown {
    pub policy: DeductionPolicy,
    pub base_salary: f64,
    pub target_amount: f64,
    pub incentive_percentage: f64,
    pub total_sales: f64,
    pub target_met: bool,
    pub incentive: f64,
    pub daily_salary: f64,
    pub equivalent_absents: f64,
    pub deductible_absents: f64,
    pub deduction: f64,
    pub final_salary: f64,
    pub attendance: AttendanceSummary,
}

impl SalaryBreakdown {
    pub fn compute(
        profile: &SalaryProfile,
        attendance: AttendanceSummary,
        policy: DeductionPolicy,
    ) -> Self {
        let total_sales = attendance.total_sales;
        let incentive = profile.incentive(total_sales);
        let daily_salary = profile.daily_salary();
        let deductible_absents = policy.deductible_days(&attendance);
        let deduction = round_money(deductible_absents * daily_salary);
        let final_salary = round_money((profile.base_salary + incentive - deduction).max(0.0));

        Self {
            policy,
            base_salary: profile.base_salary,
            target_amount: profile.target_amount,
            incentive_percentage: profile.incentive_percentage,
            total_sales,
            target_met: total_sales >= profile.target_amount,
            incentive,
            daily_salary: round_money(daily_salary),
            equivalent_absents: attendance.equivalent_absents(),
            deductible_absents,
            deduction,
            final_salary,
            attendance,
        }
    }
}
