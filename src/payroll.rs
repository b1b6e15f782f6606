//! Derived-field calculators used by the salary and leave forms.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

use crate::models::{SalaryBreakdown, SalaryInput};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayrollError {
    #[error("{0} cannot be negative")]
    NegativeComponent(&'static str),
    #[error("From date cannot be later than to date")]
    InvertedRange { from: NaiveDate, to: NaiveDate },
    #[error("Salary amounts are too large")]
    Overflow,
}

/// Employee EPF contribution, 8% of basic salary.
pub fn epf_employee_rate() -> Decimal {
    Decimal::new(8, 2)
}

/// Employer EPF contribution, 12% of basic salary.
pub fn epf_employer_rate() -> Decimal {
    Decimal::new(12, 2)
}

/// Employer ETF contribution, 3% of basic salary.
pub fn etf_employer_rate() -> Decimal {
    Decimal::new(3, 2)
}

fn share(basic: Decimal, rate: Decimal) -> Result<Decimal, PayrollError> {
    basic.checked_mul(rate).ok_or(PayrollError::Overflow)
}

fn money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// salary_breakdown
///
/// Contributions are computed on the basic salary only. Net salary is gross pay (basic, internet
/// charges and allowances) minus deductions and the employee's EPF share; it is reported as
/// computed even when negative.
pub fn salary_breakdown(input: &SalaryInput) -> Result<SalaryBreakdown, PayrollError> {
    let components = [
        ("basic_salary", input.basic_salary),
        ("internet_charges", input.internet_charges),
        ("allowances", input.allowances),
        ("deductions", input.deductions),
    ];
    if let Some((name, _)) = components.iter().find(|(_, value)| *value < Decimal::ZERO) {
        return Err(PayrollError::NegativeComponent(*name));
    }

    let basic = input.basic_salary;
    let epf_employee = share(basic, epf_employee_rate())?;
    let gross = basic
        .checked_add(input.internet_charges)
        .and_then(|sum| sum.checked_add(input.allowances))
        .ok_or(PayrollError::Overflow)?;
    let withheld = input
        .deductions
        .checked_add(epf_employee)
        .ok_or(PayrollError::Overflow)?;
    let net_salary = gross.checked_sub(withheld).ok_or(PayrollError::Overflow)?;

    Ok(SalaryBreakdown {
        epf_employee: money(epf_employee),
        epf_employer: money(share(basic, epf_employer_rate())?),
        etf_employer: money(share(basic, etf_employer_rate())?),
        net_salary: money(net_salary),
    })
}

/// leave_days
///
/// Inclusive number of calendar days between two dates; a same-day leave counts as one.
pub fn leave_days(from: NaiveDate, to: NaiveDate) -> Result<u32, PayrollError> {
    if from > to {
        return Err(PayrollError::InvertedRange { from, to });
    }
    let span = (to - from).num_days() + 1;
    Ok(u32::try_from(span).unwrap_or(u32::MAX))
}
