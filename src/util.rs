use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};
use rust_decimal::{Decimal, RoundingStrategy};

pub fn fmt_money(d: &Decimal) -> String {
    format!("{:.2}", round_money(*d))
}

/// Rounds to cents, half away from zero.
pub fn round_money(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn parse_date_any(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y/%m/%d"))
        .ok()
}

pub fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

pub fn now() -> NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

pub fn iso(d: &NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

pub fn first_of_month(d: NaiveDate) -> NaiveDate {
    d.with_day(1).unwrap_or(d)
}

/// Last day of the month `d` falls in.
pub fn last_of_month(d: NaiveDate) -> NaiveDate {
    first_of_month(d)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(d)
}

/// Months needed to cover `from` through `to` inclusive, counting a started
/// month as one. 2023-12-20 through 2024-06-18 is 6. Never below 1.
pub fn months_spanned(from: NaiveDate, to: NaiveDate) -> u32 {
    if to < from {
        return 1;
    }
    let calendar = ((to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32) as u32;
    match from.checked_add_months(Months::new(calendar)) {
        Some(reached) if reached <= to => calendar + 1,
        _ => calendar.max(1),
    }
}

/// Steps `months` forward from `date`, landing on `anchor_day` or the last day
/// of the target month when it is shorter.
pub fn add_months_anchored(date: NaiveDate, months: u32, anchor_day: u32) -> Option<NaiveDate> {
    let target = first_of_month(date).checked_add_months(Months::new(months))?;
    target.with_day(anchor_day.clamp(1, last_of_month(target).day()))
}
