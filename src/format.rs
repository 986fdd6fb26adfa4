use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};

use crate::types::Seller;

/// "Ivan @ivan", or just the name when the seller has no handle.
pub fn seller_display(seller: &Seller) -> String {
    match seller.username.as_deref().filter(|u| !u.is_empty()) {
        Some(handle) => format!("{} @{}", seller.first_name, handle),
        None => seller.first_name.clone(),
    }
}

/// Rating with one decimal, e.g. `4.8`.
pub fn format_rating(rating: f64) -> String {
    format!("{rating:.1}")
}

/// Price followed by currency; whole prices print without a fraction.
pub fn format_price(price: f64, currency: &str) -> String {
    if currency.is_empty() {
        format!("{price}")
    } else {
        format!("{price} {currency}")
    }
}

/// Creation date as `dd.mm.yyyy` in local time.
///
/// Accepts RFC 3339 (converted to local time), naive ISO date-times (taken
/// as local), `YYYY-MM-DD HH:MM:SS` and bare dates. Unparseable input is
/// returned unchanged.
pub fn format_created_date(raw: &str) -> String {
    parse_created(raw)
        .map(|d| d.format("%d.%m.%Y").to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn parse_created(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local).date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(
                Local
                    .from_local_datetime(&naive)
                    .earliest()
                    .map(|dt| dt.date_naive())
                    .unwrap_or_else(|| naive.date()),
            );
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}
