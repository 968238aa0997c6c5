//! 时间工具函数: 业务时区 (Asia/Yangon, UTC+6:30)
//!
//! Every timestamp the ordering core persists or prints is naive Myanmar
//! local time. Offset handling lives here and nowhere else.

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use rand::Rng;

use super::{AppError, AppResult};

/// Business timezone
pub const BUSINESS_TZ: Tz = chrono_tz::Asia::Yangon;

/// Storage format (`orders.created_at` etc.)
const LOCAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Receipt format (minute precision)
const RECEIPT_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Kitchen ticket clock
const CLOCK_FORMAT: &str = "%H:%M";

/// Current time in the business timezone
pub fn now_local() -> DateTime<Tz> {
    to_local(Utc::now())
}

/// Convert a UTC instant to business local time
pub fn to_local(utc: DateTime<Utc>) -> DateTime<Tz> {
    utc.with_timezone(&BUSINESS_TZ)
}

/// `YYYY-MM-DD HH:MM:SS`
pub fn format_local(dt: &DateTime<Tz>) -> String {
    dt.format(LOCAL_FORMAT).to_string()
}

/// Current local time formatted for storage
pub fn now_local_string() -> String {
    format_local(&now_local())
}

/// 解析存储的本地时间字符串
pub fn parse_local(s: &str) -> AppResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, LOCAL_FORMAT)
        .map_err(|_| AppError::validation(format!("Invalid local timestamp: {}", s)))
}

/// Stored timestamp → `YYYY-MM-DD HH:MM`; unparseable input is returned as-is
pub fn format_receipt_time(stored: &str) -> String {
    match parse_local(stored) {
        Ok(naive) => naive.format(RECEIPT_FORMAT).to_string(),
        Err(_) => stored.to_string(),
    }
}

/// Stored timestamp → `HH:MM`; unparseable input is returned as-is
pub fn format_clock(stored: &str) -> String {
    match parse_local(stored) {
        Ok(naive) => naive.format(CLOCK_FORMAT).to_string(),
        Err(_) => stored.to_string(),
    }
}

/// Order number: `ORD` + `YYYYMMDDHHMMSS` + 3-digit millis + 2-digit random
pub fn generate_order_no() -> String {
    let suffix = rand::thread_rng().gen_range(0..100u8);
    order_no_at(&now_local(), suffix)
}

fn order_no_at(now: &DateTime<Tz>, suffix: u8) -> String {
    format!("ORD{}{:02}", now.format("%Y%m%d%H%M%S%3f"), suffix % 100)
}
