/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};

fn fraction_nanos(fraction: &str) -> Option<u32> {
    if fraction.is_empty() || fraction.len() > 9 || !fraction.bytes().all(|c| c.is_ascii_digit())
    {
        return None;
    }
    let value = fraction.parse::<u32>().ok()?;
    Some(value * 10u32.pow(9 - fraction.len() as u32))
}

/// Parse the modification time out of a `213` reply message to `MDTM`.
///
/// The value is `YYYYMMDDHHMMSS[.sss]` in UTC.
pub(crate) fn parse_mdtm_reply(message: &str) -> Option<DateTime<Utc>> {
    let value = message.split_ascii_whitespace().next()?;
    let (seconds, fraction) = match value.split_once('.') {
        Some((s, f)) => (s, Some(f)),
        None => (value, None),
    };
    if seconds.len() != 14 {
        return None;
    }

    let mut dt = NaiveDateTime::parse_from_str(seconds, "%Y%m%d%H%M%S").ok()?;
    if let Some(fraction) = fraction {
        dt = dt.with_nanosecond(fraction_nanos(fraction)?)?;
    }
    Some(dt.and_utc())
}
