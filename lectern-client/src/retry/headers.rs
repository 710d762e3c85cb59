use std::collections::BTreeMap;
use std::time::{Duration, SystemTime};

use httpdate::parse_http_date;
use serde_json::Value as JsonValue;

use crate::retry::config::{BodyDelayField, DelayHintConfig, DelayUnit, VendorHeaderKind};

// Anything beyond a day is capped by the retry ceiling anyway.
const MAX_BODY_HINT_SECS: f64 = 86_400.0;

/// Server-suggested wait from a pending response: headers first, then body fields.
pub fn parse_delay_hint(
    headers: &BTreeMap<String, String>,
    body: Option<&JsonValue>,
    cfg: &DelayHintConfig,
    now: SystemTime,
) -> Option<Duration> {
    if let Some(d) = parse_retry_after(headers, cfg, now) {
        return Some(d);
    }
    body.and_then(|b| parse_body_hint(b, &cfg.body_fields))
}

pub fn parse_retry_after(
    headers: &BTreeMap<String, String>,
    cfg: &DelayHintConfig,
    now: SystemTime,
) -> Option<Duration> {
    // Standard header wins.
    if let Some(v) = get_header_ci(headers, "retry-after") {
        if let Some(d) = parse_retry_after_value(v, now) {
            return Some(d);
        }
    }

    for vh in &cfg.vendor_headers {
        if let Some(v) = get_header_ci(headers, &vh.name) {
            if let Some(d) = parse_vendor_value(v, vh.kind, now) {
                return Some(d);
            }
        }
    }
    None
}

pub fn parse_body_hint(body: &JsonValue, fields: &[BodyDelayField]) -> Option<Duration> {
    let obj = body.as_object()?;
    fields.iter().find_map(|f| {
        let v = obj.get(&f.name)?;
        let n = match v {
            JsonValue::Number(n) => n.as_f64()?,
            JsonValue::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        if !n.is_finite() || n < 0.0 {
            return None;
        }
        Some(match f.unit {
            DelayUnit::Seconds => Duration::from_secs_f64(n.min(MAX_BODY_HINT_SECS)),
            DelayUnit::Milliseconds => Duration::from_millis(n as u64),
        })
    })
}

fn parse_retry_after_value(v: &str, now: SystemTime) -> Option<Duration> {
    let v = v.trim();
    if let Ok(secs) = v.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }
    let dt = parse_http_date(v).ok()?;
    Some(dt.duration_since(now).unwrap_or(Duration::ZERO))
}

fn parse_vendor_value(v: &str, kind: VendorHeaderKind, now: SystemTime) -> Option<Duration> {
    let v = v.trim();
    match kind {
        VendorHeaderKind::DeltaSeconds => v.parse::<u64>().ok().map(Duration::from_secs),
        VendorHeaderKind::DeltaMillis => v.parse::<u64>().ok().map(Duration::from_millis),
        VendorHeaderKind::UnixSeconds => {
            let ts = v.parse::<u64>().ok()?;
            let dt = SystemTime::UNIX_EPOCH + Duration::from_secs(ts);
            Some(dt.duration_since(now).unwrap_or(Duration::ZERO))
        }
        VendorHeaderKind::HttpDate => {
            let dt = parse_http_date(v).ok()?;
            Some(dt.duration_since(now).unwrap_or(Duration::ZERO))
        }
    }
}

fn get_header_ci<'a>(headers: &'a BTreeMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}
