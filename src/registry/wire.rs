// Uplink Manager - Settings Wire Format
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Conversion between NetworkManager's `a{sa{sv}}` settings documents and
//! the typed [`ConnectionSettings`] record.

use std::collections::HashMap;
use zbus::zvariant::{OwnedValue, Value};

use crate::models::settings::{ConnectionSection, Ipv4Settings};
use crate::models::ConnectionSettings;

/// Settings document exactly as returned by `GetSettings`.
pub type WireSettings = HashMap<String, HashMap<String, OwnedValue>>;

/// Settings document borrowed for an `Update` call.
pub type WireUpdate<'a> = HashMap<&'a str, HashMap<&'a str, &'a Value<'static>>>;

const CONNECTION_SECTION: &str = "connection";
const IPV4_SECTION: &str = "ipv4";
const ROUTE_METRIC_KEY: &str = "route-metric";

/// Decode the fields the controller cares about. `None` when the document
/// has no connection id.
pub fn decode_settings(raw: &WireSettings) -> Option<ConnectionSettings> {
    let section = raw.get(CONNECTION_SECTION)?;
    let connection = ConnectionSection {
        id: string_field(section, "id")?,
        uuid: string_field(section, "uuid"),
        kind: string_field(section, "type").unwrap_or_default(),
        interface_name: string_field(section, "interface-name"),
    };

    let ipv4 = raw
        .get(IPV4_SECTION)
        .map(|section| Ipv4Settings {
            method: string_field(section, "method"),
            route_metric: metric_field(section, ROUTE_METRIC_KEY),
        })
        .unwrap_or_default();

    Some(ConnectionSettings { connection, ipv4 })
}

/// Build an `Update` payload that carries `raw` through unchanged except for
/// the IPv4 route metric, which is replaced by `metric`.
pub fn with_route_metric<'a>(raw: &'a WireSettings, metric: &'a Value<'static>) -> WireUpdate<'a> {
    let mut update: WireUpdate<'a> = raw
        .iter()
        .map(|(name, section)| {
            let fields = section
                .iter()
                .map(|(key, value)| (key.as_str(), &**value))
                .collect();
            (name.as_str(), fields)
        })
        .collect();

    update
        .entry(IPV4_SECTION)
        .or_default()
        .insert(ROUTE_METRIC_KEY, metric);
    update
}

/// NetworkManager types `route-metric` as int64.
pub fn route_metric_value(metric: u32) -> Value<'static> {
    Value::from(i64::from(metric))
}

fn string_field(section: &HashMap<String, OwnedValue>, key: &str) -> Option<String> {
    match section.get(key).map(|value| &**value) {
        Some(Value::Str(s)) => Some(s.as_str().to_string()),
        _ => None,
    }
}

// -1 is NetworkManager's "use the default metric"
fn metric_field(section: &HashMap<String, OwnedValue>, key: &str) -> Option<u32> {
    match section.get(key).map(|value| &**value) {
        Some(Value::I64(n)) => u32::try_from(*n).ok(),
        Some(Value::I32(n)) => u32::try_from(*n).ok(),
        Some(Value::U32(n)) => Some(*n),
        _ => None,
    }
}
