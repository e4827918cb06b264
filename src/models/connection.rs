// Uplink Manager - Connection Model
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Configured connections and their coarse classification.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::settings::ConnectionSettings;

/// Name marker that splits cellular connections into 5G and 4G.
const FIVE_G_MARKER: &str = "5g";

/// Coarse classification of a connection, used for priority ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Cellular connection whose name carries the 5G marker.
    Cellular5g,
    /// Any other cellular connection.
    Cellular4g,
    /// Wireless LAN.
    Wifi,
    /// Wired Ethernet.
    Ethernet,
    /// Anything unmatched (VPN, bridge, loopback, ...).
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cellular5g => "cellular-5g",
            Self::Cellular4g => "cellular-4g",
            Self::Wifi => "wifi",
            Self::Ethernet => "ethernet",
            Self::Other => "other",
        }
    }

    /// Classify a connection from its raw transport type and its name.
    ///
    /// Cellular transports (`gsm`, `cdma`) are split by a case-insensitive
    /// `5G` marker in the connection id. Wireless matches both the short
    /// `wifi` spelling and NetworkManager's `802-11-wireless`; wired matches
    /// any type containing `ethernet`.
    pub fn classify(kind: &str, id: &str) -> Self {
        let kind = kind.to_ascii_lowercase();

        if kind.contains("gsm") || kind.contains("cdma") {
            if id.to_ascii_lowercase().contains(FIVE_G_MARKER) {
                Self::Cellular5g
            } else {
                Self::Cellular4g
            }
        } else if kind.contains("wifi") || kind.contains("802-11-wireless") {
            Self::Wifi
        } else if kind.contains("ethernet") {
            Self::Ethernet
        } else {
            Self::Other
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configured network attachment point as enumerated from the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Stable, unique connection name.
    pub id: String,
    /// Controller classification, derived from `kind` and `id`.
    pub category: Category,
    /// Raw transport type string from the registry (e.g. "gsm", "802-11-wireless").
    pub kind: String,
    /// Opaque registry handle (a D-Bus object path for NetworkManager).
    pub path: String,
    /// IPv4 route metric; lower is preferred. `None` when the registry default applies.
    pub priority_metric: Option<u32>,
}

impl Connection {
    /// Create a connection record, deriving its category.
    pub fn new(id: impl Into<String>, kind: impl Into<String>, path: impl Into<String>) -> Self {
        let id = id.into();
        let kind = kind.into();
        Self {
            category: Category::classify(&kind, &id),
            id,
            kind,
            path: path.into(),
            priority_metric: None,
        }
    }

    /// Build a connection record from typed registry settings.
    pub fn from_settings(path: impl Into<String>, settings: &ConnectionSettings) -> Self {
        let mut conn = Self::new(
            settings.connection.id.clone(),
            settings.connection.kind.clone(),
            path,
        );
        conn.priority_metric = settings.ipv4.route_metric;
        conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_cellular_split_by_marker() {
        assert_eq!(Category::classify("gsm", "cell5g"), Category::Cellular5g);
        assert_eq!(Category::classify("gsm", "Carrier 5G"), Category::Cellular5g);
        assert_eq!(Category::classify("gsm", "carrier-lte"), Category::Cellular4g);
        assert_eq!(Category::classify("cdma", "backup"), Category::Cellular4g);
        assert_eq!(Category::classify("cdma", "backup-5G"), Category::Cellular5g);
    }

    #[test]
    fn test_classify_wireless_and_wired() {
        assert_eq!(Category::classify("wifi", "home-wifi"), Category::Wifi);
        assert_eq!(Category::classify("802-11-wireless", "office"), Category::Wifi);
        assert_eq!(Category::classify("802-3-ethernet", "Wired 1"), Category::Ethernet);
        assert_eq!(Category::classify("ethernet", "lan"), Category::Ethernet);
    }

    #[test]
    fn test_classify_marker_ignored_for_non_cellular() {
        // A 5G Wi-Fi band in the name must not turn Wi-Fi into cellular
        assert_eq!(Category::classify("802-11-wireless", "home-5G"), Category::Wifi);
    }

    #[test]
    fn test_classify_unmatched_is_other() {
        assert_eq!(Category::classify("vpn", "work"), Category::Other);
        assert_eq!(Category::classify("bridge", "br0"), Category::Other);
        assert_eq!(Category::classify("loopback", "lo"), Category::Other);
        assert_eq!(Category::classify("", ""), Category::Other);
    }

    #[test]
    fn test_classify_is_case_insensitive_on_kind() {
        assert_eq!(Category::classify("GSM", "x"), Category::Cellular4g);
        assert_eq!(Category::classify("WiFi", "x"), Category::Wifi);
    }

    #[test]
    fn test_connection_new_derives_category() {
        let conn = Connection::new("cell5g", "gsm", "/org/freedesktop/NetworkManager/Settings/1");
        assert_eq!(conn.category, Category::Cellular5g);
        assert_eq!(conn.priority_metric, None);
    }

    #[test]
    fn test_category_display() {
        let names: Vec<String> = [
            Category::Cellular5g,
            Category::Cellular4g,
            Category::Wifi,
            Category::Ethernet,
            Category::Other,
        ]
        .iter()
        .map(|c| c.to_string())
        .collect();
        assert_eq!(names, ["cellular-5g", "cellular-4g", "wifi", "ethernet", "other"]);
    }
}
