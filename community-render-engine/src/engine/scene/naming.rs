use constants::scene_naming::{
    ELECTRIC_LABEL, ELECTRIC_METER_MARKERS, GLOW_MARKERS, ROOF_MARKERS, VEHICLE_MARKERS,
    WATER_LABEL, WATER_PIPE_MARKERS,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static FLOOR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)F").expect("floor pattern is a valid regex")
});

/// Numeric floor index carried by names such as `3F` or `1号楼-12F`.
pub fn floor_number(name: &str) -> Option<u32> {
    FLOOR_PATTERN
        .captures(name)
        .and_then(|caps| caps.get(1))
        .and_then(|digits| digits.as_str().parse().ok())
}

pub fn is_roof(name: &str) -> bool {
    contains_any(name, ROOF_MARKERS)
}

pub fn is_vehicle(name: &str) -> bool {
    VEHICLE_MARKERS.iter().any(|marker| name.contains(marker))
}

pub fn is_glow_candidate(name: &str) -> bool {
    GLOW_MARKERS.iter().any(|marker| name.contains(marker))
}

/// CJK markers match anywhere; ASCII markers match case-insensitively as whole words,
/// so `Perimeter_wall` is not a meter.
fn contains_any(name: &str, markers: &[&str]) -> bool {
    let lowered = name.to_lowercase();
    markers.iter().any(|marker| {
        if marker.is_ascii() {
            contains_ascii_word(&lowered, &marker.to_ascii_lowercase())
        } else {
            lowered.contains(marker)
        }
    })
}

fn contains_ascii_word(haystack: &str, word: &str) -> bool {
    haystack.match_indices(word).any(|(start, found)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + found.len()..].chars().next();
        !before.is_some_and(|c| c.is_ascii_alphabetic())
            && !after.is_some_and(|c| c.is_ascii_alphabetic())
    })
}

/// First `count` characters of a name, used to derive hierarchy labels.
pub fn prefix_chars(name: &str, count: usize) -> String {
    name.chars().take(count).collect()
}

/// Monitoring domain a mesh can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorKind {
    Water,
    Electric,
}

impl MonitorKind {
    pub fn matches(self, name: &str) -> bool {
        match self {
            Self::Water => contains_any(name, WATER_PIPE_MARKERS),
            Self::Electric => contains_any(name, ELECTRIC_METER_MARKERS),
        }
    }

    /// Short label shown in the tooltip ("水" or "电").
    pub fn label(self) -> &'static str {
        match self {
            Self::Water => WATER_LABEL,
            Self::Electric => ELECTRIC_LABEL,
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Self::Water => "t/h",
            Self::Electric => "kW",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "water" | "水" => Some(Self::Water),
            "electric" | "电" => Some(Self::Electric),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_number_reads_digits_before_f() {
        assert_eq!(floor_number("3F"), Some(3));
        assert_eq!(floor_number("1号楼12F"), Some(12));
        assert_eq!(floor_number("12F-走廊"), Some(12));
        assert_eq!(floor_number("楼顶"), None);
        assert_eq!(floor_number("roof-marker"), None);
        assert_eq!(floor_number("F"), None);
    }

    #[test]
    fn roof_detection_covers_both_markers() {
        assert!(is_roof("1号楼楼顶"));
        assert!(is_roof("Roof-marker"));
        assert!(!is_roof("3F"));
    }

    #[test]
    fn monitor_kind_matches_domain_keywords() {
        assert!(MonitorKind::Water.matches("2F水管03"));
        assert!(MonitorKind::Water.matches("main_PIPE"));
        assert!(!MonitorKind::Water.matches("电表01"));
        assert!(MonitorKind::Electric.matches("电表01"));
        assert!(MonitorKind::Electric.matches("meter_box"));
        assert!(MonitorKind::Electric.matches("B2-Meter01"));
    }

    #[test]
    fn ascii_markers_do_not_match_inside_words() {
        assert!(!MonitorKind::Electric.matches("Perimeter_wall"));
        assert!(!MonitorKind::Electric.matches("Diameter"));
        assert!(!MonitorKind::Water.matches("Pipeline_cover"));
        assert!(!is_roof("Roofline_trim"));
        assert!(is_roof("1号楼Roof"));
    }

    #[test]
    fn prefix_chars_counts_characters_not_bytes() {
        assert_eq!(prefix_chars("101室水管", 3), "101");
        assert_eq!(prefix_chars("水管", 3), "水管");
        assert_eq!(prefix_chars("", 2), "");
    }

    #[test]
    fn vehicles_and_glow_are_substring_matches() {
        assert!(is_vehicle("小车01"));
        assert!(is_vehicle("Car_red"));
        assert!(!is_vehicle("card"));
        assert!(is_glow_candidate("1号楼窗户"));
        assert!(!is_glow_candidate("草地"));
    }
}
