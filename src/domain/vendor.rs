//! Vendor identifiers
//!
//! [`VendorKind`] names every SIS Satchel can talk to and the collections
//! each one exposes. Collection names are the ones accepted on the command
//! line and used for sink file names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A supported school information system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VendorKind {
    Edumate,
    Engage,
    Mssql,
    #[serde(rename = "pcschool")]
    PcSchool,
    Sentral,
    TassCalendar,
    TassLms,
}

impl VendorKind {
    /// Every vendor, in display order
    pub const ALL: [VendorKind; 7] = [
        VendorKind::Edumate,
        VendorKind::Engage,
        VendorKind::Mssql,
        VendorKind::PcSchool,
        VendorKind::Sentral,
        VendorKind::TassCalendar,
        VendorKind::TassLms,
    ];

    /// Stable lowercase name used in config, logs and file names
    pub fn as_str(&self) -> &'static str {
        match self {
            VendorKind::Edumate => "edumate",
            VendorKind::Engage => "engage",
            VendorKind::Mssql => "mssql",
            VendorKind::PcSchool => "pcschool",
            VendorKind::Sentral => "sentral",
            VendorKind::TassCalendar => "tass-calendar",
            VendorKind::TassLms => "tass-lms",
        }
    }

    /// Collections this vendor can fetch
    pub fn collections(&self) -> &'static [&'static str] {
        match self {
            VendorKind::Edumate => &["carers", "students", "staff", "past-students"],
            VendorKind::Engage => &["pupils", "contacts"],
            VendorKind::Mssql => &["rows", "students"],
            VendorKind::PcSchool => &[
                "houses",
                "nationalities",
                "ethnicities",
                "languages",
                "schools",
                "countries",
                "years",
            ],
            VendorKind::Sentral => &[
                "persons",
                "staff",
                "houses",
                "academic-periods",
                "year-levels",
                "roll-classes",
                "person-phones",
                "person-emails",
            ],
            VendorKind::TassCalendar => &["calendar"],
            VendorKind::TassLms => &["student-subjects"],
        }
    }

    /// Whether `collection` is one of [`VendorKind::collections`]
    pub fn supports(&self, collection: &str) -> bool {
        self.collections().contains(&collection)
    }
}

impl fmt::Display for VendorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VendorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        VendorKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| {
                let names: Vec<&str> = VendorKind::ALL.iter().map(|k| k.as_str()).collect();
                format!("Unknown vendor '{s}'. Supported vendors: {}", names.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_accepts_underscores_and_case() {
        assert_eq!("Edumate".parse::<VendorKind>().unwrap(), VendorKind::Edumate);
        assert_eq!(
            "tass_calendar".parse::<VendorKind>().unwrap(),
            VendorKind::TassCalendar
        );
        assert_eq!("pcschool".parse::<VendorKind>().unwrap(), VendorKind::PcSchool);
    }

    #[test]
    fn test_from_str_unknown_lists_supported() {
        let err = "synergetic".parse::<VendorKind>().unwrap_err();
        assert!(err.contains("sentral"));
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for kind in VendorKind::ALL {
            assert_eq!(kind.to_string().parse::<VendorKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_supports() {
        assert!(VendorKind::Edumate.supports("carers"));
        assert!(!VendorKind::Edumate.supports("houses"));
        assert!(VendorKind::Sentral.supports("houses"));
    }

    #[test]
    fn test_serde_uses_kebab_case() {
        let json = serde_json::to_string(&VendorKind::TassLms).unwrap();
        assert_eq!(json, "\"tass-lms\"");
    }

    #[test]
    fn test_serde_name_matches_as_str() {
        for kind in VendorKind::ALL {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, serde_json::Value::from(kind.as_str()));
            assert_eq!(serde_json::from_value::<VendorKind>(json).unwrap(), kind);
        }
    }
}
