//! Closed enums read from configuration and request metadata: region hints and data sources.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placement hint for the backend instance. `Auto` leaves placement to the directory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionHint {
    #[default]
    Auto,
    /// Western North America
    Wnam,
    /// Eastern North America
    Enam,
    /// South America
    Sam,
    /// Western Europe
    Weur,
    /// Eastern Europe
    Eeur,
    /// Asia Pacific
    Apac,
    /// Oceania
    Oc,
    /// Africa
    Afr,
    /// Middle East
    Me,
}

impl RegionHint {
    pub const ALL: [RegionHint; 10] = [
        RegionHint::Auto,
        RegionHint::Wnam,
        RegionHint::Enam,
        RegionHint::Sam,
        RegionHint::Weur,
        RegionHint::Eeur,
        RegionHint::Apac,
        RegionHint::Oc,
        RegionHint::Afr,
        RegionHint::Me,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RegionHint::Auto => "auto",
            RegionHint::Wnam => "wnam",
            RegionHint::Enam => "enam",
            RegionHint::Sam => "sam",
            RegionHint::Weur => "weur",
            RegionHint::Eeur => "eeur",
            RegionHint::Apac => "apac",
            RegionHint::Oc => "oc",
            RegionHint::Afr => "afr",
            RegionHint::Me => "me",
        }
    }

    /// The location constraint to pass to the directory: `None` for `Auto`.
    pub fn location(self) -> Option<RegionHint> {
        match self {
            RegionHint::Auto => None,
            other => Some(other),
        }
    }
}

impl fmt::Display for RegionHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RegionHint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        RegionHint::ALL
            .into_iter()
            .find(|r| r.as_str() == lower)
            .ok_or_else(|| {
                format!(
                    "unknown region hint '{}' (expected one of: {})",
                    s,
                    RegionHint::ALL.map(|r| r.as_str()).join(", ")
                )
            })
    }
}

/// Which backend serves a request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// The stateful backend instance resolved for this deployment.
    #[default]
    Internal,
    /// An external database reached through the external adapter.
    External,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Internal => "internal",
            Source::External => "external",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("internal") {
            Ok(Source::Internal)
        } else if trimmed.eq_ignore_ascii_case("external") {
            Ok(Source::External)
        } else {
            Err(format!(
                "invalid source: {} (expected internal or external)",
                s
            ))
        }
    }
}
