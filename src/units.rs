use std::fmt;

/// Regions that display imperial units.
const IMPERIAL_REGIONS: [&str; 3] = ["US", "LR", "MM"];

const METRIC_UNITS: DisplayUnits = DisplayUnits {
    temperature: "°C",
    wind_speed: "km/hr",
};

const IMPERIAL_UNITS: DisplayUnits = DisplayUnits {
    temperature: "°F",
    wind_speed: "miles/hr",
};

/// Unit system requested from the weather API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitSystem {
    Metric,
    Imperial,
}

impl UnitSystem {
    /// Value of the `units` query parameter
    pub fn as_query(self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Imperial => "imperial",
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query())
    }
}

/// Unit suffixes shown next to temperatures and wind speeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayUnits {
    pub temperature: &'static str,
    pub wind_speed: &'static str,
}

/// Unit system for a region code. Anything not listed falls back to metric.
pub fn unit_system_for_locale(locale: &str) -> UnitSystem {
    if IMPERIAL_REGIONS.contains(&locale) {
        UnitSystem::Imperial
    } else {
        UnitSystem::Metric
    }
}

/// Display units for a region code.
pub fn units_for_locale(locale: &str) -> DisplayUnits {
    match unit_system_for_locale(locale) {
        UnitSystem::Imperial => IMPERIAL_UNITS,
        UnitSystem::Metric => METRIC_UNITS,
    }
}

/// Extracts the region subtag from a POSIX or BCP 47 locale tag,
/// e.g. `en_US.UTF-8` or `en-US` gives `US`.
pub fn region_from_locale_tag(tag: &str) -> Option<String> {
    let base = tag.split(['.', '@']).next()?;
    let region = base.split(['_', '-']).nth(1)?;
    if region.len() == 2 && region.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(region.to_ascii_uppercase())
    } else {
        None
    }
}
