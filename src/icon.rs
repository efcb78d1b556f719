use std::fmt;

/// Icons the screen knows how to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Icon {
    Sunny,
    Cloud,
    Rain,
    Storm,
    Snowflake,
}

impl Icon {
    /// Drawable identifier for the icon
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sunny => "sunny",
            Self::Cloud => "cloud",
            Self::Rain => "rain",
            Self::Storm => "storm",
            Self::Snowflake => "snowflake",
        }
    }
}

impl fmt::Display for Icon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Day and night variants share an icon.
const ICON_TABLE: &[(&str, Icon)] = &[
    ("01d", Icon::Sunny),
    ("01n", Icon::Sunny),
    ("02d", Icon::Cloud),
    ("02n", Icon::Cloud),
    ("03d", Icon::Cloud),
    ("03n", Icon::Cloud),
    ("04d", Icon::Cloud),
    ("04n", Icon::Cloud),
    ("09d", Icon::Rain),
    ("09n", Icon::Rain),
    ("10d", Icon::Rain),
    ("10n", Icon::Rain),
    ("11d", Icon::Storm),
    ("11n", Icon::Storm),
    ("13d", Icon::Snowflake),
    ("13n", Icon::Snowflake),
];

/// Looks up the icon for an API condition code. Unknown codes (mist `50d`,
/// empty strings, ...) have no icon.
pub fn icon_for_code(code: &str) -> Option<Icon> {
    ICON_TABLE
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, icon)| *icon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_code_maps() {
        let expected = [
            ("01", Icon::Sunny),
            ("02", Icon::Cloud),
            ("03", Icon::Cloud),
            ("04", Icon::Cloud),
            ("09", Icon::Rain),
            ("10", Icon::Rain),
            ("11", Icon::Storm),
            ("13", Icon::Snowflake),
        ];
        for (prefix, icon) in expected {
            for suffix in ["d", "n"] {
                let code = format!("{prefix}{suffix}");
                assert_eq!(icon_for_code(&code), Some(icon), "code {code}");
            }
        }
    }

    #[test]
    fn unknown_codes_leave_icon_unset() {
        for code in ["50d", "50n", "", "01", "01D", "05d", "garbage"] {
            assert_eq!(icon_for_code(code), None, "code {code:?}");
        }
    }

    #[test]
    fn icon_identifiers() {
        assert_eq!(Icon::Sunny.as_str(), "sunny");
        assert_eq!(Icon::Snowflake.to_string(), "snowflake");
    }
}
