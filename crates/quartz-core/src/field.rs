//! Color-bearing emitter fields.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// One of the four color properties an emitter may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorField {
    /// `color`, the base particle color.
    Base,
    /// `birthColor`.
    Birth,
    /// `fresnelColor`, the outline color.
    Fresnel,
    /// `lingerColor`.
    Linger,
}

impl ColorField {
    pub const ALL: [ColorField; 4] = [
        ColorField::Base,
        ColorField::Birth,
        ColorField::Fresnel,
        ColorField::Linger,
    ];

    /// Field name as it appears in the document.
    pub fn field_name(self) -> &'static str {
        match self {
            ColorField::Base => "color",
            ColorField::Birth => "birthColor",
            ColorField::Fresnel => "fresnelColor",
            ColorField::Linger => "lingerColor",
        }
    }

    /// Match a document field name, ignoring ASCII case.
    pub fn from_field_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.field_name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for ColorField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

impl FromStr for ColorField {
    type Err = String;

    /// Accepts the short names (`base`, `birth`, `fresnel`/`outline`,
    /// `linger`) as well as the document field names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "base" => Ok(ColorField::Base),
            "birth" => Ok(ColorField::Birth),
            "fresnel" | "outline" => Ok(ColorField::Fresnel),
            "linger" => Ok(ColorField::Linger),
            _ => Self::from_field_name(&lower).ok_or_else(|| format!("unknown color field `{s}`")),
        }
    }
}
