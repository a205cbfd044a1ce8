//! Interface languages.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Languages the storefront is translated into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fa,
}

/// Writing direction of a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDirection {
    Ltr,
    Rtl,
}

impl Language {
    /// BCP 47 tag.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Fa => "fa",
        }
    }

    /// Persian is written right to left.
    #[must_use]
    pub const fn direction(self) -> TextDirection {
        match self {
            Self::En => TextDirection::Ltr,
            Self::Fa => TextDirection::Rtl,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned when parsing an unsupported language tag.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported language: {0}")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "fa" => Ok(Self::Fa),
            _ => Err(UnknownLanguage(s.to_owned())),
        }
    }
}
