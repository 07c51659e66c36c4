use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
}

impl Locale {
    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Es => "es",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" | "english" => Ok(Locale::En),
            "es" | "es-es" | "es-mx" | "spanish" | "español" => Ok(Locale::Es),
            other => Err(AppError::InvalidLocale(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_region_variants() {
        assert_eq!("ES-mx".parse::<Locale>().unwrap(), Locale::Es);
        assert_eq!(" en ".parse::<Locale>().unwrap(), Locale::En);
        assert!(matches!(
            "fr".parse::<Locale>(),
            Err(AppError::InvalidLocale(code)) if code == "fr"
        ));
    }
}
