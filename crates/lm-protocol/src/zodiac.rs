//! The twelve zodiac signs offered by the form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A zodiac sign. Serialized as its Chinese name, which is also what the
/// history store persists.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ZodiacSign {
    #[serde(rename = "白羊座")]
    Aries,
    #[serde(rename = "金牛座")]
    Taurus,
    #[serde(rename = "双子座")]
    Gemini,
    #[serde(rename = "巨蟹座")]
    Cancer,
    #[serde(rename = "狮子座")]
    Leo,
    #[serde(rename = "处女座")]
    Virgo,
    #[serde(rename = "天秤座")]
    Libra,
    #[serde(rename = "天蝎座")]
    Scorpio,
    #[serde(rename = "射手座")]
    Sagittarius,
    #[serde(rename = "摩羯座")]
    Capricorn,
    #[serde(rename = "水瓶座")]
    Aquarius,
    #[serde(rename = "双鱼座")]
    Pisces,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown zodiac sign: {0:?}")]
pub struct ParseZodiacError(pub String);

impl ZodiacSign {
    /// All signs in menu order.
    pub const ALL: [ZodiacSign; 12] = [
        ZodiacSign::Aries,
        ZodiacSign::Taurus,
        ZodiacSign::Gemini,
        ZodiacSign::Cancer,
        ZodiacSign::Leo,
        ZodiacSign::Virgo,
        ZodiacSign::Libra,
        ZodiacSign::Scorpio,
        ZodiacSign::Sagittarius,
        ZodiacSign::Capricorn,
        ZodiacSign::Aquarius,
        ZodiacSign::Pisces,
    ];

    /// Chinese display name, e.g. `白羊座`.
    pub fn name(self) -> &'static str {
        match self {
            ZodiacSign::Aries => "白羊座",
            ZodiacSign::Taurus => "金牛座",
            ZodiacSign::Gemini => "双子座",
            ZodiacSign::Cancer => "巨蟹座",
            ZodiacSign::Leo => "狮子座",
            ZodiacSign::Virgo => "处女座",
            ZodiacSign::Libra => "天秤座",
            ZodiacSign::Scorpio => "天蝎座",
            ZodiacSign::Sagittarius => "射手座",
            ZodiacSign::Capricorn => "摩羯座",
            ZodiacSign::Aquarius => "水瓶座",
            ZodiacSign::Pisces => "双鱼座",
        }
    }

    /// Lowercase English name, accepted on the command line.
    pub fn english(self) -> &'static str {
        match self {
            ZodiacSign::Aries => "aries",
            ZodiacSign::Taurus => "taurus",
            ZodiacSign::Gemini => "gemini",
            ZodiacSign::Cancer => "cancer",
            ZodiacSign::Leo => "leo",
            ZodiacSign::Virgo => "virgo",
            ZodiacSign::Libra => "libra",
            ZodiacSign::Scorpio => "scorpio",
            ZodiacSign::Sagittarius => "sagittarius",
            ZodiacSign::Capricorn => "capricorn",
            ZodiacSign::Aquarius => "aquarius",
            ZodiacSign::Pisces => "pisces",
        }
    }
}

impl fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts the Chinese name, the English name (any case), or a 1-based
/// menu index.
impl FromStr for ZodiacSign {
    type Err = ParseZodiacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(index) = trimmed.parse::<usize>() {
            return index
                .checked_sub(1)
                .and_then(|i| ZodiacSign::ALL.get(i).copied())
                .ok_or_else(|| ParseZodiacError(s.to_string()));
        }
        ZodiacSign::ALL
            .iter()
            .copied()
            .find(|sign| sign.name() == trimmed || sign.english().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseZodiacError(s.to_string()))
    }
}
