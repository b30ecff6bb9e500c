//! Form input and validated person records.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::zodiac::{ParseZodiacError, ZodiacSign};

/// Which side of the form a person was entered on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Party {
    First,
    Second,
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Party::First => f.write_str("你的信息"),
            Party::Second => f.write_str("对方信息"),
        }
    }
}

/// A single editable form field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Age,
    Zodiac,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Name, Field::Age, Field::Zodiac];

    /// Form label.
    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "姓名",
            Field::Age => "年龄",
            Field::Zodiac => "星座",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// One or more of the six required fields is empty.
    #[error("请填写所有信息")]
    Incomplete { missing: Vec<(Party, Field)> },
    #[error("{party}: 年龄无效 {value:?}")]
    InvalidAge { party: Party, value: String },
    #[error("{party}: {source}")]
    UnknownZodiac {
        party: Party,
        source: ParseZodiacError,
    },
}

/// Raw, unvalidated form state for one person.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonDraft {
    pub name: String,
    pub age: String,
    pub zodiac: String,
}

impl PersonDraft {
    pub fn new(name: impl Into<String>, age: impl Into<String>, zodiac: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            age: age.into(),
            zodiac: zodiac.into(),
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Name => self.name = value,
            Field::Age => self.age = value,
            Field::Zodiac => self.zodiac = value,
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Age => &self.age,
            Field::Zodiac => &self.zodiac,
        }
    }

    /// Fields that are empty. Whitespace counts as a value.
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_empty())
            .collect()
    }

    /// Parse a complete draft. Assumes no field is empty; use
    /// [`validate_pair`] to get the aggregated missing-field error.
    fn parse(&self, party: Party) -> Result<PersonRecord, ValidationError> {
        let age = self
            .age
            .trim()
            .parse::<u32>()
            .map_err(|_| ValidationError::InvalidAge {
                party,
                value: self.age.clone(),
            })?;
        let zodiac = self
            .zodiac
            .parse::<ZodiacSign>()
            .map_err(|source| ValidationError::UnknownZodiac { party, source })?;
        Ok(PersonRecord {
            name: self.name.clone(),
            age,
            zodiac,
        })
    }
}

/// Validate both drafts together. Missing fields are reported for both
/// people at once before any parsing happens.
pub fn validate_pair(
    first: &PersonDraft,
    second: &PersonDraft,
) -> Result<(PersonRecord, PersonRecord), ValidationError> {
    let missing: Vec<(Party, Field)> = first
        .missing_fields()
        .into_iter()
        .map(|f| (Party::First, f))
        .chain(second.missing_fields().into_iter().map(|f| (Party::Second, f)))
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::Incomplete { missing });
    }
    Ok((first.parse(Party::First)?, second.parse(Party::Second)?))
}

/// A validated participant. Immutable once submitted for scoring.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersonRecord {
    pub name: String,
    #[serde(with = "age_string")]
    pub age: u32,
    pub zodiac: ZodiacSign,
}

impl PersonRecord {
    pub fn new(name: impl Into<String>, age: u32, zodiac: ZodiacSign) -> Self {
        Self {
            name: name.into(),
            age,
            zodiac,
        }
    }
}

/// The stored array keeps ages as strings (`"25"`); numbers are accepted
/// on load as well.
mod age_string {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(age: &u32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&age.to_string())
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u32),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(n),
            Raw::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| D::Error::custom(format!("invalid age {s:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete(name: &str, age: &str, zodiac: &str) -> PersonDraft {
        PersonDraft::new(name, age, zodiac)
    }

    #[test]
    fn draft_set_and_get() {
        let mut draft = PersonDraft::default();
        draft.set(Field::Name, "小明");
        draft.set(Field::Age, "25");
        draft.set(Field::Zodiac, "白羊座");
        assert_eq!(draft.get(Field::Name), "小明");
        assert_eq!(draft.get(Field::Age), "25");
        assert_eq!(draft.get(Field::Zodiac), "白羊座");
        assert!(draft.missing_fields().is_empty());
    }

    #[test]
    fn only_empty_fields_are_missing() {
        let draft = complete("   ", "25", "");
        assert_eq!(draft.missing_fields(), vec![Field::Zodiac]);
    }

    #[test]
    fn name_is_kept_as_typed() {
        let (a, b) = validate_pair(
            &complete(" 小明 ", "25", "白羊座"),
            &complete("   ", "27", "金牛座"),
        )
        .unwrap();
        assert_eq!(a.name, " 小明 ");
        assert_eq!(b.name, "   ");
    }

    #[test]
    fn blank_age_is_invalid_not_missing() {
        let err = validate_pair(&complete("A", " ", "白羊座"), &complete("B", "27", "金牛座"))
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidAge {
                party: Party::First,
                ..
            }
        ));
    }

    #[test]
    fn validate_pair_ok() {
        let (a, b) = validate_pair(
            &complete("A", "25", "白羊座"),
            &complete("B", " 27 ", "taurus"),
        )
        .unwrap();
        assert_eq!(a, PersonRecord::new("A", 25, ZodiacSign::Aries));
        assert_eq!(b, PersonRecord::new("B", 27, ZodiacSign::Taurus));
    }

    #[test]
    fn validate_pair_reports_all_missing() {
        let err = validate_pair(&complete("", "25", "白羊座"), &complete("B", "", "")).unwrap_err();
        assert_eq!(
            err,
            ValidationError::Incomplete {
                missing: vec![
                    (Party::First, Field::Name),
                    (Party::Second, Field::Age),
                    (Party::Second, Field::Zodiac),
                ]
            }
        );
        assert_eq!(err.to_string(), "请填写所有信息");
    }

    #[test]
    fn validate_pair_rejects_bad_age() {
        let err = validate_pair(
            &complete("A", "twenty", "白羊座"),
            &complete("B", "27", "金牛座"),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidAge { party: Party::First, ref value } if value == "twenty"
        ));
    }

    #[test]
    fn validate_pair_rejects_negative_age() {
        let err = validate_pair(&complete("A", "25", "白羊座"), &complete("B", "-3", "金牛座"))
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidAge {
                party: Party::Second,
                ..
            }
        ));
    }

    #[test]
    fn validate_pair_rejects_unknown_zodiac() {
        let err = validate_pair(&complete("A", "25", "白羊座"), &complete("B", "27", "dragon"))
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::UnknownZodiac {
                party: Party::Second,
                ..
            }
        ));
    }

    #[test]
    fn record_persists_age_as_string() {
        let record = PersonRecord::new("A", 25, ZodiacSign::Aries);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"name":"A","age":"25","zodiac":"白羊座"}"#);
    }

    #[test]
    fn record_accepts_numeric_age() {
        let record: PersonRecord =
            serde_json::from_str(r#"{"name":"A","age":31,"zodiac":"狮子座"}"#).unwrap();
        assert_eq!(record.age, 31);
        assert_eq!(record.zodiac, ZodiacSign::Leo);
    }

    #[test]
    fn record_rejects_garbage_age() {
        let parsed: Result<PersonRecord, _> =
            serde_json::from_str(r#"{"name":"A","age":"abc","zodiac":"狮子座"}"#);
        assert!(parsed.is_err());
    }
}
