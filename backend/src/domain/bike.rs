//! Bikes in the workshop and the tables they are parked at.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Error, UserId, WorkflowStatus};

/// Bike identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct BikeId(Uuid);

impl BikeId {
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for BikeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maximum length of a normalised frame number.
pub const FRAME_NUMBER_MAX: usize = 64;

/// Validation errors for [`FrameNumber`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameNumberError {
    #[error("frame number must not be empty")]
    Empty,
    #[error("frame number must be at most {max} characters")]
    TooLong { max: usize },
    #[error("frame number may only contain letters, digits and hyphens")]
    InvalidCharacters,
}

impl From<FrameNumberError> for Error {
    fn from(value: FrameNumberError) -> Self {
        Self::invalid_request(value.to_string())
            .with_details(json!({ "field": "frameNumber", "code": "invalid_frame_number" }))
    }
}

static FRAME_NUMBER_RE: OnceLock<Regex> = OnceLock::new();

fn frame_number_regex() -> &'static Regex {
    FRAME_NUMBER_RE.get_or_init(|| {
        // Length is checked separately so it gets its own error.
        Regex::new("^[A-Z0-9-]+$")
            .unwrap_or_else(|error| panic!("frame number regex failed to compile: {error}"))
    })
}

/// Frame number as engraved on the bike, upper-cased.
///
/// Inner whitespace is removed because engravings are often read with
/// spacing between groups.
///
/// # Examples
/// ```
/// use workshop::domain::FrameNumber;
///
/// let frame = FrameNumber::new(" wbk 1234-x ").unwrap();
/// assert_eq!(frame.as_ref(), "WBK1234-X");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "WBK1234-X")]
pub struct FrameNumber(String);

impl FrameNumber {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, FrameNumberError> {
        let normalised: String = raw
            .as_ref()
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_uppercase)
            .collect();
        if normalised.is_empty() {
            return Err(FrameNumberError::Empty);
        }
        if normalised.chars().count() > FRAME_NUMBER_MAX {
            return Err(FrameNumberError::TooLong {
                max: FRAME_NUMBER_MAX,
            });
        }
        if !frame_number_regex().is_match(&normalised) {
            return Err(FrameNumberError::InvalidCharacters);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for FrameNumber {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for FrameNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<FrameNumber> for String {
    fn from(value: FrameNumber) -> Self {
        value.0
    }
}

impl TryFrom<String> for FrameNumber {
    type Error = FrameNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Error for an unknown bike model string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown bike model: {0}")]
pub struct UnknownBikeModel(pub String);

impl From<UnknownBikeModel> for Error {
    fn from(value: UnknownBikeModel) -> Self {
        Self::invalid_request(value.to_string())
            .with_details(json!({ "field": "model", "code": "unknown_bike_model" }))
    }
}

/// Bike category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BikeModel {
    Stadsfiets,
    EBike,
    Racefiets,
    Mountainbike,
    Hybride,
    Bakfiets,
    Kinderfiets,
    Vouwfiets,
    SpeedPedelec,
    Overig,
}

impl BikeModel {
    pub const ALL: [Self; 10] = [
        Self::Stadsfiets,
        Self::EBike,
        Self::Racefiets,
        Self::Mountainbike,
        Self::Hybride,
        Self::Bakfiets,
        Self::Kinderfiets,
        Self::Vouwfiets,
        Self::SpeedPedelec,
        Self::Overig,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stadsfiets => "stadsfiets",
            Self::EBike => "e_bike",
            Self::Racefiets => "racefiets",
            Self::Mountainbike => "mountainbike",
            Self::Hybride => "hybride",
            Self::Bakfiets => "bakfiets",
            Self::Kinderfiets => "kinderfiets",
            Self::Vouwfiets => "vouwfiets",
            Self::SpeedPedelec => "speed_pedelec",
            Self::Overig => "overig",
        }
    }
}

impl FromStr for BikeModel {
    type Err = UnknownBikeModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|model| model.as_str() == s)
            .ok_or_else(|| UnknownBikeModel(s.to_owned()))
    }
}

/// Number of numbered tables.
pub const NUMBERED_TABLES: u8 = 21;
/// Lettered tables following the numbered ones.
pub const LETTERED_TABLES: [char; 6] = ['A', 'B', 'C', 'D', 'E', 'F'];

/// One of the 27 fixed workshop tables: `1`..=`21` then `A`..=`F`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TableLabel {
    Numbered(u8),
    Lettered(char),
}

impl TableLabel {
    /// Every table in display order.
    ///
    /// # Examples
    /// ```
    /// use workshop::domain::TableLabel;
    ///
    /// let all = TableLabel::all();
    /// assert_eq!(all.len(), 27);
    /// assert_eq!(all[21].to_string(), "A");
    /// ```
    #[must_use]
    pub fn all() -> Vec<Self> {
        (1..=NUMBERED_TABLES)
            .map(Self::Numbered)
            .chain(LETTERED_TABLES.into_iter().map(Self::Lettered))
            .collect()
    }
}

impl fmt::Display for TableLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numbered(n) => write!(f, "{n}"),
            Self::Lettered(c) => write!(f, "{c}"),
        }
    }
}

/// Raised for labels outside the fixed table set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown table: {0}")]
pub struct UnknownTable(pub String);

impl From<UnknownTable> for Error {
    fn from(value: UnknownTable) -> Self {
        Self::invalid_request(value.to_string())
            .with_details(json!({ "field": "table", "code": "unknown_table" }))
    }
}

impl FromStr for TableLabel {
    type Err = UnknownTable;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let unknown = || UnknownTable(s.to_owned());
        if let Ok(n) = trimmed.parse::<u8>() {
            return if (1..=NUMBERED_TABLES).contains(&n) && !trimmed.starts_with('0') {
                Ok(Self::Numbered(n))
            } else {
                Err(unknown())
            };
        }
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                let upper = c.to_ascii_uppercase();
                if LETTERED_TABLES.contains(&upper) {
                    Ok(Self::Lettered(upper))
                } else {
                    Err(unknown())
                }
            }
            _ => Err(unknown()),
        }
    }
}

impl Serialize for TableLabel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TableLabel {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A bike as tracked through the workshop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Bike {
    pub id: BikeId,
    pub frame_number: FrameNumber,
    pub model: BikeModel,
    pub workflow_status: WorkflowStatus,
    #[schema(value_type = Option<String>, example = "3")]
    pub table: Option<TableLabel>,
    #[schema(value_type = Option<String>)]
    pub current_mechanic_id: Option<UserId>,
    #[schema(value_type = Option<String>)]
    pub diagnosed_by_id: Option<UserId>,
    pub customer_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Bike {
    /// Whether the bike has left the pipeline.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.workflow_status.is_terminal()
    }
}

/// Listing filter for bikes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BikeFilter {
    pub status: Option<WorkflowStatus>,
    pub frame_number_contains: Option<String>,
    pub include_completed: bool,
}

impl BikeFilter {
    /// In-process evaluation used by the memory adapter and tests.
    #[must_use]
    pub fn matches(&self, bike: &Bike) -> bool {
        if !self.include_completed && bike.is_completed() {
            return false;
        }
        if self.status.is_some_and(|status| status != bike.workflow_status) {
            return false;
        }
        self.frame_number_contains.as_deref().is_none_or(|needle| {
            bike.frame_number
                .as_ref()
                .contains(needle.to_uppercase().as_str())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", TableLabel::Numbered(1))]
    #[case("21", TableLabel::Numbered(21))]
    #[case("b", TableLabel::Lettered('B'))]
    #[case(" F ", TableLabel::Lettered('F'))]
    fn parses_known_tables(#[case] raw: &str, #[case] expected: TableLabel) {
        assert_eq!(raw.parse::<TableLabel>(), Ok(expected));
    }

    #[rstest]
    #[case("0")]
    #[case("22")]
    #[case("03")]
    #[case("G")]
    #[case("AB")]
    #[case("")]
    fn rejects_unknown_tables(#[case] raw: &str) {
        assert!(raw.parse::<TableLabel>().is_err());
    }

    #[test]
    fn table_order_is_numbers_then_letters() {
        let labels: Vec<String> = TableLabel::all().iter().map(ToString::to_string).collect();
        assert_eq!(labels.first().map(String::as_str), Some("1"));
        assert_eq!(labels.get(20).map(String::as_str), Some("21"));
        assert_eq!(labels.last().map(String::as_str), Some("F"));
    }

    #[rstest]
    #[case("abc-123", Ok("ABC-123"))]
    #[case("  ", Err(FrameNumberError::Empty))]
    #[case("WBK_12", Err(FrameNumberError::InvalidCharacters))]
    #[case("äb12", Err(FrameNumberError::InvalidCharacters))]
    fn frame_numbers_are_normalised(
        #[case] raw: &str,
        #[case] expected: Result<&str, FrameNumberError>,
    ) {
        let parsed = FrameNumber::new(raw).map(String::from);
        assert_eq!(parsed, expected.map(str::to_owned));
    }

    #[test]
    fn bike_models_parse_storage_names() {
        for model in BikeModel::ALL {
            assert_eq!(model.as_str().parse::<BikeModel>(), Ok(model));
        }
        assert!("tandem".parse::<BikeModel>().is_err());
    }
}
