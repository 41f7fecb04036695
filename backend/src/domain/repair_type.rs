//! Price list entries.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{BikeModel, Error};

/// Maximum length of a repair type name.
pub const REPAIR_NAME_MAX: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct RepairTypeId(Uuid);

impl RepairTypeId {
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

impl fmt::Display for RepairTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A repair that can be registered on a bike.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepairType {
    pub id: RepairTypeId,
    pub name: String,
    pub price_cents: i32,
    pub points: i32,
    /// Empty means the repair applies to every model.
    pub applicable_models: Vec<BikeModel>,
    pub active: bool,
}

impl RepairType {
    /// Whether this repair may be registered on a bike of `model`.
    #[must_use]
    pub fn applies_to(&self, model: BikeModel) -> bool {
        self.applicable_models.is_empty() || self.applicable_models.contains(&model)
    }
}

/// Editable fields of a repair type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepairTypeDraft {
    pub name: String,
    pub price_cents: i32,
    pub points: i32,
    #[serde(default)]
    pub applicable_models: Vec<BikeModel>,
}

impl RepairTypeDraft {
    /// Validate and normalise the draft.
    pub fn validate(mut self) -> Result<Self, Error> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(Error::invalid_request("name must not be empty")
                .with_details(json!({ "field": "name", "code": "empty_name" })));
        }
        if name.chars().count() > REPAIR_NAME_MAX {
            return Err(Error::invalid_request(format!(
                "name must be at most {REPAIR_NAME_MAX} characters"
            ))
            .with_details(json!({ "field": "name", "code": "name_too_long" })));
        }
        if self.price_cents < 0 {
            return Err(Error::invalid_request("price must not be negative")
                .with_details(json!({ "field": "priceCents", "code": "negative_price" })));
        }
        if self.points < 0 {
            return Err(Error::invalid_request("points must not be negative")
                .with_details(json!({ "field": "points", "code": "negative_points" })));
        }
        self.name = name.to_owned();
        self.applicable_models.sort_by_key(|model| model.as_str());
        self.applicable_models.dedup();
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    fn draft(name: &str, price_cents: i32, points: i32) -> RepairTypeDraft {
        RepairTypeDraft {
            name: name.to_owned(),
            price_cents,
            points,
            applicable_models: vec![],
        }
    }

    #[rstest]
    #[case(draft("", 100, 1))]
    #[case(draft("Band plakken", -1, 1))]
    #[case(draft("Band plakken", 100, -1))]
    #[case(draft(&"x".repeat(REPAIR_NAME_MAX + 1), 100, 1))]
    fn rejects_invalid_drafts(#[case] draft: RepairTypeDraft) {
        let error = draft.validate().expect_err("invalid draft");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[test]
    fn trims_and_deduplicates() {
        let mut input = draft("  Ketting vervangen ", 2500, 3);
        input.applicable_models = vec![BikeModel::EBike, BikeModel::Racefiets, BikeModel::EBike];
        let valid = input.validate().expect("valid");
        assert_eq!(valid.name, "Ketting vervangen");
        assert_eq!(valid.applicable_models, vec![BikeModel::EBike, BikeModel::Racefiets]);
    }

    #[test]
    fn empty_model_list_applies_everywhere() {
        let repair = RepairType {
            id: RepairTypeId::random(),
            name: "Remmen afstellen".to_owned(),
            price_cents: 1500,
            points: 1,
            applicable_models: vec![],
            active: true,
        };
        assert!(BikeModel::ALL.iter().all(|model| repair.applies_to(*model)));
    }
}
