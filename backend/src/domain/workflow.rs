//! Repair workflow for a bike.
//!
//! A bike moves through seven ordered stages. Each stage carries display
//! metadata (bilingual label, icon, colour class) and a progress percentage
//! derived from its position. Whether writes must follow the sequence is a
//! deployment decision captured by [`TransitionPolicy`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use super::Error;

/// Display language for labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Nl,
    En,
}

/// Raised when a stored or submitted status string is not a known stage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown workflow status: {0}")]
pub struct UnknownWorkflowStatus(pub String);

impl From<UnknownWorkflowStatus> for Error {
    fn from(value: UnknownWorkflowStatus) -> Self {
        Self::invalid_request(value.to_string()).with_details(json!({
            "field": "workflowStatus",
            "value": value.0,
            "code": "unknown_workflow_status",
        }))
    }
}

/// Repair stage of a bike, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    DiagnoseNodig,
    DiagnoseBezig,
    WachtOpAkkoord,
    WachtOpOnderdelen,
    KlaarVoorReparatie,
    InReparatie,
    Afgerond,
}

impl WorkflowStatus {
    /// Every stage in pipeline order.
    pub const SEQUENCE: [Self; 7] = [
        Self::DiagnoseNodig,
        Self::DiagnoseBezig,
        Self::WachtOpAkkoord,
        Self::WachtOpOnderdelen,
        Self::KlaarVoorReparatie,
        Self::InReparatie,
        Self::Afgerond,
    ];

    /// Zero-based position within [`Self::SEQUENCE`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::DiagnoseNodig => 0,
            Self::DiagnoseBezig => 1,
            Self::WachtOpAkkoord => 2,
            Self::WachtOpOnderdelen => 3,
            Self::KlaarVoorReparatie => 4,
            Self::InReparatie => 5,
            Self::Afgerond => 6,
        }
    }

    /// Stable storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DiagnoseNodig => "diagnose_nodig",
            Self::DiagnoseBezig => "diagnose_bezig",
            Self::WachtOpAkkoord => "wacht_op_akkoord",
            Self::WachtOpOnderdelen => "wacht_op_onderdelen",
            Self::KlaarVoorReparatie => "klaar_voor_reparatie",
            Self::InReparatie => "in_reparatie",
            Self::Afgerond => "afgerond",
        }
    }

    /// Human label in the requested language.
    #[must_use]
    pub const fn label(self, language: Language) -> &'static str {
        match (self, language) {
            (Self::DiagnoseNodig, Language::Nl) => "Diagnose nodig",
            (Self::DiagnoseNodig, Language::En) => "Needs diagnosis",
            (Self::DiagnoseBezig, Language::Nl) => "Diagnose bezig",
            (Self::DiagnoseBezig, Language::En) => "Diagnosing",
            (Self::WachtOpAkkoord, Language::Nl) => "Wacht op akkoord",
            (Self::WachtOpAkkoord, Language::En) => "Awaiting approval",
            (Self::WachtOpOnderdelen, Language::Nl) => "Wacht op onderdelen",
            (Self::WachtOpOnderdelen, Language::En) => "Awaiting parts",
            (Self::KlaarVoorReparatie, Language::Nl) => "Klaar voor reparatie",
            (Self::KlaarVoorReparatie, Language::En) => "Ready for repair",
            (Self::InReparatie, Language::Nl) => "In reparatie",
            (Self::InReparatie, Language::En) => "In repair",
            (Self::Afgerond, Language::Nl) => "Afgerond",
            (Self::Afgerond, Language::En) => "Completed",
        }
    }

    /// Icon identifier used by the clients.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::DiagnoseNodig => "search",
            Self::DiagnoseBezig => "stethoscope",
            Self::WachtOpAkkoord => "phone",
            Self::WachtOpOnderdelen => "package",
            Self::KlaarVoorReparatie => "clipboard-check",
            Self::InReparatie => "wrench",
            Self::Afgerond => "check-circle",
        }
    }

    /// Colour class used by the clients.
    #[must_use]
    pub const fn color_class(self) -> &'static str {
        match self {
            Self::DiagnoseNodig => "bg-red-500",
            Self::DiagnoseBezig => "bg-orange-500",
            Self::WachtOpAkkoord => "bg-yellow-500",
            Self::WachtOpOnderdelen => "bg-purple-500",
            Self::KlaarVoorReparatie => "bg-blue-500",
            Self::InReparatie => "bg-cyan-500",
            Self::Afgerond => "bg-green-500",
        }
    }

    /// `(index + 1) / 7 * 100`.
    ///
    /// # Examples
    /// ```
    /// use workshop::domain::WorkflowStatus;
    ///
    /// assert_eq!(WorkflowStatus::Afgerond.progress_percent(), 100.0);
    /// ```
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "index and sequence length are single digits"
    )]
    pub fn progress_percent(self) -> f64 {
        (self.index() + 1) as f64 / Self::SEQUENCE.len() as f64 * 100.0
    }

    /// Whether the bike has left the workshop pipeline.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Afgerond)
    }

    /// Ordered metadata for every stage.
    #[must_use]
    pub fn all(language: Language) -> Vec<WorkflowStatusInfo> {
        Self::SEQUENCE
            .into_iter()
            .map(|status| status.info(language))
            .collect()
    }

    /// Metadata for this stage.
    #[must_use]
    pub fn info(self, language: Language) -> WorkflowStatusInfo {
        WorkflowStatusInfo {
            status: self,
            index: self.index(),
            label: self.label(language).to_owned(),
            icon: self.icon().to_owned(),
            color_class: self.color_class().to_owned(),
            progress_percent: self.progress_percent(),
        }
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowStatus {
    type Err = UnknownWorkflowStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::SEQUENCE
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownWorkflowStatus(s.to_owned()))
    }
}

/// Display metadata for one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStatusInfo {
    pub status: WorkflowStatus,
    pub index: usize,
    pub label: String,
    pub icon: String,
    pub color_class: String,
    pub progress_percent: f64,
}

/// How status writes are validated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransitionPolicy {
    /// Any status may be written.
    Advisory,
    /// Forward-only moves; `afgerond` is terminal.
    #[default]
    Strict,
}

/// Outcome of validating a status write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The write changes the status.
    Move,
    /// The status already holds the requested value.
    Unchanged,
}

impl TransitionPolicy {
    /// Check whether `from -> to` may be written.
    ///
    /// Skipping stages is allowed under [`TransitionPolicy::Strict`]; moving
    /// backwards or out of `afgerond` is a conflict.
    ///
    /// # Examples
    /// ```
    /// use workshop::domain::{Transition, TransitionPolicy, WorkflowStatus};
    ///
    /// let policy = TransitionPolicy::Strict;
    /// let step = policy
    ///     .check(WorkflowStatus::WachtOpAkkoord, WorkflowStatus::KlaarVoorReparatie)
    ///     .unwrap();
    /// assert_eq!(step, Transition::Move);
    /// assert!(policy
    ///     .check(WorkflowStatus::InReparatie, WorkflowStatus::DiagnoseNodig)
    ///     .is_err());
    /// ```
    pub fn check(self, from: WorkflowStatus, to: WorkflowStatus) -> Result<Transition, Error> {
        if from == to {
            return Ok(Transition::Unchanged);
        }
        match self {
            Self::Advisory => Ok(Transition::Move),
            Self::Strict if !from.is_terminal() && to.index() > from.index() => {
                Ok(Transition::Move)
            }
            Self::Strict => Err(Error::conflict(format!(
                "cannot move a bike from {from} to {to}"
            ))
            .with_details(json!({
                "from": from,
                "to": to,
                "code": "illegal_transition",
            }))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[test]
    fn progress_follows_position_and_increases() {
        for (position, status) in WorkflowStatus::SEQUENCE.into_iter().enumerate() {
            let expected = (position as f64 + 1.0) / 7.0 * 100.0;
            assert!((status.progress_percent() - expected).abs() < f64::EPSILON);
        }
        assert!(
            WorkflowStatus::SEQUENCE
                .windows(2)
                .all(|pair| pair[0].progress_percent() < pair[1].progress_percent())
        );
    }

    #[rstest]
    #[case("diagnose_nodig", WorkflowStatus::DiagnoseNodig)]
    #[case("klaar_voor_reparatie", WorkflowStatus::KlaarVoorReparatie)]
    #[case("afgerond", WorkflowStatus::Afgerond)]
    fn parses_storage_names(#[case] raw: &str, #[case] expected: WorkflowStatus) {
        assert_eq!(raw.parse::<WorkflowStatus>(), Ok(expected));
    }

    #[rstest]
    #[case("")]
    #[case("Afgerond")]
    #[case("gestolen")]
    fn unknown_status_fails_closed(#[case] raw: &str) {
        let error: Error = raw
            .parse::<WorkflowStatus>()
            .expect_err("unknown status")
            .into();
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            error.details().and_then(|d| d.get("code")),
            Some(&json!("unknown_workflow_status"))
        );
    }

    #[rstest]
    #[case(WorkflowStatus::DiagnoseNodig, WorkflowStatus::DiagnoseBezig)]
    #[case(WorkflowStatus::WachtOpAkkoord, WorkflowStatus::KlaarVoorReparatie)]
    #[case(WorkflowStatus::InReparatie, WorkflowStatus::Afgerond)]
    fn strict_allows_forward_moves(#[case] from: WorkflowStatus, #[case] to: WorkflowStatus) {
        assert_eq!(TransitionPolicy::Strict.check(from, to), Ok(Transition::Move));
    }

    #[rstest]
    #[case(WorkflowStatus::InReparatie, WorkflowStatus::DiagnoseNodig)]
    #[case(WorkflowStatus::Afgerond, WorkflowStatus::InReparatie)]
    #[case(WorkflowStatus::DiagnoseBezig, WorkflowStatus::DiagnoseNodig)]
    fn strict_rejects_backward_moves(#[case] from: WorkflowStatus, #[case] to: WorkflowStatus) {
        let error = TransitionPolicy::Strict
            .check(from, to)
            .expect_err("illegal transition");
        assert_eq!(error.code(), ErrorCode::Conflict);
        assert_eq!(
            error.details().and_then(|d| d.get("code")),
            Some(&json!("illegal_transition"))
        );
    }

    #[test]
    fn advisory_allows_anything() {
        assert_eq!(
            TransitionPolicy::Advisory.check(WorkflowStatus::Afgerond, WorkflowStatus::DiagnoseNodig),
            Ok(Transition::Move)
        );
    }

    #[test]
    fn same_status_is_unchanged_under_both_policies() {
        for policy in [TransitionPolicy::Strict, TransitionPolicy::Advisory] {
            assert_eq!(
                policy.check(WorkflowStatus::Afgerond, WorkflowStatus::Afgerond),
                Ok(Transition::Unchanged)
            );
        }
    }

    #[test]
    fn all_lists_every_stage_in_order() {
        let infos = WorkflowStatus::all(Language::En);
        assert_eq!(infos.len(), 7);
        assert_eq!(infos[0].label, "Needs diagnosis");
        assert_eq!(infos[6].status, WorkflowStatus::Afgerond);
    }
}
