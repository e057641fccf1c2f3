//! Quarterly review record.
//!
//! # Responsibility
//! - Hold one quarter's intention and deep-dive reflections.
//! - Keep the on-disk shape compatible with existing blobs.
//!
//! # Invariants
//! - In memory the quarter is a single `id` field.
//! - On disk both `id` and `quarter` carry the same value, and `updatedAt`
//!   is an RFC 3339 string (`""` until the first commit).

use crate::model::ids::QuarterId;
use crate::model::record::{JournalRecord, QUARTERLY_STORAGE_KEY};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Editable text fields of a quarterly review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuarterlyField {
    Intention,
    IntentionReflection,
    CarryOverAssets,
    ProofOfProgress,
    NextSmallAdjustment,
}

impl QuarterlyField {
    pub const ALL: [QuarterlyField; 5] = [
        QuarterlyField::Intention,
        QuarterlyField::IntentionReflection,
        QuarterlyField::CarryOverAssets,
        QuarterlyField::ProofOfProgress,
        QuarterlyField::NextSmallAdjustment,
    ];

    /// Wire name, identical to the serialized field name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Intention => "intention",
            Self::IntentionReflection => "intention_reflection",
            Self::CarryOverAssets => "carry_over_assets",
            Self::ProofOfProgress => "proof_of_progress",
            Self::NextSmallAdjustment => "next_small_adjustment",
        }
    }
}

impl Display for QuarterlyField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuarterlyField {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        QuarterlyField::ALL
            .into_iter()
            .find(|field| field.as_str() == value.trim())
            .ok_or_else(|| format!("unknown quarterly field `{value}`"))
    }
}

/// Introspective review for one quarter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuarterlyReviewWire", into = "QuarterlyReviewWire")]
pub struct QuarterlyReview {
    pub id: QuarterId,
    /// "This quarter I allow myself to focus on ..."
    pub intention: String,
    /// Only meaningful once `intention` is non-empty.
    pub intention_reflection: String,
    pub carry_over_assets: String,
    pub proof_of_progress: String,
    pub next_small_adjustment: String,
    /// `None` until the review has been committed at least once.
    pub updated_at: Option<DateTime<Utc>>,
}

impl QuarterlyReview {
    /// Creates the defaulted, never-committed review for `id`.
    pub fn new(id: QuarterId) -> Self {
        Self {
            id,
            intention: String::new(),
            intention_reflection: String::new(),
            carry_over_assets: String::new(),
            proof_of_progress: String::new(),
            next_small_adjustment: String::new(),
            updated_at: None,
        }
    }

    pub fn field(&self, field: QuarterlyField) -> &str {
        match field {
            QuarterlyField::Intention => &self.intention,
            QuarterlyField::IntentionReflection => &self.intention_reflection,
            QuarterlyField::CarryOverAssets => &self.carry_over_assets,
            QuarterlyField::ProofOfProgress => &self.proof_of_progress,
            QuarterlyField::NextSmallAdjustment => &self.next_small_adjustment,
        }
    }

    pub fn set_field(&mut self, field: QuarterlyField, value: impl Into<String>) {
        let slot = match field {
            QuarterlyField::Intention => &mut self.intention,
            QuarterlyField::IntentionReflection => &mut self.intention_reflection,
            QuarterlyField::CarryOverAssets => &mut self.carry_over_assets,
            QuarterlyField::ProofOfProgress => &mut self.proof_of_progress,
            QuarterlyField::NextSmallAdjustment => &mut self.next_small_adjustment,
        };
        *slot = value.into();
    }
}

impl JournalRecord for QuarterlyReview {
    const STORAGE_KEY: &'static str = QUARTERLY_STORAGE_KEY;
    const NAMESPACE: &'static str = "quarterly";

    fn record_key(&self) -> String {
        self.id.to_string()
    }

    fn stamp_commit(&mut self, at: DateTime<Utc>) {
        self.updated_at = Some(at);
    }
}

/// Persisted form with the redundant `quarter` key and camelCase timestamp.
#[derive(Debug, Serialize, Deserialize)]
struct QuarterlyReviewWire {
    #[serde(default)]
    id: String,
    #[serde(default)]
    quarter: String,
    #[serde(default)]
    intention: String,
    #[serde(default)]
    intention_reflection: String,
    #[serde(default)]
    carry_over_assets: String,
    #[serde(default)]
    proof_of_progress: String,
    #[serde(default)]
    next_small_adjustment: String,
    #[serde(default, rename = "updatedAt")]
    updated_at: String,
}

impl TryFrom<QuarterlyReviewWire> for QuarterlyReview {
    type Error = String;

    fn try_from(wire: QuarterlyReviewWire) -> Result<Self, Self::Error> {
        let raw_id = if wire.id.trim().is_empty() {
            wire.quarter.as_str()
        } else {
            wire.id.as_str()
        };
        let id = raw_id.parse::<QuarterId>().map_err(|err| err.to_string())?;

        let updated_at = match wire.updated_at.trim() {
            "" => None,
            value => Some(
                DateTime::parse_from_rfc3339(value)
                    .map_err(|err| format!("invalid updatedAt `{value}`: {err}"))?
                    .with_timezone(&Utc),
            ),
        };

        Ok(Self {
            id,
            intention: wire.intention,
            intention_reflection: wire.intention_reflection,
            carry_over_assets: wire.carry_over_assets,
            proof_of_progress: wire.proof_of_progress,
            next_small_adjustment: wire.next_small_adjustment,
            updated_at,
        })
    }
}

impl From<QuarterlyReview> for QuarterlyReviewWire {
    fn from(review: QuarterlyReview) -> Self {
        let id = review.id.to_string();
        Self {
            quarter: id.clone(),
            id,
            intention: review.intention,
            intention_reflection: review.intention_reflection,
            carry_over_assets: review.carry_over_assets,
            proof_of_progress: review.proof_of_progress,
            next_small_adjustment: review.next_small_adjustment,
            updated_at: review
                .updated_at
                .map(|at| at.to_rfc3339_opts(SecondsFormat::Millis, true))
                .unwrap_or_default(),
        }
    }
}
