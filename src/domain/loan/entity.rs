//! Loan entity and listing query

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Smallest amount a loan can be requested for
pub const MIN_LOAN_AMOUNT: f64 = 1.0;

/// Loan identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanId(Uuid);

impl LoanId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(id: &str) -> Result<Self, DomainError> {
        Uuid::parse_str(id)
            .map(Self)
            .map_err(|_| DomainError::validation(format!("Invalid loan id '{}'", id)))
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for LoanId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for LoanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a loan application: `pending` until reviewed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    #[default]
    Pending,
    Reviewed,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Reviewed => "reviewed",
        }
    }

    /// Sort order used when a listing filtered by this status has no explicit order
    pub fn default_order(&self) -> SortOrder {
        match self {
            Self::Pending => SortOrder::Ascending,
            Self::Reviewed => SortOrder::Descending,
        }
    }
}

impl FromStr for LoanStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "reviewed" => Ok(Self::Reviewed),
            other => Err(DomainError::validation(format!(
                "Unknown loan status '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordering by creation time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Oldest first
    Ascending,
    /// Newest first
    Descending,
}

impl FromStr for SortOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Ascending),
            "desc" => Ok(Self::Descending),
            other => Err(DomainError::validation(format!(
                "Unknown order '{}'. Use 'asc' or 'desc'",
                other
            ))),
        }
    }
}

/// Filter and ordering for an administrative loan listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoanQuery {
    pub status: Option<LoanStatus>,
    pub order: Option<SortOrder>,
}

impl LoanQuery {
    pub fn new(status: Option<LoanStatus>, order: Option<SortOrder>) -> Self {
        Self { status, order }
    }

    /// Order to apply: the explicit hint, else the status default, else none
    pub fn effective_order(&self) -> Option<SortOrder> {
        self.order
            .or_else(|| self.status.map(|status| status.default_order()))
    }

    pub fn matches(&self, loan: &Loan) -> bool {
        self.status.is_none_or(|status| loan.status() == status)
    }
}

/// A loan application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    id: LoanId,
    amount: f64,
    user_id: UserId,
    status: LoanStatus,
    created_at: DateTime<Utc>,
}

impl Loan {
    /// Create a pending loan owned by `user_id`
    pub fn new(amount: f64, user_id: UserId) -> Result<Self, DomainError> {
        validate_amount(amount)?;

        Ok(Self {
            id: LoanId::generate(),
            amount,
            user_id,
            status: LoanStatus::Pending,
            created_at: Utc::now(),
        })
    }

    /// Rebuild a loan from persisted state
    pub fn restore(
        id: LoanId,
        amount: f64,
        user_id: UserId,
        status: LoanStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            amount,
            user_id,
            status,
            created_at,
        }
    }

    pub fn id(&self) -> &LoanId {
        &self.id
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn status(&self) -> LoanStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    /// Move a pending loan to `reviewed`; reviewed is terminal
    pub fn mark_reviewed(&mut self) -> Result<(), DomainError> {
        match self.status {
            LoanStatus::Pending => {
                self.status = LoanStatus::Reviewed;
                Ok(())
            }
            LoanStatus::Reviewed => Err(DomainError::validation(format!(
                "Loan '{}' has already been reviewed",
                self.id
            ))),
        }
    }
}

/// Reject amounts below the minimum, including NaN and infinities
pub fn validate_amount(amount: f64) -> Result<(), DomainError> {
    if !amount.is_finite() || amount < MIN_LOAN_AMOUNT {
        return Err(DomainError::invalid_amount(format!(
            "Amount must be at least {}",
            MIN_LOAN_AMOUNT
        )));
    }
    Ok(())
}
