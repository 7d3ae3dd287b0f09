//! Basic types for bills

use serde::{Deserialize, Serialize};

pub use billed_config::UserType;

/// Approval status of a bill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    /// Submitted, waiting for an administrator
    Pending,
    /// Approved by an administrator
    Accepted,
    /// Rejected by an administrator
    Refused,
}

impl Default for BillStatus {
    fn default() -> Self {
        BillStatus::Pending
    }
}

impl BillStatus {
    /// French display label
    pub fn label(&self) -> &'static str {
        match self {
            BillStatus::Pending => "En attente",
            BillStatus::Accepted => "Accepté",
            BillStatus::Refused => "Refusé",
        }
    }

    /// CSS classes for the status badge
    pub fn badge_class(&self) -> &'static str {
        match self {
            BillStatus::Pending => "bg-yellow-100 text-yellow-800",
            BillStatus::Accepted => "bg-green-100 text-green-800",
            BillStatus::Refused => "bg-red-100 text-red-800",
        }
    }
}

impl std::str::FromStr for BillStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BillStatus::Pending),
            "accepted" => Ok(BillStatus::Accepted),
            "refused" => Ok(BillStatus::Refused),
            _ => Err(format!("Invalid bill status: {}", s)),
        }
    }
}

impl std::fmt::Display for BillStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BillStatus::Pending => write!(f, "pending"),
            BillStatus::Accepted => write!(f, "accepted"),
            BillStatus::Refused => write!(f, "refused"),
        }
    }
}

/// Expense categories offered by the new bill form
pub const EXPENSE_TYPES: [&str; 7] = [
    "Transports",
    "Restaurants et bars",
    "Hôtel et logement",
    "Services en ligne",
    "IT et électronique",
    "Equipement et matériel",
    "Fournitures de bureau",
];
