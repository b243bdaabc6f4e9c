use serde::{Deserialize, Serialize};

use super::domain::{Bill, BillStatus};

/// Events that move a bill between payment states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillEvent {
    PaymentConfirmed,
    GraceElapsed,
}

impl BillEvent {
    pub const fn action(self) -> &'static str {
        match self {
            Self::PaymentConfirmed => "confirm payment on",
            Self::GraceElapsed => "mark overdue",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot {} a bill that is {}", .event.action(), .from.label())]
pub struct BillTransitionError {
    pub from: BillStatus,
    pub event: BillEvent,
}

impl BillStatus {
    /// The only place a bill's status is allowed to change.
    pub fn next(self, event: BillEvent) -> Result<BillStatus, BillTransitionError> {
        match (self, event) {
            (BillStatus::Unpaid | BillStatus::Overdue, BillEvent::PaymentConfirmed) => {
                Ok(BillStatus::Paid)
            }
            (BillStatus::Unpaid, BillEvent::GraceElapsed) => Ok(BillStatus::Overdue),
            (from @ (BillStatus::Paid | BillStatus::Overdue), event) => {
                Err(BillTransitionError { from, event })
            }
        }
    }
}

impl Bill {
    pub fn apply(&mut self, event: BillEvent) -> Result<BillStatus, BillTransitionError> {
        self.status = self.status.next(event)?;
        Ok(self.status)
    }
}
