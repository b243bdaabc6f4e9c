use chrono::NaiveDate;

use super::domain::{LeaseAgreement, LeaseEvent, LeaseStatus, SigningParty};

/// Rejected lease status change.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LeaseTransitionError {
    #[error("cannot {action} a lease that is {}", .from.label())]
    Illegal {
        from: LeaseStatus,
        action: &'static str,
    },
    #[error("lease runs through {end_date} and cannot expire on {today}")]
    TermNotElapsed { end_date: NaiveDate, today: NaiveDate },
    #[error("{} already signed this lease", .party.label())]
    AlreadySigned { party: SigningParty },
}

impl LeaseAgreement {
    /// Single entry point for lease status changes. The lease is left untouched when the
    /// event is rejected.
    pub fn apply(&mut self, event: LeaseEvent) -> Result<LeaseStatus, LeaseTransitionError> {
        let next = match (self.status, event) {
            (LeaseStatus::Pending, LeaseEvent::Sign { party, signed_on }) => {
                if self.signed_on(party).is_some() {
                    return Err(LeaseTransitionError::AlreadySigned { party });
                }
                match party {
                    SigningParty::Landlord => self.landlord_signed_on = Some(signed_on),
                    SigningParty::Tenant => self.tenant_signed_on = Some(signed_on),
                }
                if self.fully_signed() {
                    LeaseStatus::Active
                } else {
                    LeaseStatus::Pending
                }
            }
            (LeaseStatus::Active, LeaseEvent::Expire { today }) => {
                if !self.term_elapsed(today) {
                    return Err(LeaseTransitionError::TermNotElapsed {
                        end_date: self.end_date,
                        today,
                    });
                }
                LeaseStatus::Expired
            }
            (LeaseStatus::Pending | LeaseStatus::Active, LeaseEvent::Cancel) => {
                LeaseStatus::Cancelled
            }
            (LeaseStatus::Active, LeaseEvent::Complete) => LeaseStatus::Completed,
            (
                from @ (LeaseStatus::Pending
                | LeaseStatus::Active
                | LeaseStatus::Expired
                | LeaseStatus::Cancelled
                | LeaseStatus::Completed),
                event,
            ) => {
                return Err(LeaseTransitionError::Illegal {
                    from,
                    action: event.action(),
                })
            }
        };

        self.status = next;
        self.revision += 1;
        Ok(next)
    }
}
