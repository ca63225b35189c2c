use marquee_domain::{Conflict, ConflictKind};

/// Error taxonomy for the reservation core.
///
/// Validation failures are rejected before the store is touched and are not
/// retryable as-is. Conflicts carry the exact rows that blocked the request
/// so the caller can pick different seats. Store failures roll the whole
/// operation back and are safe to retry.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("invalid hold request: {0}")]
    Validation(String),

    #[error("{} seat(s) unavailable", .conflicts.len())]
    Conflict {
        kind: ConflictKind,
        conflicts: Vec<Conflict>,
    },

    #[error("lock store failure: {0}")]
    Store(Box<dyn std::error::Error + Send + Sync>),
}

impl LockError {
    pub fn store(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Store(Box::new(err))
    }

    /// Builds a whole-request conflict rejection. Sold outranks held: if any
    /// blocking row is a permanent allocation the caller cannot retry their
    /// way out of it, and the result code must say so.
    pub fn conflict(conflicts: Vec<Conflict>) -> Self {
        let kind = if conflicts.iter().any(|c| c.kind == ConflictKind::Sold) {
            ConflictKind::Sold
        } else {
            ConflictKind::Held
        };
        Self::Conflict { kind, conflicts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_domain::SeatKey;

    #[test]
    fn test_sold_outranks_held() {
        let err = LockError::conflict(vec![
            Conflict {
                seat: SeatKey::new("A", 1),
                kind: ConflictKind::Held,
            },
            Conflict {
                seat: SeatKey::new("A", 2),
                kind: ConflictKind::Sold,
            },
        ]);
        match err {
            LockError::Conflict { kind, conflicts } => {
                assert_eq!(kind, ConflictKind::Sold);
                assert_eq!(conflicts.len(), 2);
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }
}
