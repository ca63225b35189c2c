use marquee_domain::{seat, SeatKey};

/// Presentation view of the lock stores: full-table sentinels expanded to
/// individual seats, sorted by (table, seat) so the output is deterministic
/// for a fixed store state regardless of row insertion order.
pub fn expanded_view(rows: &[SeatKey], capacity: i16) -> Vec<SeatKey> {
    let mut seats = seat::expand(rows, capacity);
    seats.sort();
    seats.dedup();
    seats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_is_order_independent() {
        let a = vec![SeatKey::new("B", 2), SeatKey::new("A", 0), SeatKey::new("B", 1)];
        let b = vec![SeatKey::new("B", 1), SeatKey::new("B", 2), SeatKey::new("A", 0)];
        assert_eq!(expanded_view(&a, 10), expanded_view(&b, 10));
        assert_eq!(expanded_view(&a, 10).len(), 12);
    }
}
