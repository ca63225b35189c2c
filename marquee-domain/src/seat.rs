use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sentinel seat number meaning "the entire table as one unit".
pub const FULL_TABLE: i16 = 0;

/// A reservable unit: one seat at one table, or the whole table when
/// `seat_no == FULL_TABLE`. Equality is exact; a sentinel key is never
/// equal to an individual seat key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeatKey {
    pub table_id: String,
    pub seat_no: i16,
}

impl SeatKey {
    pub fn new(table_id: impl Into<String>, seat_no: i16) -> Self {
        Self {
            table_id: table_id.into(),
            seat_no,
        }
    }

    pub fn is_full_table(&self) -> bool {
        self.seat_no == FULL_TABLE
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupKind {
    Full,
    /// Deduplicated, ascending, strictly positive seat numbers.
    Partial(Vec<i16>),
}

/// All requested seats for one table, classified as a whole-table request
/// or a partial one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatGroup {
    pub table_id: String,
    pub kind: GroupKind,
}

impl SeatGroup {
    /// The rows this group occupies in the lock store: the sentinel for a
    /// full group, each seat number for a partial one.
    pub fn seat_keys(&self) -> Vec<SeatKey> {
        match &self.kind {
            GroupKind::Full => vec![SeatKey::new(self.table_id.clone(), FULL_TABLE)],
            GroupKind::Partial(seats) => seats
                .iter()
                .map(|&n| SeatKey::new(self.table_id.clone(), n))
                .collect(),
        }
    }
}

/// Groups requested seats by table and collapses whole-table requests to
/// the sentinel. A table is "full" when the request names seat 0 or names
/// every seat 1..=capacity exactly. Non-positive seat numbers other than
/// the sentinel are dropped.
pub fn normalize(seats: &[SeatKey], capacity: i16) -> Vec<SeatGroup> {
    let mut by_table: BTreeMap<&str, Vec<i16>> = BTreeMap::new();
    for key in seats {
        by_table.entry(key.table_id.as_str()).or_default().push(key.seat_no);
    }

    let mut groups = Vec::with_capacity(by_table.len());
    for (table_id, mut nums) in by_table {
        let has_sentinel = nums.contains(&FULL_TABLE);
        nums.retain(|&n| n > 0);
        nums.sort_unstable();
        nums.dedup();

        let covers_all =
            nums.len() == capacity as usize && nums.iter().zip(1..=capacity).all(|(&n, want)| n == want);

        let kind = if has_sentinel || covers_all {
            GroupKind::Full
        } else {
            GroupKind::Partial(nums)
        };
        groups.push(SeatGroup {
            table_id: table_id.to_string(),
            kind,
        });
    }
    groups
}

/// Inverse of `normalize` for presentation: sentinel rows become one row
/// per seat 1..=capacity, everything else passes through unchanged.
pub fn expand(rows: &[SeatKey], capacity: i16) -> Vec<SeatKey> {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        if row.is_full_table() {
            out.extend((1..=capacity).map(|n| SeatKey::new(row.table_id.clone(), n)));
        } else {
            out.push(row.clone());
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictKind {
    /// Blocked by a permanent allocation. The seat cannot come back.
    Sold,
    /// Blocked by someone else's unexpired hold.
    Held,
}

/// A conflicting row found in the store. `seat` is the existing row's key,
/// so a partial request blocked by a whole-table hold reports seat 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub seat: SeatKey,
    pub kind: ConflictKind,
}

/// Classifies every conflict between the requested groups and the current
/// store contents. `live_holds` must already be filtered to unexpired rows
/// carrying their hold id; holds under `requester` never conflict (that is
/// what makes renewal by the same caller succeed).
///
/// Full-table group: any allocation on the table blocks it, as does any
/// foreign hold. Partial group: an allocation or foreign hold at the
/// sentinel or at any requested seat blocks it.
pub fn find_conflicts(
    groups: &[SeatGroup],
    live_holds: &[(SeatKey, String)],
    allocations: &[SeatKey],
    requester: &str,
) -> Vec<Conflict> {
    let mut conflicts = Vec::new();

    for group in groups {
        let table = group.table_id.as_str();
        let allocs = allocations.iter().filter(|a| a.table_id == table);
        let holds = live_holds
            .iter()
            .filter(|(h, owner)| h.table_id == table && owner != requester);

        match &group.kind {
            GroupKind::Full => {
                for alloc in allocs {
                    conflicts.push(Conflict {
                        seat: alloc.clone(),
                        kind: ConflictKind::Sold,
                    });
                }
                for (hold, _) in holds {
                    conflicts.push(Conflict {
                        seat: hold.clone(),
                        kind: ConflictKind::Held,
                    });
                }
            }
            GroupKind::Partial(seats) => {
                for alloc in allocs {
                    if alloc.is_full_table() || seats.contains(&alloc.seat_no) {
                        conflicts.push(Conflict {
                            seat: alloc.clone(),
                            kind: ConflictKind::Sold,
                        });
                    }
                }
                for (hold, _) in holds {
                    if hold.is_full_table() || seats.contains(&hold.seat_no) {
                        conflicts.push(Conflict {
                            seat: hold.clone(),
                            kind: ConflictKind::Held,
                        });
                    }
                }
            }
        }
    }

    conflicts.sort_by(|a, b| a.seat.cmp(&b.seat));
    conflicts.dedup();
    conflicts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(table: &str, nums: &[i16]) -> Vec<SeatKey> {
        nums.iter().map(|&n| SeatKey::new(table, n)).collect()
    }

    #[test]
    fn test_sentinel_collapses_to_full() {
        let groups = normalize(&keys("A", &[0, 3, 5]), 10);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].kind, GroupKind::Full);
        assert_eq!(groups[0].seat_keys(), vec![SeatKey::new("A", 0)]);
    }

    #[test]
    fn test_exact_capacity_collapses_to_full() {
        let all: Vec<i16> = (1..=10).collect();
        let groups = normalize(&keys("A", &all), 10);
        assert_eq!(groups[0].kind, GroupKind::Full);

        // With a different configured capacity the same ten seats stay partial.
        let groups = normalize(&keys("A", &all), 12);
        assert_eq!(groups[0].kind, GroupKind::Partial(all));
    }

    #[test]
    fn test_partial_dedups_sorts_and_drops_nonpositive() {
        let groups = normalize(&keys("A", &[5, 2, 5, -1, 2]), 10);
        assert_eq!(groups[0].kind, GroupKind::Partial(vec![2, 5]));
    }

    #[test]
    fn test_normalize_groups_by_table() {
        let mut seats = keys("B", &[1, 2]);
        seats.extend(keys("A", &[0]));
        let groups = normalize(&seats, 10);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].table_id, "A");
        assert_eq!(groups[0].kind, GroupKind::Full);
        assert_eq!(groups[1].table_id, "B");
        assert_eq!(groups[1].kind, GroupKind::Partial(vec![1, 2]));
    }

    #[test]
    fn test_expand_full_table_yields_capacity_rows() {
        let rows = expand(&[SeatKey::new("B", 0)], 10);
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[0], SeatKey::new("B", 1));
        assert_eq!(rows[9], SeatKey::new("B", 10));
    }

    #[test]
    fn test_expand_normalize_round_trip() {
        // expand(normalize(x)) == expand(x) for fully-full and fully-partial input.
        let full: Vec<i16> = (1..=10).collect();
        let full_keys = keys("A", &full);
        let normalized: Vec<SeatKey> = normalize(&full_keys, 10)
            .iter()
            .flat_map(|g| g.seat_keys())
            .collect();
        assert_eq!(expand(&normalized, 10), expand(&full_keys, 10));

        let partial_keys = keys("A", &[3, 7]);
        let normalized: Vec<SeatKey> = normalize(&partial_keys, 10)
            .iter()
            .flat_map(|g| g.seat_keys())
            .collect();
        assert_eq!(expand(&normalized, 10), expand(&partial_keys, 10));
    }

    #[test]
    fn test_full_request_blocked_by_single_sold_seat() {
        let groups = normalize(&keys("A", &[0]), 10);
        let conflicts = find_conflicts(&groups, &[], &[SeatKey::new("A", 4)], "h1");
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::Sold);
        assert_eq!(conflicts[0].seat, SeatKey::new("A", 4));
    }

    #[test]
    fn test_partial_request_blocked_by_whole_table_rows() {
        let groups = normalize(&keys("A", &[3]), 10);

        let sold_whole = find_conflicts(&groups, &[], &[SeatKey::new("A", 0)], "h1");
        assert_eq!(sold_whole[0].kind, ConflictKind::Sold);
        assert_eq!(sold_whole[0].seat, SeatKey::new("A", 0));

        let held_whole = find_conflicts(
            &groups,
            &[(SeatKey::new("A", 0), "h2".to_string())],
            &[],
            "h1",
        );
        assert_eq!(held_whole[0].kind, ConflictKind::Held);
        assert_eq!(held_whole[0].seat, SeatKey::new("A", 0));
    }

    #[test]
    fn test_own_hold_never_conflicts() {
        let groups = normalize(&keys("A", &[1, 2]), 10);
        let holds = vec![
            (SeatKey::new("A", 1), "h1".to_string()),
            (SeatKey::new("A", 2), "h1".to_string()),
        ];
        assert!(find_conflicts(&groups, &holds, &[], "h1").is_empty());
        assert_eq!(find_conflicts(&groups, &holds, &[], "h2").len(), 2);
    }

    #[test]
    fn test_unrelated_tables_do_not_conflict() {
        let groups = normalize(&keys("A", &[1]), 10);
        let holds = vec![(SeatKey::new("B", 1), "h2".to_string())];
        assert!(find_conflicts(&groups, &holds, &[SeatKey::new("C", 0)], "h1").is_empty());
    }
}
