// Logical axis ids -> physical axis slots
use crate::domain::series::AxisSlot;
use std::collections::HashMap;

/// The resolved logical-to-physical axis mapping for one configuration.
/// Recomputed on configuration change only, never per update cycle.
#[derive(Debug, Clone, Default)]
pub struct AxisAssignment {
    slots: HashMap<String, AxisSlot>,
    degraded: bool,
}

impl AxisAssignment {
    /// Slot for one entity's declared axis id. Entities without a
    /// declaration, and ids unknown to the mapping, land on the primary.
    pub fn slot_for(&self, axis_id: Option<&str>) -> AxisSlot {
        axis_id
            .and_then(|id| self.slots.get(id).copied())
            .unwrap_or(AxisSlot::Primary)
    }

    pub fn uses_secondary(&self) -> bool {
        self.slots.values().any(|s| *s == AxisSlot::Secondary)
    }

    /// Whether some configured entity actually declared this axis id.
    pub fn is_mapped(&self, axis_id: &str) -> bool {
        self.slots.contains_key(axis_id)
    }

    /// True when more than two logical axes were requested and the extras
    /// collapsed onto the primary slot.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }
}

/// Reconcile the logical axis ids declared by the configured entities down
/// to the two physical slots a backend exposes. The distinct ids are sorted
/// lexicographically before assignment, so the mapping is deterministic and
/// independent of entity declaration order: first id -> primary, second ->
/// secondary, everything beyond the second -> primary again.
pub fn map_axes<'a, I>(axis_ids: I) -> AxisAssignment
where
    I: IntoIterator<Item = &'a str>,
{
    let mut distinct: Vec<&str> = axis_ids.into_iter().collect();
    distinct.sort_unstable();
    distinct.dedup();

    let mut slots = HashMap::with_capacity(distinct.len());
    for (index, id) in distinct.iter().enumerate() {
        let slot = if index == 1 {
            AxisSlot::Secondary
        } else {
            AxisSlot::Primary
        };
        slots.insert((*id).to_string(), slot);
    }

    let degraded = distinct.len() > 2;
    if degraded {
        tracing::warn!(
            "{} logical axes requested but only two slots are available; extras collapse onto the primary axis",
            distinct.len()
        );
    }

    AxisAssignment { slots, degraded }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_declared_ids_all_primary() {
        let assignment = map_axes([]);
        assert_eq!(assignment.slot_for(None), AxisSlot::Primary);
        assert_eq!(assignment.slot_for(Some("anything")), AxisSlot::Primary);
        assert!(!assignment.uses_secondary());
        assert!(!assignment.is_degraded());
    }

    #[test]
    fn test_two_ids_split_across_slots() {
        let assignment = map_axes(["0", "1"]);
        assert_eq!(assignment.slot_for(Some("0")), AxisSlot::Primary);
        assert_eq!(assignment.slot_for(Some("1")), AxisSlot::Secondary);
        assert!(assignment.uses_secondary());
        assert!(!assignment.is_degraded());
        assert!(assignment.is_mapped("0"));
        assert!(!assignment.is_mapped("2"));
    }

    #[test]
    fn test_third_id_collapses_onto_primary() {
        let assignment = map_axes(["0", "1", "2"]);
        assert_eq!(assignment.slot_for(Some("0")), AxisSlot::Primary);
        assert_eq!(assignment.slot_for(Some("1")), AxisSlot::Secondary);
        assert_eq!(assignment.slot_for(Some("2")), AxisSlot::Primary);
        assert!(assignment.is_degraded());
    }

    #[test]
    fn test_mapping_ignores_declaration_order() {
        let forward = map_axes(["temp", "hum", "co2"]);
        let backward = map_axes(["co2", "hum", "temp"]);
        for id in ["temp", "hum", "co2"] {
            assert_eq!(forward.slot_for(Some(id)), backward.slot_for(Some(id)));
        }
    }

    #[test]
    fn test_duplicates_do_not_shift_assignment() {
        let assignment = map_axes(["a", "a", "b", "a"]);
        assert_eq!(assignment.slot_for(Some("a")), AxisSlot::Primary);
        assert_eq!(assignment.slot_for(Some("b")), AxisSlot::Secondary);
        assert!(!assignment.is_degraded());
    }

    #[test]
    fn test_never_more_than_two_distinct_slots() {
        let ids: Vec<String> = (0..20).map(|i| format!("axis-{i:02}")).collect();
        let assignment = map_axes(ids.iter().map(String::as_str));
        let secondaries = ids
            .iter()
            .filter(|id| assignment.slot_for(Some(id)) == AxisSlot::Secondary)
            .count();
        assert_eq!(secondaries, 1);
        assert!(assignment.is_degraded());
    }
}
