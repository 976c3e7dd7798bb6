use serde_json::Value;

/// Index-aligned results of one driver invocation, one slot per chunk.
///
/// Executors never touch the slots directly: each reports `(index, result)` when
/// joined and the dispatcher fills that index. An index is only ever dispatched
/// to one executor per round, so each slot has a single writer.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSlots {
    slots: Vec<Option<Value>>,
}

impl ResultSlots {
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![None; len],
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn fill(&mut self, index: usize, result: Value) {
        debug_assert!(self.slots[index].is_none(), "slot {} written twice", index);
        self.slots[index] = Some(result);
    }

    /// Indices still waiting for a result, in ascending order.
    pub fn pending(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_none())
            .map(|(index, _)| index)
            .collect()
    }

    /// A round is complete exactly when no slot is empty.
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    pub fn into_inner(self) -> Vec<Option<Value>> {
        self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_slots_are_all_pending() {
        let slots = ResultSlots::new(3);

        assert_eq!(slots.pending(), vec![0, 1, 2]);
        assert!(!slots.is_complete());
    }

    #[test]
    fn test_fill_completes() {
        let mut slots = ResultSlots::new(2);
        slots.fill(1, json!([2]));
        assert_eq!(slots.pending(), vec![0]);

        slots.fill(0, json!([1]));
        assert!(slots.is_complete());
        assert_eq!(slots.into_inner(), vec![Some(json!([1])), Some(json!([2]))]);
    }

    #[test]
    fn test_zero_slots_are_complete() {
        assert!(ResultSlots::new(0).is_complete());
    }
}
