/// Shortliffe combination of two certainty factors.
///
/// Opposing full-certainty evidence (`1.0` against `-1.0`) cancels to `0.0`.
pub fn combine(cf1: f64, cf2: f64) -> f64 {
    if cf1 > 0.0 && cf2 > 0.0 {
        cf1 + cf2 - cf1 * cf2
    } else if cf1 < 0.0 && cf2 < 0.0 {
        cf1 + cf2 + cf1 * cf2
    } else {
        let denominator = 1.0 - cf1.abs().min(cf2.abs());
        if denominator == 0.0 {
            0.0
        } else {
            (cf1 + cf2) / denominator
        }
    }
}

/// One running certainty factor per profession slot, all starting at zero.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CertaintyAccumulator {
    slots: Vec<f64>,
}

impl CertaintyAccumulator {
    pub(crate) fn new(professions: usize) -> Self {
        Self {
            slots: vec![0.0; professions],
        }
    }

    /// Folds `cf` into the slot. Callers must feed contributions in rule order.
    pub(crate) fn absorb(&mut self, slot: usize, cf: f64) {
        if let Some(current) = self.slots.get_mut(slot) {
            *current = combine(*current, cf);
        }
    }

    pub(crate) fn get(&self, slot: usize) -> f64 {
        self.slots.get(slot).copied().unwrap_or(0.0)
    }
}
