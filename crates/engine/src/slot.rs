use serde::Deserialize;
use serde::Serialize;

/// One of the two fixed logical player positions in a match.
/// Distinct from a connection or identity, which may rebind across reconnects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    A,
    B,
}

impl Slot {
    pub const BOTH: [Slot; 2] = [Slot::A, Slot::B];
    /// The opposing slot.
    pub fn other(self) -> Self {
        match self {
            Slot::A => Slot::B,
            Slot::B => Slot::A,
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Slot::A => write!(f, "A"),
            Slot::B => write!(f, "B"),
        }
    }
}

/// Fixed-size storage with one value per slot, indexable by [`Slot`].
/// Serializes as `{"A": .., "B": ..}` for wire payloads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerSlot<T> {
    #[serde(rename = "A")]
    a: T,
    #[serde(rename = "B")]
    b: T,
}

impl<T> PerSlot<T> {
    pub fn new(a: T, b: T) -> Self {
        Self { a, b }
    }
    /// Build from a function of each slot.
    pub fn init(mut f: impl FnMut(Slot) -> T) -> Self {
        Self {
            a: f(Slot::A),
            b: f(Slot::B),
        }
    }
    /// Map both values, preserving slot association.
    pub fn map<U>(&self, mut f: impl FnMut(Slot, &T) -> U) -> PerSlot<U> {
        PerSlot {
            a: f(Slot::A, &self.a),
            b: f(Slot::B, &self.b),
        }
    }
}

impl<T> std::ops::Index<Slot> for PerSlot<T> {
    type Output = T;
    fn index(&self, slot: Slot) -> &T {
        match slot {
            Slot::A => &self.a,
            Slot::B => &self.b,
        }
    }
}

impl<T> std::ops::IndexMut<Slot> for PerSlot<T> {
    fn index_mut(&mut self, slot: Slot) -> &mut T {
        match slot {
            Slot::A => &mut self.a,
            Slot::B => &mut self.b,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn other_is_involutive() {
        assert_eq!(Slot::A.other(), Slot::B);
        assert_eq!(Slot::B.other(), Slot::A);
        assert_eq!(Slot::A.other().other(), Slot::A);
    }
    #[test]
    fn per_slot_indexing() {
        let mut pair = PerSlot::new(1, 2);
        assert_eq!(pair[Slot::A], 1);
        assert_eq!(pair[Slot::B], 2);
        pair[Slot::A] += 10;
        assert_eq!(pair[Slot::A], 11);
    }
    #[test]
    fn per_slot_wire_shape() {
        let pair = PerSlot::new(500, 450);
        let json = serde_json::to_string(&pair).expect("serialize");
        assert_eq!(json, r#"{"A":500,"B":450}"#);
    }
}
