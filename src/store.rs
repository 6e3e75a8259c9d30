//! Flat particle storage.
//!
//! Particles live back to back in one contiguous allocation, six `f32`s per
//! record, so a frame over tens of thousands of particles never allocates.
//! Records are addressed by slot index only; a particle has no identity beyond
//! its slot.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// Number of `f32` values per particle record.
pub const RECORD_WIDTH: usize = 6;

/// One particle record: `[x, y, vx, vy, bx, by]`.
///
/// The layout is fixed (`#[repr(C)]`, no padding) so a slice of particles can
/// be viewed as a flat `&[f32]` of length `count * RECORD_WIDTH`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Particle {
    /// Current position.
    pub position: Vec2,
    /// Current velocity.
    pub velocity: Vec2,
    /// Origin the particle is pulled back toward. Fixed once assigned.
    pub origin: Vec2,
}

const _: () = assert!(std::mem::size_of::<Particle>() == RECORD_WIDTH * std::mem::size_of::<f32>());

impl Particle {
    /// A particle sitting still on its origin.
    #[inline]
    pub fn at_rest(origin: Vec2) -> Self {
        Self {
            position: origin,
            velocity: Vec2::ZERO,
            origin,
        }
    }

    /// Build from the six raw record values.
    #[inline]
    pub fn from_record(values: [f32; RECORD_WIDTH]) -> Self {
        bytemuck::cast(values)
    }

    /// The six raw record values.
    #[inline]
    pub fn to_record(self) -> [f32; RECORD_WIDTH] {
        bytemuck::cast(self)
    }

    /// Position and velocity are both finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite()
    }
}

/// Fixed-size arena of particle records.
///
/// The population is replaced wholesale on re-derivation; there is no
/// insert or remove.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleStore {
    records: Vec<Particle>,
}

impl ParticleStore {
    /// Zero-initialized store with room for exactly `count` records.
    pub fn allocate(count: usize) -> Self {
        Self {
            records: vec![Particle::zeroed(); count],
        }
    }

    /// Allocate and populate from origins, in iteration order.
    /// Every particle starts at rest on its origin.
    pub fn from_origins(origins: &[Vec2]) -> Self {
        let mut store = Self::allocate(origins.len());
        for (i, &origin) in origins.iter().enumerate() {
            store.write_record(i, Particle::at_rest(origin));
        }
        store
    }

    /// Number of records.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if the store holds no particles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Borrow record `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= len()`.
    #[inline]
    pub fn read_record(&self, i: usize) -> &Particle {
        self.check_index(i);
        &self.records[i]
    }

    /// Borrow record `i` as its six raw values.
    ///
    /// # Panics
    ///
    /// Panics if `i >= len()`.
    #[inline]
    pub fn record_values(&self, i: usize) -> &[f32; RECORD_WIDTH] {
        bytemuck::cast_ref(self.read_record(i))
    }

    /// Overwrite record `i` with all six fields at once.
    ///
    /// # Panics
    ///
    /// Panics if `i >= len()`.
    #[inline]
    pub fn write_record(&mut self, i: usize, particle: Particle) {
        self.check_index(i);
        self.records[i] = particle;
    }

    /// Visit every record once, in slot order. Returning `Some` replaces the
    /// record; `None` leaves it untouched.
    pub fn for_each_record<F>(&mut self, mut f: F)
    where
        F: FnMut(usize, &Particle) -> Option<Particle>,
    {
        for (i, record) in self.records.iter_mut().enumerate() {
            if let Some(next) = f(i, record) {
                *record = next;
            }
        }
    }

    /// Iterate over records in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Particle> + '_ {
        self.records.iter()
    }

    /// Flat view of the whole buffer. Record `i` occupies
    /// `[i * RECORD_WIDTH, i * RECORD_WIDTH + RECORD_WIDTH)`.
    #[inline]
    pub fn values(&self) -> &[f32] {
        bytemuck::cast_slice(&self.records)
    }

    #[inline]
    fn check_index(&self, i: usize) {
        assert!(
            i < self.records.len(),
            "particle index {i} out of range for store of {} records",
            self.records.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_allocate_is_zeroed() {
        let store = ParticleStore::allocate(5);
        assert_eq!(store.len(), 5);
        assert_eq!(store.values().len(), 5 * RECORD_WIDTH);
        assert!(store.values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_empty_store() {
        let store = ParticleStore::allocate(0);
        assert!(store.is_empty());
        assert!(store.values().is_empty());
        assert_eq!(store.iter().count(), 0);
    }

    #[test]
    fn test_record_layout() {
        let p = Particle {
            position: Vec2::new(1.0, 2.0),
            velocity: Vec2::new(3.0, 4.0),
            origin: Vec2::new(5.0, 6.0),
        };
        assert_eq!(p.to_record(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(Particle::from_record(p.to_record()), p);
    }

    #[test]
    fn test_write_addresses_only_its_window() {
        let mut store = ParticleStore::allocate(4);
        let p = Particle::from_record([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        store.write_record(2, p);

        let values = store.values();
        assert_eq!(&values[12..18], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert!(values[..12].iter().all(|&v| v == 0.0));
        assert!(values[18..].iter().all(|&v| v == 0.0));
        assert_eq!(store.record_values(2), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(store.read_record(2), &p);
    }

    #[test]
    fn test_from_origins_keeps_order() {
        let origins = [Vec2::new(3.0, 0.0), Vec2::new(0.0, 1.0), Vec2::new(7.0, 9.0)];
        let store = ParticleStore::from_origins(&origins);

        for (i, origin) in origins.iter().enumerate() {
            let p = store.read_record(i);
            assert_eq!(p.position, *origin);
            assert_eq!(p.origin, *origin);
            assert_eq!(p.velocity, Vec2::ZERO);
        }
    }

    #[test]
    fn test_for_each_visits_in_order_and_replaces() {
        let origins: Vec<Vec2> = (0..10).map(|i| Vec2::new(i as f32, 0.0)).collect();
        let mut store = ParticleStore::from_origins(&origins);

        let mut visited = Vec::new();
        store.for_each_record(|i, p| {
            visited.push(i);
            if i % 2 == 0 {
                Some(Particle { velocity: Vec2::ONE, ..*p })
            } else {
                None
            }
        });

        assert_eq!(visited, (0..10).collect::<Vec<_>>());
        for (i, p) in store.iter().enumerate() {
            let expected = if i % 2 == 0 { Vec2::ONE } else { Vec2::ZERO };
            assert_eq!(p.velocity, expected);
            assert_eq!(p.origin, origins[i]);
        }
    }

    proptest! {
        #[test]
        fn test_random_writes_never_alias(
            writes in prop::collection::vec((0..64usize, prop::array::uniform6(-1e3f32..1e3)), 0..1000),
        ) {
            let count = 64;
            let mut store = ParticleStore::allocate(count);
            let mut expected = vec![[0.0f32; RECORD_WIDTH]; count];

            for (i, values) in writes {
                store.write_record(i, Particle::from_record(values));
                expected[i] = values;
            }

            for (i, values) in expected.iter().enumerate() {
                prop_assert_eq!(store.record_values(i), values);
            }
        }
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_read_out_of_range_panics() {
        let store = ParticleStore::allocate(3);
        let _ = store.read_record(3);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_write_out_of_range_panics() {
        let mut store = ParticleStore::allocate(0);
        store.write_record(0, Particle::default());
    }
}
