//! Hash / PRNG primitives.
//!
//! Every strategy's deterministic-from-name construction and seeded
//! randomness bottoms out here. Two pieces:
//!
//! - [`djb2`]: a fast, non-cryptographic string hash used to turn
//!   `(theoryId, name)` pairs into a 64-bit seed.
//! - [`SplitMix64`]: a seeded PRNG producing uniform 32-bit words and
//!   uniform `f64` reals. Each seeded factory call constructs a fresh
//!   generator: PRNG instances are never shared across calls.

/// DJB2-class string hash (Bernstein's `djb2`, 64-bit variant).
///
/// `hash = 5381; hash = hash * 33 + byte` per input byte. Chosen for
/// determinism and speed, not collision resistance: this is a seed
/// derivation, not a content hash.
pub fn djb2(s: &str) -> u64 {
    let mut hash: u64 = 5381;
    for byte in s.as_bytes() {
        hash = hash.wrapping_mul(33).wrapping_add(*byte as u64);
    }
    hash
}

/// Theory-scoped seed: `djb2(theoryId ":" name)`, used by dense-binary
/// and metric-affine's `createFromName`.
pub fn theory_scoped_seed(theory_id: &str, name: &str) -> u64 {
    let mut scoped = String::with_capacity(theory_id.len() + 1 + name.len());
    scoped.push_str(theory_id);
    scoped.push(':');
    scoped.push_str(name);
    djb2(&scoped)
}

/// A SplitMix64-style seeded generator.
///
/// Backs every call site that needs a seeded PRNG: random vectors,
/// from-name variation strides, Min-Hash mixing, SP's `fromName`.
/// Deterministic given the seed: two generators built from the same
/// seed produce byte-identical output streams.
#[derive(Clone, Debug)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    /// Build a generator from an explicit seed.
    pub fn new(seed: u64) -> Self {
        SplitMix64 { state: seed }
    }

    /// Build a generator seeded from process entropy (`rand`'s
    /// thread-local source), for unseeded `createRandom` calls.
    pub fn from_entropy() -> Self {
        use rand::RngCore;
        SplitMix64 {
            state: rand::rng().next_u64(),
        }
    }

    /// Next raw 64-bit word via the SplitMix64 mixer.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E3779B97F4A7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }

    /// Next uniform 32-bit word (low half of a mixed 64-bit word).
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        self.next_u64() as u32
    }

    /// Next uniform real in `[0, 1)`.
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        // Top 53 bits give a uniform double in [0,1), standard trick.
        let bits = self.next_u64() >> 11;
        (bits as f64) * (1.0 / (1u64 << 53) as f64)
    }

    /// `count` fresh 32-bit words, in draw order.
    pub fn next_u32_words(&mut self, count: usize) -> Vec<u32> {
        (0..count).map(|_| self.next_u32()).collect()
    }
}

/// Mix a 64-bit candidate for Min-Hash ranking in the sparse-polynomial
/// strategy.
///
/// A standalone, stateless mixer (not tied to generator state) so that
/// sparsification is a pure function of the input set: the same set of
/// exponents always ranks the same way regardless of how it was produced.
#[inline]
pub fn splitmix64_mix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E3779B97F4A7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn djb2_matches_reference_iteration() {
        let mut expected: u64 = 5381;
        for b in b"animals:cat" {
            expected = expected.wrapping_mul(33).wrapping_add(*b as u64);
        }
        assert_eq!(djb2("animals:cat"), expected);
    }

    #[test]
    fn djb2_deterministic() {
        assert_eq!(djb2("hello"), djb2("hello"));
        assert_ne!(djb2("hello"), djb2("world"));
    }

    #[test]
    fn theory_scoped_seed_scopes_by_theory() {
        assert_ne!(
            theory_scoped_seed("animals", "cat"),
            theory_scoped_seed("food", "cat")
        );
    }

    #[test]
    fn splitmix64_deterministic_stream() {
        let mut a = SplitMix64::new(42);
        let mut b = SplitMix64::new(42);
        for _ in 0..16 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn splitmix64_f64_in_unit_range() {
        let mut g = SplitMix64::new(7);
        for _ in 0..1000 {
            let v = g.next_f64();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn mix_is_deterministic_pure_function() {
        assert_eq!(splitmix64_mix(123), splitmix64_mix(123));
    }
}
