use rand::{rngs::OsRng, Rng, RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use std::sync::{Arc, Mutex};

/// A fuzzer for generating random test data.
///
/// Uses the xoshiro256** PRNG so a seeded run replays the exact same
/// sequence; an unseeded run draws its seed from `OsRng`.
///
/// # Examples
///
/// ```
/// use deferred_list_util::fuzzer::Fuzzer;
///
/// let fuzzer = Fuzzer::new(Some([7u8; 32]));
/// let n = fuzzer.random_int(1, 10);
/// assert!((1..=10).contains(&n));
/// ```
pub struct Fuzzer {
    /// The seed used to initialize the PRNG.
    pub seed: [u8; 32],
    rng: Arc<Mutex<Xoshiro256StarStar>>,
}

impl Fuzzer {
    /// Create a new fuzzer with an optional seed.
    pub fn new(seed: Option<[u8; 32]>) -> Self {
        let seed = seed.unwrap_or_else(|| {
            let mut bytes = [0u8; 32];
            OsRng.fill_bytes(&mut bytes);
            bytes
        });

        let rng = Xoshiro256StarStar::from_seed(seed);

        Self {
            seed,
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    /// Generate a random integer in the range [min, max] (inclusive).
    pub fn random_int(&self, min: i64, max: i64) -> i64 {
        let mut rng = self.rng.lock().unwrap();
        rng.gen_range(min..=max)
    }

    /// Generate a random index in `0..len`.
    pub fn random_index(&self, len: usize) -> usize {
        let mut rng = self.rng.lock().unwrap();
        rng.gen_range(0..len)
    }

    /// Generate a random boolean with the given probability of being true.
    pub fn random_bool(&self, probability: f64) -> bool {
        let mut rng = self.rng.lock().unwrap();
        rng.gen_bool(probability)
    }
}
