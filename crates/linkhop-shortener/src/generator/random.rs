use crate::generator::Generator;
use linkhop_core::shortcode::{ALPHABET, GENERATED_MAX_LENGTH, GENERATED_MIN_LENGTH};
use linkhop_core::ShortCode;
use rand::Rng;

/// Draws codes of random length from the 62-symbol alphabet.
///
/// Each call picks a length uniformly from 4..=6, then each symbol
/// uniformly and independently. The randomness is not cryptographic;
/// codes are identifiers, not secrets.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomGenerator;

impl RandomGenerator {
    pub fn new() -> Self {
        Self
    }

    fn generate_with<R: Rng>(rng: &mut R) -> ShortCode {
        let length = rng.random_range(GENERATED_MIN_LENGTH..=GENERATED_MAX_LENGTH);
        let code: String = (0..length)
            .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
            .collect();
        ShortCode::new_unchecked(code)
    }
}

impl Generator for RandomGenerator {
    fn generate(&self) -> ShortCode {
        Self::generate_with(&mut rand::rng())
    }
}
