//! Join-code generation.

use rand::Rng;

use cohabit_core::{JOIN_CODE_ALPHABET, JOIN_CODE_LEN, JoinCode};

/// Source of candidate join codes.
///
/// A trait seam so lifecycle tests can script collisions deterministically;
/// production draws at random.
pub trait JoinCodeSource: Send + Sync {
    /// Draw one candidate code.
    fn draw(&self) -> JoinCode;
}

/// Draws each position uniformly from the join-code alphabet.
#[derive(Debug, Default)]
pub struct RandomCodes;

impl JoinCodeSource for RandomCodes {
    fn draw(&self) -> JoinCode {
        let mut rng = rand::thread_rng();
        let indices: [usize; JOIN_CODE_LEN] =
            core::array::from_fn(|_| rng.gen_range(0..JOIN_CODE_ALPHABET.len()));
        JoinCode::from_indices(indices)
    }
}
