use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;

use lotto_db::models::GameFormat;

use crate::analysis::sampler::Pick;

pub const PLAY_LINES: usize = 10;

/// Lines drawn from a shared shuffled pool holding each number once.
///
/// The pool is topped up with a fresh shuffled copy of the domain whenever it
/// holds fewer numbers than a line needs, so coverage stays close to uniform
/// across lines. A number popped twice for the same line is dropped.
pub fn balanced_random_lines<R: Rng + ?Sized>(
    n_lines: usize,
    format: GameFormat,
    rng: &mut R,
) -> Vec<Pick> {
    let domain = format.domain();
    let per_line = format.pick_size.min(domain.len());

    let mut pool = domain.clone();
    pool.shuffle(rng);

    let mut lines = Vec::with_capacity(n_lines);
    for _ in 0..n_lines {
        if pool.len() < per_line {
            pool.extend_from_slice(&domain);
            pool.shuffle(rng);
        }

        let mut line = BTreeSet::new();
        while line.len() < per_line {
            match pool.pop() {
                Some(n) => {
                    line.insert(n);
                }
                None => {
                    pool.extend_from_slice(&domain);
                    pool.shuffle(rng);
                }
            }
        }
        lines.push(line.into_iter().collect());
    }

    lines
}
