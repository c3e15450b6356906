use serde::{Deserialize, Serialize};

use crate::error::ProcessError;

/// Upper bound on the translation length cap
pub const TRANSLATION_MAX_LENGTH_CAP: usize = 512;
/// Lower bound on the translation length cap
pub const TRANSLATION_MIN_LENGTH_CAP: usize = 30;

/// Token budget for one summarization call.
///
/// Always satisfies `1 <= min_length` and `min_length + 3 <= max_length`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthBudget {
    pub min_length: usize,
    pub max_length: usize,
}

fn scaled(word_count: usize, factor: f64) -> usize {
    (word_count as f64 * factor).round() as usize
}

/// Derive summary length bounds from the input word count.
///
/// Short inputs get a budget close to their own length, medium inputs a
/// quarter to about two thirds of it, long inputs are capped at 150 tokens.
pub fn compute_budget(word_count: usize) -> Result<LengthBudget, ProcessError> {
    let (min_length, max_length) = match word_count {
        0 => return Err(ProcessError::EmptyInput),
        1..=19 => (scaled(word_count, 0.4).max(1), word_count + 10),
        20..=69 => {
            let min = scaled(word_count, 0.25).max(10);
            (min, (min + 15).max(scaled(word_count, 0.6)))
        }
        _ => {
            let min = scaled(word_count, 0.1).max(30);
            (min, (min + 20).max(scaled(word_count, 0.4)).min(150))
        }
    };

    Ok(clamp(min_length, max_length))
}

fn clamp(min_length: usize, max_length: usize) -> LengthBudget {
    let mut min_length = min_length.max(1);
    let mut max_length = max_length.max(min_length + 3).max(5);
    if min_length >= max_length {
        min_length = (max_length / 2).max(1);
        max_length = max_length.max(min_length + 3).max(5);
    }
    LengthBudget {
        min_length,
        max_length,
    }
}

/// Output length cap for a translation of `word_count` words
pub fn translation_max_length(word_count: usize) -> usize {
    (word_count * 4)
        .max(TRANSLATION_MIN_LENGTH_CAP)
        .min(TRANSLATION_MAX_LENGTH_CAP)
}
