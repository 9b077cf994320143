//! Coin / loyalty-reward arithmetic
//!
//! Pure functions, no I/O. Callers are not trusted to pass a sane
//! threshold: `threshold <= 0` is rejected instead of dividing by zero.

use serde::{Deserialize, Serialize};

/// Default coins earned per currency unit spent
pub const DEFAULT_COIN_RATE: i64 = 5;

/// Default coins required to unlock a reward
pub const DEFAULT_COIN_THRESHOLD: i64 = 100;

/// Progress towards the next reward at one restaurant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardProgress {
    /// Percentage of the threshold reached, clamped to `[0, 100]`
    pub progress_percent: f64,
    /// Coins still missing, never negative
    pub remaining: i64,
}

/// Error for a non-positive reward threshold
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("reward threshold must be positive, got {0}")]
pub struct InvalidThreshold(pub i64);

/// Compute reward progress for a coin balance against a threshold.
///
/// `progress_percent = clamp(coins / threshold * 100, 0, 100)`
/// `remaining = max(threshold - coins, 0)`
pub fn next_reward_progress(coins: i64, threshold: i64) -> Result<RewardProgress, InvalidThreshold> {
    if threshold <= 0 {
        return Err(InvalidThreshold(threshold));
    }
    let progress_percent = ((coins as f64 / threshold as f64) * 100.0).clamp(0.0, 100.0);
    let remaining = (threshold - coins).max(0);
    Ok(RewardProgress {
        progress_percent,
        remaining,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_balance() {
        let p = next_reward_progress(0, 100).unwrap();
        assert_eq!(p.progress_percent, 0.0);
        assert_eq!(p.remaining, 100);
    }

    #[test]
    fn exact_threshold() {
        let p = next_reward_progress(100, 100).unwrap();
        assert_eq!(p.progress_percent, 100.0);
        assert_eq!(p.remaining, 0);
    }

    #[test]
    fn over_threshold_is_clamped() {
        let p = next_reward_progress(150, 100).unwrap();
        assert_eq!(p.progress_percent, 100.0);
        assert_eq!(p.remaining, 0);
    }

    #[test]
    fn partial_progress() {
        let p = next_reward_progress(25, 100).unwrap();
        assert_eq!(p.progress_percent, 25.0);
        assert_eq!(p.remaining, 75);
    }

    #[test]
    fn negative_balance_is_clamped_to_zero_percent() {
        let p = next_reward_progress(-10, 100).unwrap();
        assert_eq!(p.progress_percent, 0.0);
        assert_eq!(p.remaining, 110);
    }

    #[test]
    fn non_positive_threshold_is_rejected() {
        assert_eq!(next_reward_progress(50, 0), Err(InvalidThreshold(0)));
        assert_eq!(next_reward_progress(50, -5), Err(InvalidThreshold(-5)));
    }
}
