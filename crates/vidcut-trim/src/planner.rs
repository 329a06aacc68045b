//! Seek-start computation for a single file.

use std::time::Duration;

/// Offset from which extraction starts so that `retained_seconds` of media
/// remain, clamped to the start of the file.
#[must_use]
pub fn compute_seek_start(total_duration: Duration, retained_seconds: u32) -> Duration {
    total_duration.saturating_sub(Duration::from_secs(u64::from(retained_seconds)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seek_start_keeps_the_tail() {
        assert_eq!(
            compute_seek_start(Duration::from_secs(120), 30),
            Duration::from_secs(90)
        );
        assert_eq!(
            compute_seek_start(Duration::from_millis(60_500), 10),
            Duration::from_millis(50_500)
        );
    }

    #[test]
    fn seek_start_clamps_short_media_to_zero() {
        assert_eq!(
            compute_seek_start(Duration::from_secs(20), 30),
            Duration::ZERO
        );
        assert_eq!(
            compute_seek_start(Duration::from_secs(30), 30),
            Duration::ZERO
        );
        assert_eq!(compute_seek_start(Duration::ZERO, 1), Duration::ZERO);
    }

    #[test]
    fn seek_start_never_exceeds_total() {
        for total in [0_u64, 1, 29, 30, 31, 3_600] {
            for retained in [1_u32, 30, 3_600, u32::MAX] {
                let total = Duration::from_secs(total);
                let seek = compute_seek_start(total, retained);
                assert!(seek <= total);
            }
        }
    }
}
