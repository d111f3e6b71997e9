// String similarity scoring.
//
// One scale everywhere: 0.0 (nothing in common) to 100.0 (identical).
// `SequenceRatio` is the canonical scorer; partial (containment) scoring is
// derived from whichever scorer is in use rather than being a separate
// heuristic, so the linker and the query resolver agree on what a score
// means and share one acceptance threshold.

/// Minimum score, inclusive, for a fuzzy candidate to be accepted.
pub const DEFAULT_THRESHOLD: f64 = 80.0;

const MAX_SCORE: f64 = 100.0;

/// A string similarity function on the 0–100 scale.
pub trait Scorer: Send + Sync {
    /// Whole-string similarity of `a` and `b`.
    fn score(&self, a: &str, b: &str) -> f64;

    /// Best `score` of the shorter string against every equally long window
    /// of the longer one. Tolerates one string being a prefix, substring, or
    /// superstring of the other.
    fn partial_score(&self, a: &str, b: &str) -> f64 {
        let a_chars: Vec<char> = a.chars().collect();
        let b_chars: Vec<char> = b.chars().collect();
        let (short, long) = if a_chars.len() <= b_chars.len() {
            (a_chars, b_chars)
        } else {
            (b_chars, a_chars)
        };

        if short.is_empty() || short.len() == long.len() {
            return self.score(a, b);
        }

        let needle: String = short.iter().collect();
        let width = short.len();
        let mut best = 0.0_f64;
        for start in 0..=(long.len() - width) {
            let window: String = long[start..start + width].iter().collect();
            best = best.max(self.score(&needle, &window));
            if best >= MAX_SCORE {
                break;
            }
        }
        best
    }
}

fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, MAX_SCORE)
    }
}

// ---------------------------------------------------------------------------
// SequenceRatio (Ratcliff/Obershelp)
// ---------------------------------------------------------------------------

/// Ratcliff/Obershelp "gestalt" ratio: `2 * M / T`, where `M` counts the
/// characters in recursively found longest common blocks and `T` is the
/// combined length. Two empty strings are identical.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceRatio;

impl SequenceRatio {
    fn ratio_chars(a: &[char], b: &[char]) -> f64 {
        let total = a.len() + b.len();
        if total == 0 {
            return MAX_SCORE;
        }
        let matched = matching_chars(a, b);
        clamp_score(2.0 * matched as f64 / total as f64 * MAX_SCORE)
    }
}

impl Scorer for SequenceRatio {
    fn score(&self, a: &str, b: &str) -> f64 {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        Self::ratio_chars(&a, &b)
    }
}

/// Total length of all matching blocks between `a` and `b`.
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((a_lo, a_hi, b_lo, b_hi)) = pending.pop() {
        let (i, j, len) = longest_common_block(&a[a_lo..a_hi], &b[b_lo..b_hi]);
        if len == 0 {
            continue;
        }
        total += len;
        let (i, j) = (a_lo + i, b_lo + j);
        pending.push((a_lo, i, b_lo, j));
        pending.push((i + len, a_hi, j + len, b_hi));
    }
    total
}

/// Longest common contiguous block as `(start_in_a, start_in_b, len)`.
/// On ties the block starting earliest in `a`, then in `b`, wins.
fn longest_common_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        for (j, cb) in b.iter().enumerate() {
            cur[j + 1] = if ca == cb { prev[j] + 1 } else { 0 };
            let len = cur[j + 1];
            if len > best.2 {
                best = (i + 1 - len, j + 1 - len, len);
            }
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    best
}

// ---------------------------------------------------------------------------
// JaroWinkler
// ---------------------------------------------------------------------------

/// Jaro-Winkler similarity from `strsim`, rescaled to 0–100.
#[derive(Debug, Clone, Copy, Default)]
pub struct JaroWinkler;

impl Scorer for JaroWinkler {
    fn score(&self, a: &str, b: &str) -> f64 {
        clamp_score(strsim::jaro_winkler(a, b) * MAX_SCORE)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn identical_strings_score_full() {
        assert!(approx(SequenceRatio.score("tenz", "tenz"), 100.0));
        assert!(approx(SequenceRatio.score("", ""), 100.0));
    }

    #[test]
    fn disjoint_strings_score_zero() {
        assert!(approx(SequenceRatio.score("abc", "xyz"), 0.0));
        assert!(approx(SequenceRatio.score("", "xyz"), 0.0));
    }

    #[test]
    fn known_gestalt_ratios() {
        // "bcd" is the only block: 2*3/8.
        assert!(approx(SequenceRatio.score("abcd", "bcde"), 75.0));
        // "tenz" then "1": 2*5/11.
        assert!(approx(SequenceRatio.score("tenz1", "tenz01"), 1000.0 / 11.0));
    }

    #[test]
    fn blocks_found_on_both_sides_of_longest_match() {
        // "bxyz" is the longest block; "d" is then found to its right.
        let s = SequenceRatio.score("abxyzcd", "bxyzd");
        assert!(approx(s, 2.0 * 5.0 / 12.0 * 100.0));
    }

    #[test]
    fn counts_unicode_scalars_not_bytes() {
        assert!(approx(SequenceRatio.score("café", "cafe"), 75.0));
    }

    #[test]
    fn partial_score_rewards_containment() {
        assert!(approx(SequenceRatio.partial_score("tenz", "tenzzz"), 100.0));
        assert!(approx(SequenceRatio.partial_score("sentinels esports", "sentinels"), 100.0));
        assert!(SequenceRatio.score("tenz", "tenzzz") < 100.0);
    }

    #[test]
    fn partial_score_equal_lengths_falls_back_to_score() {
        assert!(approx(
            SequenceRatio.partial_score("abcd", "bcde"),
            SequenceRatio.score("abcd", "bcde")
        ));
    }

    #[test]
    fn partial_score_with_empty_side() {
        assert!(approx(SequenceRatio.partial_score("", "abc"), 0.0));
        assert!(approx(SequenceRatio.partial_score("", ""), 100.0));
    }

    #[test]
    fn jaro_winkler_is_rescaled() {
        assert!(approx(JaroWinkler.score("tenz", "tenz"), 100.0));
        let s = JaroWinkler.score("tenz1", "tenz01");
        assert!(s > 80.0 && s < 100.0);
    }

    proptest! {
        #[test]
        fn sequence_ratio_stays_in_bounds(a in ".{0,24}", b in ".{0,24}") {
            let s = SequenceRatio.score(&a, &b);
            prop_assert!((0.0..=100.0).contains(&s));
            let p = SequenceRatio.partial_score(&a, &b);
            prop_assert!((0.0..=100.0).contains(&p));
        }

        #[test]
        fn sequence_ratio_is_deterministic(a in "[a-z0-9 ]{0,16}", b in "[a-z0-9 ]{0,16}") {
            prop_assert_eq!(SequenceRatio.score(&a, &b), SequenceRatio.score(&a, &b));
        }

        #[test]
        fn jaro_winkler_stays_in_bounds(a in ".{0,24}", b in ".{0,24}") {
            let s = JaroWinkler.score(&a, &b);
            prop_assert!((0.0..=100.0).contains(&s));
        }
    }
}
