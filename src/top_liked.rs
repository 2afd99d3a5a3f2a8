use std::collections::HashSet;

use serde::Serialize;

use crate::models::Player;

pub const DEFAULT_TOP_K: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LikedPlayer {
    pub player: Player,
    pub likes: u32,
}

/// Cutoff values read off the first `k` positions of the counts sorted descending.
///
/// Positions are taken with duplicates, so `[5, 5, 5, 3]` with `k = 3` yields only `5`.
/// Zero never qualifies. The result is distinct and descending.
pub fn like_thresholds(counts: &[u32], k: usize) -> Vec<u32> {
    let mut sorted = counts.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    let mut out: Vec<u32> = sorted.into_iter().take(k).filter(|c| *c > 0).collect();
    out.dedup();
    out
}

/// Players whose like count equals one of the `k` positional thresholds.
///
/// `like_count_of` is evaluated once per player. A player listed twice is returned once. Output
/// is ordered by likes descending, ties in input order.
pub fn top_liked<F>(players: &[Player], mut like_count_of: F, k: usize) -> Vec<LikedPlayer>
where
    F: FnMut(&Player) -> u32,
{
    let counted: Vec<(&Player, u32)> = players.iter().map(|p| (p, like_count_of(p))).collect();
    let counts: Vec<u32> = counted.iter().map(|(_, c)| *c).collect();
    let thresholds = like_thresholds(&counts, k);
    if thresholds.is_empty() {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    let mut out: Vec<LikedPlayer> = counted
        .into_iter()
        .filter(|(_, likes)| thresholds.contains(likes))
        .filter(|(p, _)| seen.insert(p.id))
        .map(|(p, likes)| LikedPlayer {
            player: p.clone(),
            likes,
        })
        .collect();
    out.sort_by(|a, b| b.likes.cmp(&a.likes));
    out
}

#[cfg(test)]
mod tests {
    use super::like_thresholds;

    #[test]
    fn thresholds_are_positional_not_distinct() {
        assert_eq!(like_thresholds(&[5, 5, 5, 3, 1, 0], 3), vec![5]);
        assert_eq!(like_thresholds(&[3, 5, 3, 4, 1], 3), vec![5, 4, 3]);
        assert_eq!(like_thresholds(&[4, 4, 2, 2, 2], 3), vec![4, 2]);
    }

    #[test]
    fn thresholds_drop_zero_and_short_inputs() {
        assert_eq!(like_thresholds(&[2, 0, 0], 3), vec![2]);
        assert_eq!(like_thresholds(&[0, 0], 3), Vec::<u32>::new());
        assert_eq!(like_thresholds(&[1, 2], 3), vec![2, 1]);
        assert_eq!(like_thresholds(&[], 3), Vec::<u32>::new());
        assert_eq!(like_thresholds(&[9, 8], 0), Vec::<u32>::new());
    }
}
