//! Random source selection for topic-wide quizzes.

use super::entities::{Source, Topic};
use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};

/// Pick a source from `topic` at random.
///
/// With `use_priorities`, sources are weighted by their importance; when
/// every weight is zero the pick falls back to uniform. Returns `None` for a
/// topic without sources.
pub fn pick_source<'a, R: Rng + ?Sized>(
    topic: &'a Topic,
    use_priorities: bool,
    rng: &mut R,
) -> Option<&'a Source> {
    let sources = topic.sources();
    if sources.is_empty() {
        return None;
    }

    if use_priorities {
        let weights: Vec<u32> = sources.iter().map(|s| u32::from(s.importance())).collect();
        // WeightedIndex rejects all-zero weights
        if let Ok(dist) = WeightedIndex::new(&weights) {
            return sources.get(dist.sample(rng));
        }
    }

    sources.get(rng.gen_range(0..sources.len()))
}
