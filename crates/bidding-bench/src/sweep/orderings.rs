use bidding_core::CardSequence;
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

/// Card sequences led by the highest card, followed by an ordering of the rest.
pub struct CardOrderings {
    orderings: Vec<CardSequence>,
}

impl CardOrderings {
    /// Orderings of `1..highest` in lexicographic order, at most `limit` of them.
    pub fn enumerate(highest: u32, limit: Option<usize>) -> Self {
        let rest: Vec<u32> = (1..highest).collect();
        let limit = limit.unwrap_or(usize::MAX);
        let mut orderings = Vec::new();
        let mut prefix = Vec::with_capacity(rest.len());
        let mut used = vec![false; rest.len()];
        generate(highest, &rest, &mut prefix, &mut used, limit, &mut orderings);
        Self { orderings }
    }

    /// `count` independently shuffled orderings drawn from `seed`.
    pub fn sampled(highest: u32, count: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut rest: Vec<u32> = (1..highest).collect();
        let orderings = (0..count)
            .map(|_| {
                rest.shuffle(&mut rng);
                CardSequence::led_by(highest, &rest)
            })
            .collect();
        Self { orderings }
    }

    pub fn as_slice(&self) -> &[CardSequence] {
        &self.orderings
    }

    pub fn len(&self) -> usize {
        self.orderings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orderings.is_empty()
    }
}

fn generate(
    leader: u32,
    rest: &[u32],
    prefix: &mut Vec<u32>,
    used: &mut [bool],
    limit: usize,
    output: &mut Vec<CardSequence>,
) {
    if output.len() >= limit {
        return;
    }

    if prefix.len() == rest.len() {
        output.push(CardSequence::led_by(leader, prefix));
        return;
    }

    for idx in 0..rest.len() {
        if used[idx] {
            continue;
        }
        used[idx] = true;
        prefix.push(rest[idx]);
        generate(leader, rest, prefix, used, limit, output);
        prefix.pop();
        used[idx] = false;
        if output.len() >= limit {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_lexicographic_orderings() {
        let orderings = CardOrderings::enumerate(4, None);
        let rendered: Vec<String> = orderings
            .as_slice()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            rendered,
            vec![
                "(4, 1, 2, 3)",
                "(4, 1, 3, 2)",
                "(4, 2, 1, 3)",
                "(4, 2, 3, 1)",
                "(4, 3, 1, 2)",
                "(4, 3, 2, 1)",
            ]
        );
    }

    #[test]
    fn limit_truncates_enumeration() {
        let orderings = CardOrderings::enumerate(6, Some(7));
        assert_eq!(orderings.len(), 7);
        assert_eq!(
            orderings.as_slice()[6],
            CardSequence::from([6, 1, 3, 2, 4, 5])
        );
        assert_eq!(CardOrderings::enumerate(5, None).len(), 24);
    }

    #[test]
    fn sampling_is_reproducible() {
        let a = CardOrderings::sampled(9, 5, 42);
        let b = CardOrderings::sampled(9, 5, 42);
        assert_eq!(a.as_slice(), b.as_slice());
        for cards in a.as_slice() {
            assert_eq!(cards.next_card(), Some(9));
            let mut rest = cards.remainder().as_slice().to_vec();
            rest.sort_unstable();
            assert_eq!(rest, (1..9).collect::<Vec<u32>>());
        }
    }

    #[test]
    fn two_card_deck_has_one_ordering() {
        let orderings = CardOrderings::enumerate(2, None);
        assert_eq!(orderings.as_slice(), &[CardSequence::from([2, 1])]);
        assert!(!orderings.is_empty());
    }
}
