use crate::events::Card;

/// Decides whether a group of cards forms a combination.
///
/// The dealer only ever asks two questions: is this exact group valid, and
/// does any valid group remain in a pool of cards. Everything about card
/// features lives behind this trait.
pub trait CombinationOracle: Send + Sync {
	/// Number of cards in a combination (K).
	fn combination_size(&self) -> usize;

	fn is_valid_combination(&self, cards: &[Card]) -> bool;

	/// Up to `limit` valid combinations found in `pool`, in index order.
	fn find_combinations(&self, pool: &[Card], limit: usize) -> Vec<Vec<Card>> {
		let mut found = Vec::new();
		if limit == 0 {
			return found;
		}
		for_each_subset(pool, self.combination_size(), |subset| {
			if self.is_valid_combination(subset) {
				found.push(subset.to_vec());
			}
			found.len() < limit
		});
		found
	}

	fn exists_combination(&self, pool: &[Card], min_count: usize) -> bool {
		self.find_combinations(pool, min_count.max(1)).len() >= min_count.max(1)
	}
}

/// Walks every `k`-subset of `pool` in lexicographic index order until `visit`
/// returns false.
pub fn for_each_subset<F>(pool: &[Card], k: usize, mut visit: F)
where
	F: FnMut(&[Card]) -> bool,
{
	let n = pool.len();
	if k == 0 || k > n {
		return;
	}
	let mut indices: Vec<usize> = (0..k).collect();
	let mut subset: Vec<Card> = indices.iter().map(|&i| pool[i]).collect();

	loop {
		if !visit(&subset) {
			return;
		}

		// rightmost index that can still move
		let Some(pos) = (0..k).rev().find(|&i| indices[i] < n - k + i) else {
			return;
		};

		indices[pos] += 1;
		for j in pos + 1..k {
			indices[j] = indices[j - 1] + 1;
		}
		for j in pos..k {
			subset[j] = pool[indices[j]];
		}
	}
}

/// The classic Set rule, generalised: a card index is read as
/// `feature_count` digits in base `feature_size`, and `feature_size` cards
/// form a set when every feature is either all-equal or all-distinct.
#[derive(Debug, Clone)]
pub struct SetOracle {
	feature_size: usize,
	feature_count: usize,
}

impl SetOracle {
	pub fn new(feature_size: usize, feature_count: usize) -> Self {
		Self { feature_size, feature_count }
	}

	pub fn features(&self, card: Card) -> Vec<u32> {
		let base = self.feature_size as u32;
		let mut rest = card.0;
		let mut features = Vec::with_capacity(self.feature_count);
		for _ in 0..self.feature_count {
			features.push(rest % base);
			rest /= base;
		}
		features
	}
}

impl CombinationOracle for SetOracle {
	fn combination_size(&self) -> usize {
		self.feature_size
	}

	fn is_valid_combination(&self, cards: &[Card]) -> bool {
		if cards.len() != self.feature_size {
			return false;
		}
		let decoded: Vec<Vec<u32>> = cards.iter().map(|c| self.features(*c)).collect();

		(0..self.feature_count).all(|feature| {
			let mut values: Vec<u32> = decoded.iter().map(|f| f[feature]).collect();
			values.sort_unstable();
			values.dedup();
			values.len() == 1 || values.len() == self.feature_size
		})
	}
}

/// Judges groups with an arbitrary predicate. Handy for scripted games where
/// the card layout is not known up front.
pub struct PredicateOracle<F> {
	size: usize,
	predicate: F,
}

impl<F> PredicateOracle<F>
where
	F: Fn(&[Card]) -> bool + Send + Sync,
{
	pub fn new(size: usize, predicate: F) -> Self {
		Self { size, predicate }
	}
}

impl<F> CombinationOracle for PredicateOracle<F>
where
	F: Fn(&[Card]) -> bool + Send + Sync,
{
	fn combination_size(&self) -> usize {
		self.size
	}

	fn is_valid_combination(&self, cards: &[Card]) -> bool {
		cards.len() == self.size && (self.predicate)(cards)
	}
}

/// Every group of the right size is a combination.
pub fn accept_all(size: usize) -> PredicateOracle<fn(&[Card]) -> bool> {
	fn always(_: &[Card]) -> bool {
		true
	}
	PredicateOracle::new(size, always as fn(&[Card]) -> bool)
}

/// No group is ever a combination.
pub fn reject_all(size: usize) -> PredicateOracle<fn(&[Card]) -> bool> {
	fn never(_: &[Card]) -> bool {
		false
	}
	PredicateOracle::new(size, never as fn(&[Card]) -> bool)
}
