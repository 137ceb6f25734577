use crate::models::Movie;

/// Assigns `ranking = len - index` over a list already sorted ascending by
/// rating: the lowest rated movie gets `len`, the highest rated gets 1.
///
/// Returns the `(id, rank)` pairs whose stored ranking changed so callers only
/// persist what moved.
// FIXME: rank 1 lands on the *worst* movie. Kept as-is until product confirms
// whether 1 should mean best (that would be `index + 1`).
pub fn assign_ranks(movies: &mut [Movie]) -> Vec<(i32, i32)> {
    let len = movies.len() as i32;
    let mut changed = Vec::new();
    for (index, movie) in movies.iter_mut().enumerate() {
        let rank = len - index as i32;
        if movie.ranking != Some(rank) {
            movie.ranking = Some(rank);
            changed.push((movie.id, rank));
        }
    }
    changed
}
