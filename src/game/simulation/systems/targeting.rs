use crate::game::fixed_math::{FixedNum, FixedVec2};
use crate::game::simulation::entities::{EntityId, SimEntity};

/// Nearest living candidate to `from` by squared distance.
/// Ties go to the candidate seen first, so callers must pass insertion order.
pub fn nearest_living<'a, T, I>(candidates: I, from: FixedVec2) -> Option<EntityId>
where
    T: SimEntity + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut best: Option<(EntityId, FixedNum)> = None;
    for candidate in candidates {
        if !candidate.is_alive() {
            continue;
        }
        let distance_sq = from.distance_squared(candidate.position());
        if best.map_or(true, |(_, best_sq)| distance_sq < best_sq) {
            best = Some((candidate.id(), distance_sq));
        }
    }
    best.map(|(id, _)| id)
}
