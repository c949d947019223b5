//! Intersection of point data with an area mask, as done by hosts on selection notifications.

use emath::Pos2;
use itertools::Itertools;

use crate::{Mask, PixelPos, SelectionModifier};

/// Indices of all positions whose pixel is selected in `area`.
/// Positions are in viewport pixels, fractions are floored.
pub fn select_points(area: &Mask, positions: impl IntoIterator<Item = Pos2>) -> Vec<u32> {
    positions
        .into_iter()
        .zip(0u32..)
        .filter(|(pos, _)| area.is_selected(PixelPos::from(*pos)))
        .map(|(_, idx)| idx)
        .collect()
}

/// Merges the points hit by a gesture into the selection held before the gesture started
pub fn combine_selection(
    modifier: SelectionModifier,
    previous: &[u32],
    targets: &[u32],
) -> Vec<u32> {
    let sorted = |ids: &[u32]| ids.iter().copied().sorted_unstable().dedup().collect_vec();
    match modifier {
        SelectionModifier::Replace => sorted(targets),
        SelectionModifier::Add => previous
            .iter()
            .chain(targets)
            .copied()
            .sorted_unstable()
            .dedup()
            .collect(),
        SelectionModifier::Subtract => {
            let targets = sorted(targets);
            sorted(previous)
                .into_iter()
                .filter(|id| targets.binary_search(id).is_err())
                .collect()
        }
    }
}
