//! Partner rotation inside a group of four.

use super::models::{EntrantId, Fixture, IndexFixture};
use crate::errors::{StageError, StageResult};

/// Members per round-robin group
pub const GROUP_SIZE: usize = 4;

/// The three ways to split `[A, B, C, D]` into two pairs, in emission order
const ROTATIONS: [IndexFixture; 3] = [
    IndexFixture::new([0, 1], [2, 3]),
    IndexFixture::new([0, 2], [1, 3]),
    IndexFixture::new([0, 3], [1, 2]),
];

/// Emit the three partner rotations of a group as index fixtures
///
/// # Errors
///
/// * `StageError::InvalidGroupSize` - `members` is not exactly four long
pub fn generate(members: &[EntrantId]) -> StageResult<[IndexFixture; 3]> {
    check_size("round robin", members)?;
    Ok(ROTATIONS)
}

/// Emit the three fixtures for a named group.
///
/// Ordinals are fixed by the rotation order so regenerating the same group
/// yields the same ids.
pub fn generate_for_group(group_id: &str, members: &[EntrantId]) -> StageResult<Vec<Fixture>> {
    check_size(group_id, members)?;

    Ok(ROTATIONS
        .iter()
        .enumerate()
        .map(|(idx, rotation)| {
            let pick = |i: usize| members[i].clone();
            Fixture {
                id: format!("{}-{}", group_id, idx + 1),
                ordinal: idx + 1,
                round: None,
                group_id: Some(group_id.to_string()),
                side_a: [pick(rotation.side_a[0]), pick(rotation.side_a[1])],
                side_b: [pick(rotation.side_b[0]), pick(rotation.side_b[1])],
            }
        })
        .collect())
}

fn check_size(group: &str, members: &[EntrantId]) -> StageResult<()> {
    if members.len() != GROUP_SIZE {
        return Err(StageError::InvalidGroupSize {
            group: group.to_string(),
            expected: GROUP_SIZE,
            actual: members.len(),
        });
    }
    Ok(())
}
