//! Grid sizing rules.

/// Smallest board side length.
pub const MIN_GRID_SIZE: u32 = 5;

/// Largest supported player count. Keeps the board at most 101×101.
pub const MAX_TOTAL_USERS: u32 = 100;

/// Side length of the board for a session of `total_users` players.
///
/// Up to five players get a 5×5 board. Larger groups get the smallest odd
/// side strictly greater than the player count, so the board always has a
/// well-defined center and room for at least one goal per player. Counts
/// above [`MAX_TOTAL_USERS`] are sized as [`MAX_TOTAL_USERS`].
#[must_use]
pub fn grid_size_for(total_users: u32) -> u32 {
    let total_users = total_users.min(MAX_TOTAL_USERS);
    if total_users <= MIN_GRID_SIZE {
        MIN_GRID_SIZE
    } else if total_users % 2 == 0 {
        total_users + 1
    } else {
        total_users + 2
    }
}

/// Number of cells on a board of side `grid_size`.
#[must_use]
pub fn total_squares(grid_size: u32) -> usize {
    let side = grid_size as usize;
    side * side
}

/// Flattened index of the center (free space) cell.
#[must_use]
pub fn center_index(grid_size: u32) -> usize {
    total_squares(grid_size) / 2
}
