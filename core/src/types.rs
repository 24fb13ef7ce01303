/// Grid position as `(row, col)`, 0-indexed from the top-left corner.
pub type Pos = (usize, usize);

const DISPLACEMENTS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Applies `delta` to `pos`, returning a value only when it stays inside a
/// `rows x cols` grid.
fn apply_delta((row, col): Pos, (d_row, d_col): (isize, isize), (rows, cols): Pos) -> Option<Pos> {
    let row = row.checked_add_signed(d_row)?;
    let col = col.checked_add_signed(d_col)?;
    (row < rows && col < cols).then_some((row, col))
}

/// Iterates the Moore neighborhood of `pos` within a `size` grid. Corner and
/// edge cells yield fewer than eight positions; out-of-bounds coordinates are
/// never produced.
pub fn neighbors(pos: Pos, size: Pos) -> impl Iterator<Item = Pos> {
    DISPLACEMENTS
        .into_iter()
        .filter_map(move |delta| apply_delta(pos, delta, size))
}

pub(crate) fn in_bounds((row, col): Pos, (rows, cols): Pos) -> bool {
    row < rows && col < cols
}
