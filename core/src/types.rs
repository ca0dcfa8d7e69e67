use ndarray::Array2;

/// Single coordinate axis used for board rows, columns, and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional board position `(row, col)`.
pub type Pos = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Pos {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn area(rows: Coord, cols: Coord) -> CellCount {
    let rows = rows as CellCount;
    let cols = cols as CellCount;
    rows.saturating_mul(cols)
}

pub trait NeighborhoodExt {
    fn neighbors(&self, center: Pos) -> Neighbors;
}

impl<T> NeighborhoodExt for Array2<T> {
    fn neighbors(&self, center: Pos) -> Neighbors {
        let dim = self.dim();
        let bounds = (dim.0.try_into().unwrap(), dim.1.try_into().unwrap());
        Neighbors {
            center,
            bounds,
            cursor: 0,
        }
    }
}

const NEIGHBOR_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Applies `offset` to `center`, returning a value only when it stays in bounds.
fn step(center: Pos, offset: (i8, i8), bounds: Pos) -> Option<Pos> {
    let row = center.0.checked_add_signed(offset.0)?;
    let col = center.1.checked_add_signed(offset.1)?;
    (row < bounds.0 && col < bounds.1).then_some((row, col))
}

/// In-bounds 8-neighborhood of a board position.
#[derive(Debug)]
pub struct Neighbors {
    center: Pos,
    bounds: Pos,
    cursor: u8,
}

impl Iterator for Neighbors {
    type Item = Pos;

    fn next(&mut self) -> Option<Self::Item> {
        while usize::from(self.cursor) < NEIGHBOR_OFFSETS.len() {
            let offset = NEIGHBOR_OFFSETS[usize::from(self.cursor)];
            self.cursor += 1;

            if let Some(pos) = step(self.center, offset, self.bounds) {
                return Some(pos);
            }
        }
        None
    }
}
