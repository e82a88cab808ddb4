//! Rasterized frame representation.

/// State of one character cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled,
}

/// A `height × width` grid of cells, row 0 at the top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayGrid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl DisplayGrid {
    /// Creates an all-empty grid.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::Empty; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the cell at `row`, `col`, or `None` outside the grid.
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        if row < self.height && col < self.width {
            Some(self.cells[row * self.width + col])
        } else {
            None
        }
    }

    fn set(&mut self, row: usize, col: usize, cell: Cell) {
        if row < self.height && col < self.width {
            self.cells[row * self.width + col] = cell;
        }
    }

    /// Iterates over rows from top to bottom.
    #[cfg(test)]
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width.max(1))
    }

    /// Number of filled cells in a column.
    #[cfg(test)]
    pub fn filled_in_column(&self, col: usize) -> usize {
        (0..self.height)
            .filter(|&row| self.get(row, col) == Some(Cell::Filled))
            .count()
    }
}

/// Draws one bar per column, growing up from the bottom row.
///
/// A column of height `h` fills rows `height - h .. height`. Heights are clamped
/// to `0..=height` first, and columns past the end of `heights` stay empty.
pub fn rasterize(heights: &[i64], height: usize, width: usize) -> DisplayGrid {
    let mut grid = DisplayGrid::new(width, height);
    let rows = i64::try_from(height).unwrap_or(i64::MAX);

    for (col, &raw) in heights.iter().take(width).enumerate() {
        let bar = raw.clamp(0, rows);
        for row in 0..height {
            // 1 for the bottom row, `height` for the top
            let depth = rows - row as i64;
            if bar >= depth {
                grid.set(row, col, Cell::Filled);
            }
        }
    }

    grid
}
