use crate::spreadsheet::cell::Cell;

/// Fixed extent of a sheet whose shape is known up front, as with delimited text.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct Extent {
    pub(crate) rows: usize,
    pub(crate) cols: usize,
}

/// Sparse cells read from one sheet of a source file.
pub(crate) struct Sheet {
    /// Sheet name
    pub(crate) name: String,
    /// Non-empty cells
    pub(crate) cells: Vec<Cell>,
    /// Known shape; when absent the shape comes from the cells themselves
    pub(crate) extent: Option<Extent>,
    /// Actual data range (determined from cell data)
    pub(crate) row_lower_bound: Option<usize>,
    pub(crate) row_upper_bound: Option<usize>,
    pub(crate) col_lower_bound: Option<usize>,
    pub(crate) col_upper_bound: Option<usize>,
}

impl Sheet {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            cells: Vec::new(),
            extent: None,
            row_lower_bound: None,
            row_upper_bound: None,
            col_lower_bound: None,
            col_upper_bound: None,
        }
    }

    /// Returns true if the sheet has neither cells nor a known extent.
    pub(crate) fn is_empty(&self) -> bool {
        self.cells.is_empty() && self.extent.map(|extent| extent.rows == 0).unwrap_or(true)
    }

    /// Adds a cell to the sheet, updating data ranges.
    pub(crate) fn push(&mut self, cell: Cell) {
        self.update_bound(cell.row, cell.col);
        self.cells.push(cell);
    }

    /// Updates the actual data range boundaries based on cell positions.
    fn update_bound(&mut self, row: usize, col: usize) {
        if self.row_lower_bound.map(|row_lower_bound| row < row_lower_bound).unwrap_or(true) {
            self.row_lower_bound = Some(row);
        }
        if self.row_upper_bound.map(|row_upper_bound| row_upper_bound < row).unwrap_or(true) {
            self.row_upper_bound = Some(row);
        }
        if self.col_lower_bound.map(|col_lower_bound| col < col_lower_bound).unwrap_or(true) {
            self.col_lower_bound = Some(col);
        }
        if self.col_upper_bound.map(|col_upper_bound| col_upper_bound < col).unwrap_or(true) {
            self.col_upper_bound = Some(col);
        }
    }

    /// Returns the sheet as a dense 2D grid of optional cell references.
    /// The first grid row is the first row holding data, or row 0 with a known extent.
    pub(crate) fn grid(&self) -> Vec<Vec<Option<&Cell>>> {
        let bounds = match self.extent {
            Some(extent) if extent.rows > 0 && extent.cols > 0 => Some((0, extent.rows - 1, 0, extent.cols - 1)),
            Some(extent) => return vec![Vec::new(); extent.rows],
            None => self.row_lower_bound
                .zip(self.row_upper_bound)
                .zip(self.col_lower_bound.zip(self.col_upper_bound))
                .map(|((row_lower, row_upper), (col_lower, col_upper))| (row_lower, row_upper, col_lower, col_upper)),
        };
        let Some((row_lower, row_upper, col_lower, col_upper)) = bounds else {
            return Vec::new();
        };

        let mut table = vec![vec![None; col_upper - col_lower + 1]; row_upper - row_lower + 1];
        for cell in &self.cells {
            if (row_lower..=row_upper).contains(&cell.row) && (col_lower..=col_upper).contains(&cell.col) {
                table[cell.row - row_lower][cell.col - col_lower] = Some(cell);
            }
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::cell::CellType;

    fn push(sheet: &mut Sheet, row: usize, col: usize) {
        sheet.push(Cell {
            row,
            col,
            kind: CellType::String,
            value: format!("{row}:{col}"),
        });
    }

    #[test]
    fn sheet_initial() {
        let sheet = Sheet::new("");
        assert!(sheet.is_empty());
        assert_eq!(sheet.row_lower_bound, None);
        assert_eq!(sheet.col_upper_bound, None);
        assert!(sheet.grid().is_empty());
    }

    #[test]
    fn grid_spans_data_bounds() {
        let mut sheet = Sheet::new("");
        push(&mut sheet, 1, 1);
        push(&mut sheet, 1, 3);
        push(&mut sheet, 3, 2);

        assert_eq!(sheet.row_lower_bound, Some(1));
        assert_eq!(sheet.row_upper_bound, Some(3));
        assert_eq!(sheet.col_lower_bound, Some(1));
        assert_eq!(sheet.col_upper_bound, Some(3));

        let grid = sheet.grid();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[0].len(), 3);
        assert_eq!(grid[0][0].map(|cell| cell.value.as_str()), Some("1:1"));
        assert!(grid[1].iter().all(Option::is_none));
        assert_eq!(grid[2][1].map(|cell| cell.value.as_str()), Some("3:2"));
    }

    #[test]
    fn extent_keeps_empty_edges() {
        let mut sheet = Sheet::new("");
        sheet.extent = Some(Extent { rows: 3, cols: 2 });
        push(&mut sheet, 0, 0);

        let grid = sheet.grid();
        assert_eq!(grid.len(), 3);
        assert!(grid.iter().all(|row| row.len() == 2));
        assert!(grid[2].iter().all(Option::is_none));
    }
}
