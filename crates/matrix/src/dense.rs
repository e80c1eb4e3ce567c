use std::fmt;
use std::ops::{Index, IndexMut};

use crate::MatrixError;

/// Dense `rows x cols` grid of `f32`, stored row-major.
///
/// The shape is fixed at construction. Every accessor that takes a
/// `(row, col)` pair treats an out-of-range index as a caller bug and panics.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl Matrix {
    /// Create a zero-filled matrix.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols, data: vec![0.0; rows * cols] }
    }

    /// Wrap an existing row-major buffer. Fails if `data.len() != rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self, MatrixError> {
        if data.len() != rows * cols {
            return Err(MatrixError::BufferLength { rows, cols, actual: data.len() });
        }
        Ok(Self { rows, cols, data })
    }

    /// Build a matrix from equally sized rows.
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self, MatrixError> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            if row.len() != cols {
                return Err(MatrixError::RowWidth { expected: cols, actual: row.len() });
            }
            data.extend_from_slice(row);
        }
        Ok(Self { rows: rows.len(), cols, data })
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn col_count(&self) -> usize {
        self.cols
    }

    #[inline]
    fn offset(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.rows && col < self.cols,
            "matrix index ({row}, {col}) out of range for {}x{}",
            self.rows,
            self.cols
        );
        row * self.cols + col
    }

    /// Read one value.
    ///
    /// # Panics
    /// If `row >= row_count()` or `col >= col_count()`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[self.offset(row, col)]
    }

    /// Checked read; `None` when the index is out of range.
    pub fn try_get(&self, row: usize, col: usize) -> Option<f32> {
        if row < self.rows && col < self.cols {
            self.data.get(row * self.cols + col).copied()
        } else {
            None
        }
    }

    /// Overwrite one value.
    ///
    /// # Panics
    /// If `row >= row_count()` or `col >= col_count()`.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        let idx = self.offset(row, col);
        self.data[idx] = value;
    }

    /// Borrow one row.
    ///
    /// # Panics
    /// If `index >= row_count()`.
    pub fn row(&self, index: usize) -> &[f32] {
        assert!(index < self.rows, "row {index} out of range for {} rows", self.rows);
        let start = index * self.cols;
        &self.data[start..start + self.cols]
    }

    /// Mutable borrow of one row.
    ///
    /// # Panics
    /// If `index >= row_count()`.
    pub fn row_mut(&mut self, index: usize) -> &mut [f32] {
        assert!(index < self.rows, "row {index} out of range for {} rows", self.rows);
        let start = index * self.cols;
        &mut self.data[start..start + self.cols]
    }

    /// Copy of one row.
    pub fn get_row(&self, index: usize) -> Vec<f32> {
        self.row(index).to_vec()
    }

    /// Overwrite a whole row; the slice must have `col_count()` values.
    pub fn set_row(&mut self, index: usize, values: &[f32]) -> Result<(), MatrixError> {
        if values.len() != self.cols {
            return Err(MatrixError::RowWidth { expected: self.cols, actual: values.len() });
        }
        self.row_mut(index).copy_from_slice(values);
        Ok(())
    }

    /// Row-major flattening.
    pub fn to_vec(&self) -> Vec<f32> {
        self.data.clone()
    }

    /// Row-major view of the backing buffer.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Fill every cell from a generator called in row-major order.
    pub fn fill_with<F: FnMut() -> f32>(&mut self, mut f: F) {
        for v in self.data.iter_mut() {
            *v = f();
        }
    }

    /// Multiply every cell by `factor`.
    pub fn scale(&mut self, factor: f32) {
        for v in self.data.iter_mut() {
            *v *= factor;
        }
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f32;

    fn index(&self, (row, col): (usize, usize)) -> &f32 {
        &self.data[self.offset(row, col)]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f32 {
        let idx = self.offset(row, col);
        &mut self.data[idx]
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "rows = {}, cols = {}", self.rows, self.cols)?;
        for r in 0..self.rows {
            write!(f, "[{r}]")?;
            for (c, v) in self.row(r).iter().enumerate() {
                write!(f, " {c}:{v}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;

    #[test]
    fn new_is_zeroed() {
        let m = Matrix::new(3, 2);
        assert_eq!(m.row_count(), 3);
        assert_eq!(m.col_count(), 2);
        assert!(m.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn set_then_get_is_row_major() {
        let mut m = Matrix::new(2, 3);
        m.set(1, 2, 5.0);
        m[(0, 1)] = 2.0;
        assert_eq!(m.get(1, 2), 5.0);
        assert_eq!(m.to_vec(), vec![0.0, 2.0, 0.0, 0.0, 0.0, 5.0]);
        assert_eq!(m.get_row(1), vec![0.0, 0.0, 5.0]);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn get_out_of_range_panics() {
        let m = Matrix::new(2, 2);
        let _ = m.get(2, 0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn column_overflow_does_not_wrap_into_next_row() {
        let mut m = Matrix::new(2, 2);
        m.set(0, 2, 1.0);
    }

    #[test]
    fn try_get_is_checked() {
        let m = Matrix::new(1, 1);
        assert_eq!(m.try_get(0, 0), Some(0.0));
        assert_eq!(m.try_get(0, 1), None);
        assert_eq!(m.try_get(1, 0), None);
    }

    #[test]
    fn from_vec_rejects_wrong_length() {
        assert_eq!(
            Matrix::from_vec(2, 2, vec![1.0; 3]),
            Err(MatrixError::BufferLength { rows: 2, cols: 2, actual: 3 })
        );
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        assert_eq!(
            Matrix::from_rows(&rows),
            Err(MatrixError::RowWidth { expected: 2, actual: 1 })
        );
    }

    #[test]
    fn set_row_overwrites_one_row_and_checks_width() {
        let mut m = Matrix::new(2, 3);
        assert_eq!(m.set_row(1, &[1.0, 2.0, 3.0]), Ok(()));
        assert_eq!(m.to_vec(), vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0]);
        assert_eq!(
            m.set_row(0, &[9.0, 9.0]),
            Err(MatrixError::RowWidth { expected: 3, actual: 2 })
        );
        assert_eq!(m.get_row(0), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn display_lists_each_row() {
        let m = Matrix::from_vec(2, 1, vec![1.5, -2.0]).unwrap();
        let text = m.to_string();
        assert!(text.starts_with("rows = 2, cols = 1"));
        assert!(text.contains("[0] 0:1.5"));
        assert!(text.contains("[1] 0:-2"));
    }

    quickcheck! {
        fn set_get_roundtrip_in_range(rows: u8, cols: u8, r: u8, c: u8, v: i16) -> bool {
            let rows = rows as usize % 16 + 1;
            let cols = cols as usize % 16 + 1;
            let (r, c) = (r as usize % rows, c as usize % cols);
            let mut m = Matrix::new(rows, cols);
            m.set(r, c, v as f32);
            m.get(r, c) == v as f32 && m.as_slice().iter().filter(|x| **x != 0.0).count() <= 1
        }

        fn flatten_concatenates_rows(rows: u8, cols: u8) -> bool {
            let rows = rows as usize % 8 + 1;
            let cols = cols as usize % 8 + 1;
            let data: Vec<f32> = (0..rows * cols).map(|i| i as f32).collect();
            let m = Matrix::from_vec(rows, cols, data.clone()).unwrap();
            let joined: Vec<f32> = (0..rows).flat_map(|r| m.get_row(r)).collect();
            joined == data && m.to_vec() == data
        }
    }
}
