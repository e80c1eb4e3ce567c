use std::path::Path;

use matrix::Matrix;

use crate::TrainerError;

/// Parse whitespace-separated numbers, one grid row per non-empty line.
pub fn parse_grid(content: &str) -> Result<Matrix, TrainerError> {
    let mut rows: Vec<Vec<f32>> = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let row = line
            .split_whitespace()
            .map(|tok| {
                tok.parse::<f32>().map_err(|_| TrainerError::Parse {
                    line: lineno + 1,
                    token: tok.to_string(),
                })
            })
            .collect::<Result<Vec<f32>, _>>()?;
        rows.push(row);
    }
    if rows.is_empty() {
        return Err(TrainerError::EmptyGrid);
    }
    Ok(Matrix::from_rows(&rows)?)
}

/// Read and parse a grid file.
pub fn read_grid(path: &Path) -> Result<Matrix, TrainerError> {
    let content = std::fs::read_to_string(path)?;
    parse_grid(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use matrix::MatrixError;

    #[test]
    fn parses_rows_and_skips_blank_lines() -> Result<(), TrainerError> {
        let grid = parse_grid("0 255 10\n\n  1 2 3  \n")?;
        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.col_count(), 3);
        assert_eq!(grid.get_row(0), vec![0.0, 255.0, 10.0]);
        assert_eq!(grid.get(1, 2), 3.0);
        Ok(())
    }

    #[test]
    fn reports_bad_token_with_line() {
        match parse_grid("1 2\n3 x\n") {
            Err(TrainerError::Parse { line, token }) => {
                assert_eq!(line, 2);
                assert_eq!(token, "x");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn ragged_rows_rejected() {
        assert!(matches!(
            parse_grid("1 2 3\n4 5\n"),
            Err(TrainerError::Matrix(MatrixError::RowWidth { expected: 3, actual: 2 }))
        ));
    }

    #[test]
    fn reads_grid_file() -> Result<(), TrainerError> {
        let path = std::env::temp_dir().join(format!("trainer-grid-{}.txt", std::process::id()));
        std::fs::write(&path, "0 128\n255 64\n")?;
        let loaded = read_grid(&path);
        std::fs::remove_file(&path)?;
        let grid = loaded?;
        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.get_row(1), vec![255.0, 64.0]);
        Ok(())
    }

    #[test]
    fn empty_input_rejected() {
        assert!(matches!(parse_grid(" \n\n"), Err(TrainerError::EmptyGrid)));
    }
}
