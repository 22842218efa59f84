//! Plain-text matrix of doubles: one whitespace-separated row per line.
//!
//! This is the trajectory interchange format read by plotting tools.

use std::io::{BufRead, Write};

use itertools::Itertools;

use crate::common::{KoulesError, KoulesResult};

/// Write `rows` to `out`, one row per line
pub fn write_matrix<W, I, R>(out: &mut W, rows: I) -> KoulesResult<()>
where
    W: Write,
    I: IntoIterator<Item = R>,
    R: AsRef<[f64]>,
{
    for row in rows {
        writeln!(out, "{}", row.as_ref().iter().join(" "))?;
    }
    Ok(())
}

/// Parse a matrix; blank lines are skipped
pub fn read_matrix<B: BufRead>(input: B) -> KoulesResult<Vec<Vec<f64>>> {
    let mut rows = Vec::new();
    for (line_no, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let row = line
            .split_whitespace()
            .map(|tok| {
                tok.parse::<f64>().map_err(|e| {
                    KoulesError::InvalidParameter(format!(
                        "line {}: cannot parse {:?}: {}",
                        line_no + 1,
                        tok,
                        e
                    ))
                })
            })
            .collect::<KoulesResult<Vec<f64>>>()?;
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_matrix_layout() {
        let mut buf = Vec::new();
        write_matrix(&mut buf, vec![vec![1.0, 0.5, -2.0], vec![0.1, 3.0, 0.0]]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "1 0.5 -2\n0.1 3 0\n");
    }

    #[test]
    fn test_read_back_is_exact() {
        let rows = vec![vec![0.1 + 0.2, std::f64::consts::PI, -1e-300]];
        let mut buf = Vec::new();
        write_matrix(&mut buf, &rows).unwrap();
        let parsed = read_matrix(&buf[..]).unwrap();
        assert_eq!(parsed, rows);
    }

    #[test]
    fn test_read_matrix_rejects_garbage() {
        let err = read_matrix("1 2\n\n3 x\n".as_bytes()).unwrap_err();
        assert!(format!("{}", err).contains("line 3"));
    }
}
