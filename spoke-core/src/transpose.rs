//! Bit-level matrix transposition.
//!
//! A matrix is a list of rows, each row holding packed bits in LSB0 order. An
//! `R x C`-byte matrix transposes into a `8C x (R / 8)`-byte matrix such that bit
//! `j` of row `i` becomes bit `i` of row `j`.
//!
//! Two implementations are provided which agree bit-for-bit: [`transpose_reference`]
//! moves one bit at a time, while [`transpose`] and [`transpose_bits`] move 8x8 bit
//! blocks packed into a `u64`.

/// Errors that can occur when transposing a bit matrix.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[allow(missing_docs)]
pub enum TransposeError {
    #[error("number of rows must be a positive multiple of 8, got {0}")]
    InvalidRowCount(usize),
    #[error("row {row} has {actual} bytes, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("matrix of {len} bytes is not of rectangular shape with {rows} rows")]
    MalformedMatrix { len: usize, rows: usize },
}

/// Transposes a bit matrix one bit at a time.
pub fn transpose_reference(matrix: &[Vec<u8>]) -> Result<Vec<Vec<u8>>, TransposeError> {
    let row_width = check_rows(matrix)?;
    let rows = matrix.len();
    let cols = row_width * 8;

    let mut out = vec![vec![0u8; rows / 8]; cols];
    for (i, row) in matrix.iter().enumerate() {
        for (j, out_row) in out.iter_mut().enumerate() {
            let bit = (row[j / 8] >> (j % 8)) & 1;
            out_row[i / 8] |= bit << (i % 8);
        }
    }

    Ok(out)
}

/// Transposes a bit matrix using 8x8 block swaps.
pub fn transpose(matrix: &[Vec<u8>]) -> Result<Vec<Vec<u8>>, TransposeError> {
    let row_width = check_rows(matrix)?;
    let rows = matrix.len();

    let flat = matrix.concat();
    let out = transpose_unchecked(&flat, rows, row_width);

    Ok(out
        .chunks_exact(rows / 8)
        .map(|row| row.to_vec())
        .collect())
}

/// Transposes a flat, row-major bit matrix with `rows` rows.
///
/// Returns the transposed matrix, also flat and row-major, with `matrix.len() * 8 / rows`
/// rows of `rows / 8` bytes each.
pub fn transpose_bits(matrix: &[u8], rows: usize) -> Result<Vec<u8>, TransposeError> {
    if rows == 0 || rows % 8 != 0 {
        return Err(TransposeError::InvalidRowCount(rows));
    }

    if matrix.len() % rows != 0 {
        return Err(TransposeError::MalformedMatrix {
            len: matrix.len(),
            rows,
        });
    }

    Ok(transpose_unchecked(matrix, rows, matrix.len() / rows))
}

fn check_rows(matrix: &[Vec<u8>]) -> Result<usize, TransposeError> {
    let rows = matrix.len();
    if rows == 0 || rows % 8 != 0 {
        return Err(TransposeError::InvalidRowCount(rows));
    }

    let row_width = matrix[0].len();
    if let Some((row, r)) = matrix
        .iter()
        .enumerate()
        .find(|(_, r)| r.len() != row_width)
    {
        return Err(TransposeError::RaggedRows {
            row,
            expected: row_width,
            actual: r.len(),
        });
    }

    Ok(row_width)
}

fn transpose_unchecked(matrix: &[u8], rows: usize, row_width: usize) -> Vec<u8> {
    let out_width = rows / 8;
    let mut out = vec![0u8; matrix.len()];

    for rb in 0..out_width {
        let block_rows = &matrix[rb * 8 * row_width..(rb + 1) * 8 * row_width];
        for cb in 0..row_width {
            let mut x = 0u64;
            for k in 0..8 {
                x |= (block_rows[k * row_width + cb] as u64) << (8 * k);
            }

            let y = transpose_8x8(x);

            for b in 0..8 {
                out[(cb * 8 + b) * out_width + rb] = (y >> (8 * b)) as u8;
            }
        }
    }

    out
}

/// Transposes an 8x8 bit matrix where bit `8r + c` holds entry `(r, c)`.
#[inline(always)]
fn transpose_8x8(mut x: u64) -> u64 {
    let t = (x ^ (x >> 7)) & 0x00AA_00AA_00AA_00AA;
    x ^= t ^ (t << 7);
    let t = (x ^ (x >> 14)) & 0x0000_CCCC_0000_CCCC;
    x ^= t ^ (t << 14);
    let t = (x ^ (x >> 28)) & 0x0000_0000_F0F0_F0F0;
    x ^ t ^ (t << 28)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha12Rng;
    use rstest::*;

    fn random_matrix(rows: usize, row_width: usize, seed: u64) -> Vec<Vec<u8>> {
        let mut rng = ChaCha12Rng::seed_from_u64(seed);
        (0..rows)
            .map(|_| (0..row_width).map(|_| rng.gen()).collect())
            .collect()
    }

    fn bit(row: &[u8], j: usize) -> u8 {
        (row[j / 8] >> (j % 8)) & 1
    }

    #[test]
    fn test_transpose_known_matrix() {
        let matrix = [
            // ------- bits in lsb0
            3u8,   // 1 1 0 0 0 0 0 0
            76u8,  // 0 0 1 1 0 0 1 0
            120u8, // 0 0 0 1 1 1 1 0
            9u8,   // 1 0 0 1 0 0 0 0
            17u8,  // 1 0 0 0 1 0 0 0
            102u8, // 0 1 1 0 0 1 1 0
            53u8,  // 1 0 1 0 1 1 0 0
            125u8, // 1 0 1 1 1 1 1 0
        ]
        .map(|b| vec![b]);

        let expected = [
            // ------- bits in lsb0
            217u8, // 1 0 0 1 1 0 1 1
            33u8,  // 1 0 0 0 0 1 0 0
            226u8, // 0 1 0 0 0 1 1 1
            142u8, // 0 1 1 1 0 0 0 1
            212u8, // 0 0 1 0 1 0 1 1
            228u8, // 0 0 1 0 0 1 1 1
            166u8, // 0 1 1 0 0 1 0 1
            0u8,   // 0 0 0 0 0 0 0 0
        ]
        .map(|b| vec![b])
        .to_vec();

        assert_eq!(transpose_reference(&matrix).unwrap(), expected);
        assert_eq!(transpose(&matrix).unwrap(), expected);
    }

    #[test]
    fn test_transpose_moves_bits() {
        let matrix = random_matrix(16, 5, 0);
        let transposed = transpose(&matrix).unwrap();

        assert_eq!(transposed.len(), 40);
        assert!(transposed.iter().all(|row| row.len() == 2));
        for (i, row) in matrix.iter().enumerate() {
            for (j, t_row) in transposed.iter().enumerate() {
                assert_eq!(bit(row, j), bit(t_row, i));
            }
        }
    }

    #[rstest]
    #[case::small(8, 1)]
    #[case::square(128, 16)]
    #[case::wide(192, (32 * 1024 + 64) / 8)]
    fn test_fast_matches_reference(#[case] rows: usize, #[case] row_width: usize) {
        let matrix = random_matrix(rows, row_width, rows as u64);

        assert_eq!(
            transpose(&matrix).unwrap(),
            transpose_reference(&matrix).unwrap()
        );
    }

    #[rstest]
    #[case(64, 32)]
    #[case(192, 24)]
    fn test_transpose_involution(#[case] rows: usize, #[case] row_width: usize) {
        let matrix = random_matrix(rows, row_width, 7);

        let twice = transpose(&transpose(&matrix).unwrap()).unwrap();

        assert_eq!(twice, matrix);
    }

    #[test]
    fn test_transpose_bits_matches_rows() {
        let matrix = random_matrix(128, 48, 3);
        let flat = transpose_bits(&matrix.concat(), 128).unwrap();

        assert_eq!(flat, transpose(&matrix).unwrap().concat());
    }

    #[test]
    fn test_invalid_shapes() {
        let matrix = random_matrix(12, 2, 0);
        assert_eq!(
            transpose(&matrix).unwrap_err(),
            TransposeError::InvalidRowCount(12)
        );
        assert_eq!(
            transpose_reference(&[]).unwrap_err(),
            TransposeError::InvalidRowCount(0)
        );

        let mut ragged = random_matrix(8, 2, 0);
        ragged[5].push(0);
        assert_eq!(
            transpose(&ragged).unwrap_err(),
            TransposeError::RaggedRows {
                row: 5,
                expected: 2,
                actual: 3
            }
        );

        assert_eq!(
            transpose_bits(&[0u8; 20], 8).unwrap_err(),
            TransposeError::MalformedMatrix { len: 20, rows: 8 }
        );
    }
}
