//! Scan orders: the linear mapping of grid coordinates to bitstream
//! payload position.

use crate::error::BitstreamError;

/// The traversal order a bitstream's payload was packed in.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ScanOrder {
    /// y outer, x inner.
    RowMajor = 0,
    /// x outer, y inner.
    ColMajor = 1,
    /// Row-major, but x runs in reverse on odd rows.
    Snake = 2,
}

impl ScanOrder {
    /// The wire code for this order.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Looks up a scan order by its wire code.
    pub fn from_code(code: u8) -> Result<Self, BitstreamError> {
        match code {
            0 => Ok(ScanOrder::RowMajor),
            1 => Ok(ScanOrder::ColMajor),
            2 => Ok(ScanOrder::Snake),
            other => Err(BitstreamError::UnknownOrder(other)),
        }
    }

    /// Enumerates every `(x, y)` coordinate of a `width x height` grid in
    /// this scan order.
    pub fn coords(self, width: u16, height: u16) -> Vec<(u16, u16)> {
        let mut out = Vec::with_capacity(width as usize * height as usize);
        match self {
            ScanOrder::RowMajor => {
                for y in 0..height {
                    for x in 0..width {
                        out.push((x, y));
                    }
                }
            }
            ScanOrder::Snake => {
                for y in 0..height {
                    if y % 2 == 0 {
                        for x in 0..width {
                            out.push((x, y));
                        }
                    } else {
                        for x in (0..width).rev() {
                            out.push((x, y));
                        }
                    }
                }
            }
            ScanOrder::ColMajor => {
                for x in 0..width {
                    for y in 0..height {
                        out.push((x, y));
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_major_order() {
        assert_eq!(
            ScanOrder::RowMajor.coords(2, 2),
            vec![(0, 0), (1, 0), (0, 1), (1, 1)]
        );
    }

    #[test]
    fn col_major_order() {
        assert_eq!(
            ScanOrder::ColMajor.coords(2, 2),
            vec![(0, 0), (0, 1), (1, 0), (1, 1)]
        );
    }

    #[test]
    fn snake_order_reverses_odd_rows() {
        assert_eq!(
            ScanOrder::Snake.coords(2, 2),
            vec![(0, 0), (1, 0), (1, 1), (0, 1)]
        );
    }

    #[test]
    fn code_round_trip() {
        for order in [ScanOrder::RowMajor, ScanOrder::ColMajor, ScanOrder::Snake] {
            assert_eq!(ScanOrder::from_code(order.code()).unwrap(), order);
        }
    }

    #[test]
    fn unknown_code_rejected() {
        assert_eq!(ScanOrder::from_code(9), Err(BitstreamError::UnknownOrder(9)));
    }
}
