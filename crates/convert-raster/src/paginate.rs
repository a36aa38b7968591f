//! Splitting tall content into page-height bands.

/// One page-sized slice of rendered content, in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    pub index: usize,
    pub top: u32,
    pub height: u32,
}

/// Splits content of a given height into bands of at most `page_height`.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    page_height: u32,
}

impl Paginator {
    pub fn new(page_height: u32) -> Self {
        Self {
            page_height: page_height.max(1),
        }
    }

    pub fn page_height(&self) -> u32 {
        self.page_height
    }

    /// `ceil(total / page_height)`, and never fewer than one page.
    pub fn page_count(&self, total: u32) -> usize {
        if total <= self.page_height {
            1
        } else {
            total.div_ceil(self.page_height) as usize
        }
    }

    /// Bands in top-to-bottom order. The last band is shorter when the
    /// content does not fill a whole page; there is never an empty band.
    pub fn bands(&self, total: u32) -> Vec<Band> {
        let total = total.max(1);
        (0..self.page_count(total))
            .map(|index| {
                let top = index as u32 * self.page_height;
                Band {
                    index,
                    top,
                    height: self.page_height.min(total - top),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_content_is_one_page() {
        let p = Paginator::new(1000);
        assert_eq!(p.page_count(1), 1);
        assert_eq!(p.page_count(1000), 1);
        assert_eq!(p.bands(400), vec![Band { index: 0, top: 0, height: 400 }]);
    }

    #[test]
    fn test_exact_multiple_has_no_trailing_page() {
        let p = Paginator::new(761);
        for k in 1..=12u32 {
            let bands = p.bands(k * 761);
            assert_eq!(bands.len(), k as usize);
            assert!(bands.iter().all(|b| b.height == 761));
        }
    }

    #[test]
    fn test_remainder_gets_short_last_band() {
        let p = Paginator::new(100);
        let bands = p.bands(250);
        assert_eq!(bands.len(), 3);
        assert_eq!(bands[2], Band { index: 2, top: 200, height: 50 });
        let covered: u32 = bands.iter().map(|b| b.height).sum();
        assert_eq!(covered, 250);
    }

    #[test]
    fn test_zero_height_still_one_band() {
        let bands = Paginator::new(0).bands(0);
        assert_eq!(bands.len(), 1);
        assert!(bands[0].height > 0);
    }
}
