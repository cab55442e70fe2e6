/// FreeType's default LCD filter (`FT_LCD_FILTER_DEFAULT`).
///
/// The weights add up to 256, so fully covered runs sum to slightly above 255 and need to be
/// clamped.
pub const LCD_FILTER_WEIGHTS: [u8; 5] = [0x08, 0x4D, 0x56, 0x4D, 0x08];

const FILTER_RADIUS: usize = LCD_FILTER_WEIGHTS.len() / 2;

/// Filters each scanline of a subpixel coverage buffer horizontally.
///
/// Every output subpixel is the weighted sum of the 5 unfiltered subpixels centered on it. Taps
/// that fall outside of a scanline contribute nothing.
pub fn lcd_filter(subpixels: &[u8], stride: usize, height: usize) -> Vec<u8> {
    debug_assert!(subpixels.len() >= stride * height);

    let mut filtered = vec![0u8; stride * height];
    if stride == 0 {
        return filtered;
    }

    for (src, dest) in subpixels
        .chunks_exact(stride)
        .zip(filtered.chunks_exact_mut(stride))
    {
        filter_scanline(src, dest);
    }

    filtered
}

fn filter_scanline(src: &[u8], dest: &mut [u8]) {
    for (x, out) in dest.iter_mut().enumerate() {
        let sum: u32 = LCD_FILTER_WEIGHTS
            .iter()
            .enumerate()
            .filter_map(|(tap, weight)| {
                let src_x = (x + tap).checked_sub(FILTER_RADIUS)?;
                src.get(src_x).map(|c| *c as u32 * *weight as u32)
            })
            .sum();

        // Divide once at the end, rounding down.
        *out = (sum / 255).min(255) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_stays_zero() {
        let src = vec![0u8; 30 * 4];
        assert!(lcd_filter(&src, 30, 4).iter().all(|c| *c == 0));
    }

    #[test]
    fn full_coverage_is_conserved_in_the_interior() {
        let src = vec![255u8; 30 * 2];
        let filtered = lcd_filter(&src, 30, 2);
        for row in filtered.chunks(30) {
            assert!(row[2..28].iter().all(|c| *c == 255));
            // The edges lose the taps that fall outside.
            assert_eq!(row[0], ((86 + 77 + 8) * 255 / 255) as u8);
            assert_eq!(row[1], ((77 + 86 + 77 + 8) * 255 / 255) as u8);
        }
    }

    #[test]
    fn impulse_spreads_to_two_neighbors_on_each_side() {
        let mut src = vec![0u8; 9];
        src[4] = 255;
        assert_eq!(lcd_filter(&src, 9, 1), vec![0, 0, 8, 77, 86, 77, 8, 0, 0]);
    }

    #[test]
    fn scanlines_do_not_bleed_into_each_other() {
        let mut src = vec![0u8; 12];
        // Last subpixel of the first row.
        src[5] = 255;
        let filtered = lcd_filter(&src, 6, 2);
        assert_eq!(&filtered[..6], &[0, 0, 0, 8, 77, 86]);
        assert!(filtered[6..].iter().all(|c| *c == 0));
    }
}
