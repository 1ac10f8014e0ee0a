//! Bit tricks for the FAST segment test

/// Check if there are at least `min_count` consecutive set bits in the
/// circular 16-bit mask, using a branch-free rotate-and-AND approach.
#[inline]
pub fn has_consecutive_bits(mask: u16, min_count: u32) -> bool {
    if min_count == 0 || min_count > 16 {
        return false;
    }
    // For a run of length n we need: mask & rot(mask, 1) & ... & rot(mask, n-1)
    let mut test_mask = mask;
    for i in 1..min_count {
        test_mask &= mask.rotate_left(i);
        if test_mask == 0 {
            return false;
        }
    }
    test_mask != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pack a 16-element circle test into a bitmask (bit `i` = element `i`).
    fn circle_mask(pixels: &[bool; 16]) -> u16 {
        pixels
            .iter()
            .enumerate()
            .fold(0u16, |mask, (i, &set)| if set { mask | (1 << i) } else { mask })
    }

    fn has_consecutive_pixels(pixels: &[bool; 16], min_count: usize) -> bool {
        has_consecutive_bits(circle_mask(pixels), min_count as u32)
    }

    /// Straightforward run-length scan used as a reference
    fn longest_circular_run(pixels: &[bool; 16]) -> usize {
        let mut best = 0;
        let mut current = 0;
        for i in 0..32 {
            if pixels[i % 16] {
                current += 1;
                best = best.max(current.min(16));
            } else {
                current = 0;
            }
        }
        best
    }

    #[test]
    fn test_consecutive_pixels_simple() {
        let mut pixels = [false; 16];
        for p in pixels.iter_mut().take(9) {
            *p = true;
        }
        assert!(has_consecutive_pixels(&pixels, 9));
        assert!(!has_consecutive_pixels(&pixels, 10));
    }

    #[test]
    fn test_consecutive_pixels_wrap_around() {
        let mut pixels = [false; 16];
        for i in (12..16).chain(0..5) {
            pixels[i] = true;
        }
        assert!(has_consecutive_pixels(&pixels, 9));
    }

    #[test]
    fn test_non_consecutive_pixels() {
        let mut pixels = [false; 16];
        for i in (0..16).step_by(2) {
            pixels[i] = true;
        }
        assert!(!has_consecutive_pixels(&pixels, 2));
        assert!(has_consecutive_pixels(&pixels, 1));
    }

    #[test]
    fn test_degenerate_counts() {
        assert!(!has_consecutive_bits(u16::MAX, 0));
        assert!(!has_consecutive_bits(u16::MAX, 17));
        assert!(has_consecutive_bits(u16::MAX, 16));
    }

    #[test]
    fn test_bitmask_matches_run_scan() {
        for mask in (0..=u16::MAX).step_by(37) {
            let pixels: [bool; 16] = std::array::from_fn(|i| mask & (1 << i) != 0);
            assert_eq!(circle_mask(&pixels), mask);
            let run = longest_circular_run(&pixels);
            for n in 1..=16 {
                assert_eq!(has_consecutive_pixels(&pixels, n), run >= n, "mask={mask:#06x} n={n}");
            }
        }
    }
}
