use wide::f64x4;

const LANES: usize = 4;

/// Elementwise `dest += src` over equally sized slices.
///
/// Plain IEEE-754 addition: NaN and infinities propagate unchanged.
/// Callers validate lengths before entering the hot path.
#[inline]
pub fn add_assign(dest: &mut [f64], src: &[f64]) {
    debug_assert_eq!(dest.len(), src.len(), "kernel operands must have equal length");

    let split = dest.len() - dest.len() % LANES;
    let (head, tail) = dest.split_at_mut(split);
    let (src_head, src_tail) = src.split_at(split.min(src.len()));

    for (d, s) in head.chunks_exact_mut(LANES).zip(src_head.chunks_exact(LANES)) {
        let sum = f64x4::from([d[0], d[1], d[2], d[3]]) + f64x4::from([s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&sum.to_array());
    }
    for (d, s) in tail.iter_mut().zip(src_tail) {
        *d += *s;
    }
}
