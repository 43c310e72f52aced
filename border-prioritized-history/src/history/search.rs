//! Range search and shift primitives over a non-increasing weight array.

/// Returns the leftmost position `p` with `weights[p] < w`, or
/// `weights.len()` if there is none.
///
/// `weights` must be sorted in non-increasing order.
#[inline]
pub(crate) fn first_less(weights: &[f32], w: f32) -> usize {
    weights.partition_point(|&x| x >= w)
}

/// Returns the rightmost position `q` with `weights[q] > w`.
///
/// `weights` must be sorted in non-increasing order.
#[inline]
pub(crate) fn last_greater(weights: &[f32], w: f32) -> Option<usize> {
    match weights.partition_point(|&x| x > w) {
        0 => None,
        k => Some(k - 1),
    }
}

/// Moves the element at `from` to `to`, shifting the elements in between
/// by one toward `from`.
#[inline]
pub(crate) fn move_within<T>(xs: &mut [T], from: usize, to: usize) {
    if to < from {
        xs[to..=from].rotate_right(1);
    } else if from < to {
        xs[from..=to].rotate_left(1);
    }
}
