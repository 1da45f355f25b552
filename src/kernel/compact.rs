//! Order-preserving compaction of position lists.
//!
//! `compact` keeps the subsequence of input positions whose predicate holds,
//! in original order, and returns the new count. Two variants trade control
//! flow for stores: the branching form writes only when the predicate holds;
//! the branch-free form writes every position unconditionally and advances
//! the output cursor by zero or one, avoiding mispredictions under mixed
//! selectivity. Both require the output to have capacity for the full input.
//!
//! Every sparse predicate operator in the crate is this one routine with a
//! different bound predicate closure.

/// Store discipline for compaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompactionMode {
    /// Unconditional store, cursor advanced by `pred as usize`.
    BranchFree,
    /// Conditional store, cursor advanced inside the taken branch.
    Branching,
}

/// Compacts `input` into `output`, returning the surviving count.
///
/// # Panics
///
/// Panics if `output.len() < input.len()` (capacity is a caller invariant).
pub fn compact_into(
    input: &[u32],
    output: &mut [u32],
    mode: CompactionMode,
    pred: impl Fn(u32) -> bool,
) -> usize {
    match mode {
        CompactionMode::BranchFree => {
            let mut out = 0;
            for &p in input {
                output[out] = p;
                out += usize::from(pred(p));
            }
            out
        }
        CompactionMode::Branching => {
            let mut out = 0;
            for &p in input {
                if pred(p) {
                    output[out] = p;
                    out += 1;
                }
            }
            out
        }
    }
}

/// Compacts the first `count` entries of `positions` in place, returning the
/// surviving count. Valid because every write lands at an index no greater
/// than the one just read.
pub fn compact_in_place(
    positions: &mut [u32],
    count: usize,
    mode: CompactionMode,
    pred: impl Fn(u32) -> bool,
) -> usize {
    match mode {
        CompactionMode::BranchFree => {
            let mut out = 0;
            for input in 0..count {
                let p = positions[input];
                positions[out] = p;
                out += usize::from(pred(p));
            }
            out
        }
        CompactionMode::Branching => {
            let mut out = 0;
            for input in 0..count {
                let p = positions[input];
                if pred(p) {
                    positions[out] = p;
                    out += 1;
                }
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oracle(input: &[u32], pred: impl Fn(u32) -> bool) -> Vec<u32> {
        input.iter().copied().filter(|&p| pred(p)).collect()
    }

    #[test]
    fn test_compact_keeps_filtered_subsequence_in_order() {
        let input = [0u32, 2, 3, 5, 8, 9];
        let pred = |p: u32| p % 2 == 0;
        for mode in [CompactionMode::BranchFree, CompactionMode::Branching] {
            let mut output = [0u32; 6];
            let n = compact_into(&input, &mut output, mode, pred);
            assert_eq!(&output[..n], oracle(&input, pred).as_slice());
        }
    }

    #[test]
    fn test_branching_and_branch_free_agree() {
        let input: Vec<u32> = (0..257).collect();
        let pred = |p: u32| p % 7 != 3;
        let mut a = vec![0u32; input.len()];
        let mut b = vec![0u32; input.len()];
        let na = compact_into(&input, &mut a, CompactionMode::BranchFree, pred);
        let nb = compact_into(&input, &mut b, CompactionMode::Branching, pred);
        assert_eq!(na, nb);
        assert_eq!(&a[..na], &b[..nb]);
    }

    #[test]
    fn test_in_place_matches_buffered() {
        let input: Vec<u32> = vec![1, 4, 6, 7, 10, 11, 12];
        let pred = |p: u32| p > 5;
        for mode in [CompactionMode::BranchFree, CompactionMode::Branching] {
            let mut buffered = vec![0u32; input.len()];
            let nb = compact_into(&input, &mut buffered, mode, pred);

            let mut in_place = input.clone();
            let count = in_place.len();
            let ni = compact_in_place(&mut in_place, count, mode, pred);

            assert_eq!(ni, nb);
            assert_eq!(&in_place[..ni], &buffered[..nb]);
        }
    }

    #[test]
    fn test_empty_input_is_noop() {
        let mut output = [0u32; 4];
        let n = compact_into(&[], &mut output, CompactionMode::BranchFree, |_| true);
        assert_eq!(n, 0);

        let mut positions = [7u32, 8, 9, 10];
        let n = compact_in_place(&mut positions, 0, CompactionMode::Branching, |_| true);
        assert_eq!(n, 0);
        // Slots past the count are untouched.
        assert_eq!(positions, [7, 8, 9, 10]);
    }

    #[test]
    fn test_none_survive() {
        let input = [3u32, 4, 5];
        let mut output = [0u32; 3];
        let n = compact_into(&input, &mut output, CompactionMode::BranchFree, |_| false);
        assert_eq!(n, 0);
    }
}
