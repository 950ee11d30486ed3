//! Generic minimum-edit-distance sequence alignment.
//!
//! Generalizes Levenshtein alignment from characters to arbitrary items
//! under a caller-supplied equivalence. Used to pair keyword-call steps
//! between two keyword bodies and to pair argument lists between two
//! matched steps; also used for plain name similarity in the matcher.

/// One aligned position: indices into the left and right sequence.
/// Exactly one side is `None` for an insertion or deletion.
pub type Aligned = (Option<usize>, Option<usize>);

/// Minimum-cost alignment of two sequences.
///
/// Cost model: substitution 0 when `eq` holds, otherwise 1; insertion
/// and deletion 1. Ties prefer the diagonal so equal-cost alignments
/// deterministically preserve relative order. Output pairs are in
/// positional order of both sequences.
pub fn align<A, B, F>(left: &[A], right: &[B], eq: F) -> Vec<Aligned>
where
    F: Fn(&A, &B) -> bool,
{
    let rows = left.len() + 1;
    let cols = right.len() + 1;
    let mut cost = vec![0u32; rows * cols];

    for row in 0..rows {
        cost[row * cols] = row as u32;
    }
    for col in 0..cols {
        cost[col] = col as u32;
    }
    for row in 1..rows {
        for col in 1..cols {
            let substitution = cost[(row - 1) * cols + (col - 1)]
                + u32::from(!eq(&left[row - 1], &right[col - 1]));
            let deletion = cost[(row - 1) * cols + col] + 1;
            let insertion = cost[row * cols + (col - 1)] + 1;
            cost[row * cols + col] = substitution.min(deletion).min(insertion);
        }
    }

    // backtrack, diagonal first on ties
    let mut pairs = Vec::with_capacity(left.len().max(right.len()));
    let mut row = left.len();
    let mut col = right.len();
    while row > 0 || col > 0 {
        if row > 0 && col > 0 {
            let substitution = cost[(row - 1) * cols + (col - 1)]
                + u32::from(!eq(&left[row - 1], &right[col - 1]));
            if cost[row * cols + col] == substitution {
                pairs.push((Some(row - 1), Some(col - 1)));
                row -= 1;
                col -= 1;
                continue;
            }
        }
        if row > 0 && cost[row * cols + col] == cost[(row - 1) * cols + col] + 1 {
            pairs.push((Some(row - 1), None));
            row -= 1;
            continue;
        }
        pairs.push((None, Some(col - 1)));
        col -= 1;
    }
    pairs.reverse();
    pairs
}

/// Total cost of the minimum alignment.
pub fn distance<A, B, F>(left: &[A], right: &[B], eq: F) -> u32
where
    F: Fn(&A, &B) -> bool,
{
    align(left, right, &eq)
        .into_iter()
        .map(|pair| match pair {
            (Some(l), Some(r)) => u32::from(!eq(&left[l], &right[r])),
            _ => 1,
        })
        .sum()
}

/// Similarity of two strings in `[0, 1]`, 1.0 for equal strings,
/// computed over characters.
pub fn name_similarity(left: &str, right: &str) -> f64 {
    let left_chars: Vec<char> = left.chars().collect();
    let right_chars: Vec<char> = right.chars().collect();
    let longest = left_chars.len().max(right_chars.len());
    if longest == 0 {
        return 1.0;
    }
    let edits = distance(&left_chars, &right_chars, |a, b| a == b);
    1.0 - f64::from(edits) / longest as f64
}

/// Similarity of two token sequences in `[0, 1]`.
pub fn sequence_similarity(left: &[String], right: &[String]) -> f64 {
    let longest = left.len().max(right.len());
    if longest == 0 {
        return 1.0;
    }
    let edits = distance(left, right, |a, b| a == b);
    1.0 - f64::from(edits) / longest as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(value: &str) -> Vec<char> {
        value.chars().collect()
    }

    #[test]
    fn identical_sequences_align_with_zero_cost() {
        let items = ["a", "b", "c"];
        let pairs = align(&items, &items, |a, b| a == b);

        assert_eq!(
            pairs,
            vec![
                (Some(0), Some(0)),
                (Some(1), Some(1)),
                (Some(2), Some(2)),
            ]
        );
        assert_eq!(distance(&items, &items, |a, b| a == b), 0);
    }

    #[test]
    fn alignment_cost_matches_levenshtein_distance() {
        assert_eq!(distance(&chars("kitten"), &chars("sitting"), |a, b| a == b), 3);
        assert_eq!(distance(&chars("abc"), &chars(""), |a, b| a == b), 3);
        assert_eq!(distance(&chars(""), &chars("xy"), |a, b| a == b), 2);
    }

    #[test]
    fn insertion_keeps_surrounding_pairs_matched() {
        let left = ["a", "c"];
        let right = ["a", "b", "c"];
        let pairs = align(&left, &right, |a, b| a == b);

        assert_eq!(
            pairs,
            vec![
                (Some(0), Some(0)),
                (None, Some(1)),
                (Some(1), Some(2)),
            ]
        );
    }

    #[test]
    fn deletion_is_reported_on_the_left_side() {
        let left = ["a", "b", "c"];
        let right = ["a", "c"];
        let pairs = align(&left, &right, |a, b| a == b);

        assert!(pairs.contains(&(Some(1), None)));
        assert_eq!(pairs.len(), 3);
    }

    #[test]
    fn empty_inputs_produce_one_sided_pairs() {
        let left: [&str; 0] = [];
        let right = ["x"];
        assert_eq!(align(&left, &right, |a, b| a == b), vec![(None, Some(0))]);
        assert!(align(&left, &left, |a, b| a == b).is_empty());
    }

    #[test]
    fn alignment_is_deterministic_under_ambiguity() {
        // every pairing costs the same; the diagonal preference must pick
        // the order-preserving one every time
        let left = ["x", "x"];
        let right = ["x", "x", "x"];
        let first = align(&left, &right, |a, b| a == b);
        let second = align(&left, &right, |a, b| a == b);

        assert_eq!(first, second);
        assert_eq!(
            first,
            vec![(None, Some(0)), (Some(0), Some(1)), (Some(1), Some(2))]
        );
    }

    #[test]
    fn name_similarity_bounds() {
        assert_eq!(name_similarity("Login", "Login"), 1.0);
        assert_eq!(name_similarity("", ""), 1.0);
        assert!(name_similarity("Login", "Logout") >= 0.5);
        assert!(name_similarity("abc", "xyz") < 0.01);
    }
}
