//! Lexical title similarity.

/// Levenshtein edit distance between two strings, counted in chars.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    // Two rolling rows instead of the full matrix.
    let mut previous: Vec<usize> = (0..=b_chars.len()).collect();
    let mut current = vec![0usize; b_chars.len() + 1];

    for (i, a_char) in a_chars.iter().enumerate() {
        current[0] = i + 1;
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b_chars.len()]
}

/// Normalized similarity in [0, 1]: `1 - distance / longest`.
///
/// Both sides are lowercased and reduced to alphanumeric words first, so
/// `"The.Matrix"` and `"the matrix"` compare equal. An empty `expected`
/// title means there is nothing to compare against and yields `1.0`.
pub fn similarity_ratio(candidate: &str, expected: &str) -> f64 {
    let expected = simplify(expected);
    if expected.is_empty() {
        return 1.0;
    }
    let candidate = simplify(candidate);

    let longest = candidate.chars().count().max(expected.chars().count());
    let distance = levenshtein_distance(&candidate, &expected);
    1.0 - distance as f64 / longest as f64
}

fn simplify(text: &str) -> String {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
