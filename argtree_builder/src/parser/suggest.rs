/// The optimal string alignment (restricted Damerau-Levenshtein) distance between `a` and `b`.
///
/// Insertion, deletion, substitution and transposition of two adjacent characters each cost one edit.
///
/// ### Example
/// ```
/// # use argtree_builder as argtree;
/// use argtree::damerau_levenshtein;
///
/// assert_eq!(damerau_levenshtein("remove", "remove"), 0);
/// assert_eq!(damerau_levenshtein("remove", "remvoe"), 1);
/// assert_eq!(damerau_levenshtein("kitten", "sitting"), 3);
/// ```
pub fn damerau_levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut dp = vec![vec![0usize; b.len() + 1]; a.len() + 1];

    for (i, row) in dp.iter_mut().enumerate() {
        row[0] = i;
    }

    for j in 0..=b.len() {
        dp[0][j] = j;
    }

    for i in 1..=a.len() {
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            dp[i][j] = (dp[i - 1][j] + 1)
                .min(dp[i][j - 1] + 1)
                .min(dp[i - 1][j - 1] + cost);

            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                dp[i][j] = dp[i][j].min(dp[i - 2][j - 2] + 1);
            }
        }
    }

    dp[a.len()][b.len()]
}

/// Rank the `candidates` within `max_distance` edits of `input`.
///
/// Exact matches are never suggested.
/// Returns at most `max_results` distinct candidates ordered by distance, ties keeping the candidate order.
///
/// ### Example
/// ```
/// # use argtree_builder as argtree;
/// use argtree::suggest;
///
/// let candidates = ["remove", "rename", "remote", "add"];
/// assert_eq!(suggest("remoe", &candidates, 3, 2), vec!["remove", "remote"]);
/// assert!(suggest("xyz", &candidates, 1, 3).is_empty());
/// ```
pub fn suggest<S: AsRef<str>>(
    input: &str,
    candidates: &[S],
    max_distance: usize,
    max_results: usize,
) -> Vec<String> {
    let mut ranked: Vec<(usize, &str)> = Vec::default();

    for candidate in candidates.iter().map(AsRef::as_ref) {
        if ranked.iter().any(|(_, c)| *c == candidate) {
            continue;
        }

        let distance = damerau_levenshtein(input, candidate);

        if distance > 0 && distance <= max_distance {
            ranked.push((distance, candidate));
        }
    }

    // Stable: equal distances keep the candidate order.
    ranked.sort_by_key(|(distance, _)| *distance);
    ranked
        .into_iter()
        .take(max_results)
        .map(|(_, candidate)| candidate.to_string())
        .collect()
}
