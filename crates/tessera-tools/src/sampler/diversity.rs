//! Lexical diversity selection over text chunks

use std::collections::BTreeSet;

/// Lowercased alphanumeric terms of `text`
pub(crate) fn terms(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Jaccard distance between two term sets, 0.0 for identical sets
pub(crate) fn distance(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let shared = a.intersection(b).count();
    1.0 - shared as f64 / union as f64
}

/// Split `text` into chunks of at most `words_per_chunk` whitespace words
pub(crate) fn chunk_words(text: &str, words_per_chunk: usize) -> Vec<String> {
    let size = words_per_chunk.max(1);
    let words: Vec<&str> = text.split_whitespace().collect();
    words.chunks(size).map(|chunk| chunk.join(" ")).collect()
}

/// Pick up to `count` chunk indices not already in `taken`
///
/// Greedy max-min selection: each pick is the candidate farthest from its
/// nearest already-taken chunk. With nothing taken yet the chunk with the
/// most distinct terms goes first. Ties resolve to the lowest index so the
/// same inputs always give the same picks.
pub(crate) fn select(chunks: &[String], taken: &[usize], count: usize) -> Vec<usize> {
    let sets: Vec<BTreeSet<String>> = chunks.iter().map(|chunk| terms(chunk)).collect();
    let mut chosen: Vec<usize> = taken.iter().copied().filter(|&i| i < chunks.len()).collect();
    let mut picks = Vec::with_capacity(count);

    while picks.len() < count {
        let mut best: Option<(usize, f64)> = None;
        for candidate in 0..chunks.len() {
            if chosen.contains(&candidate) {
                continue;
            }
            let score = if chosen.is_empty() {
                sets[candidate].len() as f64
            } else {
                chosen
                    .iter()
                    .map(|&other| distance(&sets[candidate], &sets[other]))
                    .fold(f64::INFINITY, f64::min)
            };
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((candidate, score));
            }
        }
        let Some((index, _)) = best else { break };
        chosen.push(index);
        picks.push(index);
    }
    picks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terms_ignore_case_and_punctuation() {
        let set = terms("The cat, the CAT! sat.");
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec!["cat", "sat", "the"]);
    }

    #[test]
    fn test_distance_bounds() {
        let a = terms("red green blue");
        let b = terms("blue green red");
        let c = terms("cyan magenta");
        assert_eq!(distance(&a, &b), 0.0);
        assert_eq!(distance(&a, &c), 1.0);
        assert_eq!(distance(&terms(""), &terms("")), 0.0);
    }

    #[test]
    fn test_chunk_words() {
        let chunks = chunk_words("one two three\nfour  five", 2);
        assert_eq!(chunks, vec!["one two", "three four", "five"]);
        assert!(chunk_words("   ", 3).is_empty());
    }

    #[test]
    fn test_select_prefers_dissimilar_chunks() {
        let chunks: Vec<String> = [
            "apples and pears in the orchard",
            "apples and pears in the garden",
            "rockets launch from the coastal pad",
            "apples and pears",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        assert_eq!(select(&chunks, &[], 3), vec![0, 2, 3]);
        assert_eq!(select(&chunks, &[2], 1), vec![3]);
    }

    #[test]
    fn test_select_skips_taken_and_stops_when_exhausted() {
        let chunks = vec!["a b".to_string(), "c d".to_string(), "e f".to_string()];
        assert_eq!(select(&chunks, &[0, 1], 5), vec![2]);
        assert!(select(&chunks, &[0, 1, 2], 1).is_empty());
    }
}
