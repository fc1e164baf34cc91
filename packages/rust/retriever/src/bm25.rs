//! BM25-class lexical re-ranking, computed over an already vector-narrowed
//! candidate set rather than a full-corpus index (spec §4.G step 4).

use docsforge_shared::ScoredChunk;
use std::collections::{HashMap, HashSet};

const K1: f32 = 1.2;
const B: f32 = 0.75;

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Re-rank `candidates` against `query` using BM25 (k1=1.2, b=0.75) term
/// statistics computed over `candidates` alone, stable-sorting by
/// descending re-rank score with ties broken by the candidates' original
/// (vector) score. Returns at most `limit` results with `score` replaced
/// by the re-rank score.
pub fn rerank(candidates: Vec<ScoredChunk>, query: &str, limit: usize) -> Vec<ScoredChunk> {
    if candidates.is_empty() {
        return Vec::new();
    }

    let docs: Vec<Vec<String>> = candidates.iter().map(|c| tokenize(&c.content)).collect();
    let query_terms = tokenize(query);
    let n = docs.len() as f32;
    let avgdl = docs.iter().map(|d| d.len()).sum::<usize>() as f32 / n;

    let mut doc_freq: HashMap<&str, usize> = HashMap::new();
    for doc in &docs {
        let unique: HashSet<&str> = doc.iter().map(String::as_str).collect();
        for term in unique {
            *doc_freq.entry(term).or_insert(0) += 1;
        }
    }

    let mut indexed: Vec<(usize, f32)> = docs
        .iter()
        .enumerate()
        .map(|(i, doc)| {
            let dl = doc.len() as f32;
            let score = query_terms
                .iter()
                .map(|term| {
                    let tf = doc.iter().filter(|t| t.as_str() == term).count() as f32;
                    if tf == 0.0 {
                        return 0.0;
                    }
                    let df = *doc_freq.get(term.as_str()).unwrap_or(&0) as f32;
                    let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();
                    idf * (tf * (K1 + 1.0)) / (tf + K1 * (1.0 - B + B * dl / avgdl.max(1.0)))
                })
                .sum();
            (i, score)
        })
        .collect();

    indexed.sort_by(|(ia, a), (ib, b)| {
        b.partial_cmp(a)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                candidates[*ib]
                    .score
                    .partial_cmp(&candidates[*ia].score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    });

    indexed
        .into_iter()
        .take(limit)
        .map(|(i, score)| ScoredChunk { score, ..candidates[i].clone() })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(content: &str, vector_score: f32) -> ScoredChunk {
        ScoredChunk {
            url: "https://example.com".into(),
            content: content.into(),
            score: vector_score,
            title: "t".into(),
            library: "lib".into(),
            version: "1.0.0".into(),
            section_path: vec![],
            section_level: 0,
        }
    }

    #[test]
    fn exact_term_overlap_ranks_higher() {
        let candidates = vec![
            chunk("installing the command line interface tool", 0.5),
            chunk("an unrelated paragraph about something else entirely", 0.5),
        ];
        let out = rerank(candidates, "installing command line", 2);
        assert_eq!(out[0].content, "installing the command line interface tool");
    }

    #[test]
    fn ties_break_by_vector_score() {
        let candidates = vec![chunk("no overlap here", 0.3), chunk("no overlap here either", 0.9)];
        let out = rerank(candidates, "zzz nonexistent", 2);
        assert_eq!(out[0].score, 0.0);
        assert_eq!(out[0].content, "no overlap here either");
    }

    #[test]
    fn limit_truncates_results() {
        let candidates = vec![chunk("a", 0.1), chunk("b", 0.2), chunk("c", 0.3)];
        let out = rerank(candidates, "a", 1);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn empty_candidates_returns_empty() {
        assert!(rerank(Vec::new(), "query", 5).is_empty());
    }
}
