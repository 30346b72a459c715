//! Keyword-overlap relevance scoring.
//!
//! A title's score is the number of distinct query words that appear as
//! whole tokens in the normalized title. Substring hits do not count:
//! the query word `da` does not match the title token `dang`.

use crate::models::{Article, Candidate};
use crate::utils::tokenize;
use itertools::Itertools;
use std::cmp::Reverse;
use std::collections::HashSet;

/// Count the distinct `query_words` found as exact tokens in `title`.
///
/// `query_words` are expected to be normalized already (see
/// [`crate::utils::query_words`]); `title` is normalized here. Returns 0 for
/// an empty title or an empty word list, and never more than the number of
/// distinct query words.
pub fn score(title: &str, query_words: &[String]) -> u32 {
    if query_words.is_empty() {
        return 0;
    }
    let tokens: HashSet<String> = tokenize(title).into_iter().collect();
    if tokens.is_empty() {
        return 0;
    }
    query_words
        .iter()
        .unique()
        .filter(|word| tokens.contains(word.as_str()))
        .count() as u32
}

/// Score one source's candidates, drop non-matches, and keep the best `cap`.
///
/// The sort is stable, so candidates with equal scores keep their
/// extraction order.
pub fn rank_candidates(
    source_name: &str,
    candidates: Vec<Candidate>,
    query_words: &[String],
    cap: usize,
) -> Vec<Article> {
    let mut articles: Vec<Article> = candidates
        .into_iter()
        .filter_map(|c| {
            let relevance_score = score(&c.title, query_words);
            (relevance_score > 0).then(|| Article {
                name: source_name.to_string(),
                title: c.title,
                url: c.url,
                relevance_score,
            })
        })
        .collect();
    sort_by_relevance(&mut articles);
    articles.truncate(cap);
    articles
}

/// Stable sort by `relevance_score`, highest first.
pub fn sort_by_relevance(articles: &mut [Article]) {
    articles.sort_by_key(|a| Reverse(a.relevance_score));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::query_words;

    fn candidate(title: &str, url: &str) -> Candidate {
        Candidate {
            title: title.to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn test_full_match_scores_every_word() {
        let words = query_words("bóng đá Việt Nam");
        assert_eq!(words, vec!["bong", "da", "viet", "nam"]);
        assert_eq!(score("Bóng đá Việt Nam thắng lớn", &words), 4);
    }

    #[test]
    fn test_no_overlap_scores_zero() {
        let words = query_words("bóng đá Việt Nam");
        assert_eq!(score("Giá vàng hôm nay tăng mạnh", &words), 0);
    }

    #[test]
    fn test_substring_is_not_a_match() {
        let words = query_words("da");
        assert_eq!(score("Đang cập nhật", &words), 0);
        assert_eq!(score("Đà Nẵng", &words), 1);
    }

    #[test]
    fn test_repeated_title_tokens_are_not_frequency_weighted() {
        let words = query_words("nam");
        assert_eq!(score("Nam Định gặp Hà Nam", &words), 1);
    }

    #[test]
    fn test_empty_inputs_score_zero() {
        assert_eq!(score("Bóng đá", &[]), 0);
        assert_eq!(score("", &query_words("bóng đá")), 0);
        assert_eq!(score("   ", &query_words("bóng đá")), 0);
    }

    #[test]
    fn test_score_never_exceeds_distinct_words() {
        let words = vec!["da".to_string(), "da".to_string(), "bong".to_string()];
        let s = score("bong da da da", &words);
        assert!(s <= words.len() as u32);
        assert_eq!(s, 2);
    }

    #[test]
    fn test_rank_drops_zero_scores_and_sorts_stably() {
        let words = query_words("bóng đá Việt Nam");
        let ranked = rank_candidates(
            "VnExpress",
            vec![
                candidate("Việt Nam hôm nay", "https://vnexpress.net/1"),
                candidate("Giá vàng", "https://vnexpress.net/2"),
                candidate("Bóng đá Việt Nam thắng lớn", "https://vnexpress.net/3"),
                candidate("Tin Việt Nam khác", "https://vnexpress.net/4"),
            ],
            &words,
            5,
        );
        let urls: Vec<&str> = ranked.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://vnexpress.net/3",
                "https://vnexpress.net/1",
                "https://vnexpress.net/4",
            ]
        );
        assert!(ranked.iter().all(|a| a.relevance_score >= 1));
        assert!(ranked.iter().all(|a| a.name == "VnExpress"));
    }

    #[test]
    fn test_rank_caps_per_source() {
        let words = query_words("nam");
        let candidates = (0..8)
            .map(|i| candidate("Việt Nam", &format!("https://tuoitre.vn/{i}")))
            .collect();
        let ranked = rank_candidates("Tuổi Trẻ", candidates, &words, 5);
        assert_eq!(ranked.len(), 5);
        assert_eq!(ranked[0].url, "https://tuoitre.vn/0");
        assert_eq!(ranked[4].url, "https://tuoitre.vn/4");
    }
}
