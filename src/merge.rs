use std::collections::HashSet;

use crate::image_types::ImageHit;

/// Identity key for deduplication: the trimmed display URL, falling back to
/// `user|tags` when the URL is empty. `None` means the hit has no usable
/// identity and must be dropped.
pub fn identity_key(hit: &ImageHit) -> Option<String> {
    let url = hit.webformat_url.trim();
    if !url.is_empty() {
        return Some(url.to_string());
    }

    let fallback = format!("{}|{}", hit.user, hit.tags);
    let fallback = fallback.trim();
    // "|" alone means both parts were empty.
    if fallback == "|" || fallback.is_empty() {
        None
    } else {
        Some(fallback.to_string())
    }
}

/// Alternate the two lists element by element, then drain whatever is left of
/// the longer one. Keeps either provider from dominating the head of the
/// result when list lengths differ.
pub fn interleave(a: Vec<ImageHit>, b: Vec<ImageHit>) -> Vec<ImageHit> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let mut a = a.into_iter();
    let mut b = b.into_iter();

    loop {
        match (a.next(), b.next()) {
            (None, None) => break,
            (first, second) => {
                out.extend(first);
                out.extend(second);
            }
        }
    }

    out
}

/// Single left-to-right pass; first occurrence of a key wins, keyless hits
/// are dropped.
pub fn dedup(hits: Vec<ImageHit>) -> Vec<ImageHit> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(hits.len());

    for hit in hits {
        let Some(key) = identity_key(&hit) else {
            continue;
        };
        if seen.insert(key) {
            out.push(hit);
        }
    }

    out
}

/// Combined-plan merge: interleave then dedup. The caller reports
/// `totalHits` as the length of the returned list, not the sum of the
/// upstream totals.
pub fn merge(a: Vec<ImageHit>, b: Vec<ImageHit>) -> Vec<ImageHit> {
    dedup(interleave(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_types::Provider;

    fn hit(url: &str, user: &str, tags: &str) -> ImageHit {
        ImageHit {
            webformat_url: url.to_string(),
            tags: tags.to_string(),
            likes: 0,
            views: 0,
            user: user.to_string(),
            provider: Provider::Pixabay,
        }
    }

    fn urls(hits: &[ImageHit]) -> Vec<&str> {
        hits.iter().map(|h| h.webformat_url.as_str()).collect()
    }

    #[test]
    fn test_interleave_alternates_then_drains() {
        let a = vec![hit("a0", "", ""), hit("a1", "", "")];
        let b = vec![
            hit("b0", "", ""),
            hit("b1", "", ""),
            hit("b2", "", ""),
            hit("b3", "", ""),
        ];

        let out = interleave(a, b);
        assert_eq!(out.len(), 6);
        assert_eq!(urls(&out), vec!["a0", "b0", "a1", "b1", "b2", "b3"]);
    }

    #[test]
    fn test_interleave_with_empty_list() {
        let out = interleave(vec![], vec![hit("b0", "", ""), hit("b1", "", "")]);
        assert_eq!(urls(&out), vec!["b0", "b1"]);

        let out = interleave(vec![hit("a0", "", "")], vec![]);
        assert_eq!(urls(&out), vec!["a0"]);
    }

    #[test]
    fn test_dedup_first_occurrence_wins() {
        let first = ImageHit {
            provider: Provider::Unsplash,
            ..hit("same", "u1", "t1")
        };
        let duplicate = hit("same", "u2", "t2");

        let out = dedup(vec![first.clone(), duplicate, hit("other", "", "")]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], first);
        assert_eq!(out[1].webformat_url, "other");
    }

    #[test]
    fn test_dedup_url_trimmed_before_comparison() {
        let out = dedup(vec![hit("  same  ", "", ""), hit("same", "", "")]);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_dedup_fallback_key_user_and_tags() {
        let out = dedup(vec![
            hit("", "alice", "cats"),
            hit("", "alice", "cats"),
            hit("", "alice", "dogs"),
        ]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_keyless_hits_always_dropped() {
        let out = dedup(vec![hit("", "", ""), hit("", "", ""), hit("x", "", "")]);
        assert_eq!(urls(&out), vec!["x"]);
    }

    #[test]
    fn test_dedup_is_idempotent() {
        let input = vec![
            hit("a", "", ""),
            hit("a", "", ""),
            hit("", "u", "t"),
            hit("b", "", ""),
        ];
        let once = dedup(input);
        let twice = dedup(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_surviving_keys_pairwise_distinct() {
        let out = merge(
            vec![hit("a", "", ""), hit("b", "", ""), hit("a", "", "")],
            vec![hit("b", "", ""), hit("", "u", "t"), hit("", "u", "t")],
        );
        let keys: Vec<String> = out.iter().map(|h| identity_key(h).unwrap()).collect();
        let unique: HashSet<&String> = keys.iter().collect();
        assert_eq!(keys.len(), unique.len());
    }

    #[test]
    fn test_merge_example_short_list_drains() {
        // A = Pixabay [p1], B = Unsplash [u1, u2]
        let out = merge(
            vec![hit("p1", "", "")],
            vec![hit("u1", "", ""), hit("u2", "", "")],
        );
        assert_eq!(urls(&out), vec!["p1", "u1", "u2"]);
    }

    #[test]
    fn test_merge_shared_top_hit_collapses() {
        let a = vec![hit("shared", "", ""), hit("a1", "", "")];
        let b = vec![hit("shared", "", ""), hit("b1", "", "")];

        let out = merge(a, b);
        // Naive concatenation would hold 4; the shared URL survives once.
        assert_eq!(out.len(), 3);
        assert_eq!(urls(&out), vec!["shared", "a1", "b1"]);
    }
}
