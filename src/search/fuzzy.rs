//! Typo-tolerant term matching.
//!
//! A query is split into lowercase terms; a document matches when every
//! term matches somewhere in it. A term matches a word when the word
//! contains it, or when the edit distance to the word (or to the word's
//! leading characters, so partially typed words still match) fits the
//! term's typo budget.

/// Number of typos tolerated for a term of `term_len` characters.
///
/// Short terms must match exactly; longer ones allow more slack. The result
/// never exceeds `max_typos`.
pub fn typo_budget(term_len: usize, max_typos: usize) -> usize {
    let budget = match term_len {
        0..=2 => 0,
        3..=5 => 1,
        _ => 2,
    };
    budget.min(max_typos)
}

/// Levenshtein distance between `a` and `b`, or `None` once it exceeds `max`.
pub fn bounded_levenshtein(a: &[char], b: &[char], max: usize) -> Option<usize> {
    if a.len().abs_diff(b.len()) > max {
        return None;
    }
    if a.is_empty() || b.is_empty() {
        return Some(a.len().max(b.len()));
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        let mut row_min = curr[0];
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
            row_min = row_min.min(curr[j + 1]);
        }
        if row_min > max {
            return None;
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    let distance = prev[b.len()];
    (distance <= max).then_some(distance)
}

/// Text prepared for matching: lowercased once, split into words.
#[derive(Debug, Clone)]
pub struct Haystack {
    lowered: String,
    words: Vec<Vec<char>>,
}

impl Haystack {
    pub fn new(text: &str) -> Self {
        let lowered = text.to_lowercase();
        let words = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(|w| w.chars().collect())
            .collect();
        Self { lowered, words }
    }
}

#[derive(Debug, Clone)]
struct Term {
    text: String,
    chars: Vec<char>,
    budget: usize,
}

impl Term {
    /// Best distance of this term against the haystack, if within budget.
    fn distance(&self, haystack: &Haystack) -> Option<usize> {
        if haystack.lowered.contains(&self.text) {
            return Some(0);
        }
        if self.budget == 0 {
            return None;
        }

        haystack
            .words
            .iter()
            .filter_map(|word| {
                let whole = bounded_levenshtein(&self.chars, word, self.budget);
                let prefix = (word.len() > self.chars.len())
                    .then(|| bounded_levenshtein(&self.chars, &word[..self.chars.len()], self.budget))
                    .flatten();
                match (whole, prefix) {
                    (Some(a), Some(b)) => Some(a.min(b)),
                    (a, b) => a.or(b),
                }
            })
            .min()
    }
}

/// A parsed query: all terms must match.
#[derive(Debug, Clone)]
pub struct Matcher {
    terms: Vec<Term>,
}

impl Matcher {
    /// Parses a query. Returns `None` for a blank query.
    pub fn new(query: &str, max_typos: usize) -> Option<Self> {
        let terms: Vec<Term> = query
            .split_whitespace()
            .map(|raw| {
                let text = raw.to_lowercase();
                let chars: Vec<char> = text.chars().collect();
                let budget = typo_budget(chars.len(), max_typos);
                Term {
                    text,
                    chars,
                    budget,
                }
            })
            .collect();

        if terms.is_empty() { None } else { Some(Self { terms }) }
    }

    /// Total typo count if every term matches one of the fields.
    pub fn score(&self, fields: &[&Haystack]) -> Option<usize> {
        self.terms.iter().try_fold(0, |total, term| {
            let best = fields.iter().filter_map(|field| term.distance(field)).min()?;
            Some(total + best)
        })
    }

    pub fn matches(&self, fields: &[&Haystack]) -> bool {
        self.score(fields).is_some()
    }
}
