//! Grapheme-aware string helpers for operator-facing text

use unicode_segmentation::UnicodeSegmentation;

/// Title-case every word: `"TRAINER"` -> `"Trainer"`, `"jane doe"` -> `"Jane Doe"`
pub fn title_case(s: &str) -> String {
    s.split_word_bounds()
        .map(|w| {
            let mut g = w.graphemes(true);
            match g.next() {
                Some(first) => format!("{}{}", first.to_uppercase(), g.as_str().to_lowercase()),
                None => String::new(),
            }
        })
        .collect()
}

/// Shorten `s` to at most `max` graphemes, marking the cut with an ellipsis
pub fn truncate_graphemes(s: &str, max: usize) -> String {
    let graphemes: Vec<&str> = s.graphemes(true).collect();
    if graphemes.len() <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out: String = graphemes[..max - 1].concat();
    out.push('…');
    out
}
