use std::sync::LazyLock;

use regex::Regex;

static SENTENCE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]+").unwrap());

/// Readability is statistically unreliable below this many words.
const MIN_READABLE_WORDS: usize = 50;

/// Word and sentence counts for a body of text.
///
/// Sentence count is the number of segments produced by splitting on runs of
/// `. ! ?`. A trailing terminator leaves a trailing empty segment, which IS
/// counted, and an empty string splits into one segment. Both quirks are kept
/// for compatibility with previously recorded metrics.
pub fn basic_metrics(text: &str) -> (usize, usize) {
    let word_count = text.split_whitespace().count();
    let sentence_count = SENTENCE_RE.split(text).count();
    (word_count, sentence_count)
}

/// Flesch Reading Ease, rounded to two decimals.
///
/// Returns 0.0 for text under [`MIN_READABLE_WORDS`] words or when the
/// computed score is not finite.
pub fn readability(text: &str) -> f64 {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() < MIN_READABLE_WORDS {
        return 0.0;
    }

    let sentences = SENTENCE_RE
        .split(text)
        .filter(|s| !s.trim().is_empty())
        .count()
        .max(1);
    let syllables: usize = words.iter().map(|w| count_syllables(w)).sum();

    let words_per_sentence = words.len() as f64 / sentences as f64;
    let syllables_per_word = syllables as f64 / words.len() as f64;
    let score = 206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word;

    if !score.is_finite() {
        return 0.0;
    }
    (score * 100.0).round() / 100.0
}

/// Vowel-group syllable estimate: count vowel runs, discount a silent
/// trailing "e", floor at one.
fn count_syllables(word: &str) -> usize {
    let lower = word.to_lowercase();
    let mut count = 0;
    let mut prev_vowel = false;
    for c in lower.chars() {
        let vowel = matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
        if vowel && !prev_vowel {
            count += 1;
        }
        prev_vowel = vowel;
    }
    if count > 1 && lower.ends_with('e') && !lower.ends_with("le") {
        count -= 1;
    }
    count.max(1)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_words_and_sentence_segments() {
        // Two sentences plus the trailing empty segment after the final "!".
        assert_eq!(basic_metrics("Hello world. Nice day!"), (4, 3));
    }

    #[test]
    fn no_terminator_is_one_segment() {
        assert_eq!(basic_metrics("no terminator here"), (3, 1));
    }

    #[test]
    fn empty_string_splits_into_one_segment() {
        assert_eq!(basic_metrics(""), (0, 1));
    }

    #[test]
    fn terminator_runs_collapse() {
        // "Wait... what?!" → ["Wait", " what", ""]
        assert_eq!(basic_metrics("Wait... what?!"), (2, 3));
    }

    #[test]
    fn readability_zero_below_minimum_words() {
        assert_eq!(readability("short text."), 0.0);
        let forty_nine = "word ".repeat(49);
        assert_eq!(readability(forty_nine.trim()), 0.0);
    }

    #[test]
    fn readability_zero_for_empty() {
        assert_eq!(readability(""), 0.0);
    }

    #[test]
    fn readability_scores_simple_prose_high() {
        // 60 monosyllabic words, one segment: 206.835 - 1.015*60 - 84.6 = 61.335
        let text = "the cat sat on the mat ".repeat(10);
        let score = readability(text.trim());
        assert!((score - 61.34).abs() < 0.01, "got {score}");
    }

    #[test]
    fn readability_is_rounded() {
        let text = "the cat sat on the mat ".repeat(10);
        let score = readability(text.trim());
        assert_eq!((score * 100.0).round() / 100.0, score);
    }

    #[test]
    fn syllable_estimates() {
        assert_eq!(count_syllables("cat"), 1);
        assert_eq!(count_syllables("table"), 2);
        assert_eq!(count_syllables("readable"), 3);
        assert_eq!(count_syllables("idea"), 2);
        assert_eq!(count_syllables("the"), 1);
        // Floor at one even with no vowels.
        assert_eq!(count_syllables("tsk"), 1);
    }
}
