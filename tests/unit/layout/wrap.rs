use proptest::prelude::*;

use super::*;

/// 10px per character, spaces included.
fn mono(s: &str) -> f32 {
    s.chars().count() as f32 * 10.0
}

#[test]
fn three_words_two_per_line() {
    let block = wrap_words("A B C", 35.0, &mut mono);
    assert_eq!(block.texts(), vec!["A B", "C"]);
    assert_eq!(block.lines[0].width, 30.0);
    assert_eq!(block.lines[1].width, 10.0);
}

#[test]
fn single_long_word_is_one_oversized_line() {
    let block = wrap_words("Supercalifragilistic", 50.0, &mut mono);
    assert_eq!(block.len(), 1);
    assert!(block.max_width() > 50.0);
}

#[test]
fn long_word_in_the_middle_gets_its_own_line() {
    let block = wrap_words("hi incomprehensibilities yo", 60.0, &mut mono);
    assert_eq!(block.texts(), vec!["hi", "incomprehensibilities", "yo"]);
}

#[test]
fn whitespace_only_message_yields_nothing() {
    assert!(wrap_words("   \n\t ", 100.0, &mut mono).is_empty());
    assert!(wrap_words("", 100.0, &mut mono).is_empty());
}

#[test]
fn whitespace_is_collapsed() {
    let block = wrap_words("  hello \n  world  ", 1000.0, &mut mono);
    assert_eq!(block.texts(), vec!["hello world"]);
}

#[test]
fn exact_fit_stays_on_the_line() {
    let block = wrap_words("ab cd", 50.0, &mut mono);
    assert_eq!(block.texts(), vec!["ab cd"]);
}

#[test]
fn background_rect_covers_block_plus_padding() {
    let block = wrap_words("A B C", 35.0, &mut mono);
    let r = block.background_rect((60.0, 120.0), 24.0, 44.0);
    assert_eq!(r, Rect::new(60.0, 120.0, 60.0 + 30.0 + 48.0, 120.0 + 88.0 + 48.0));
}

/// Minimum number of lines for words of the given lengths under a monospace measure.
fn min_lines(lens: &[usize], max_chars: usize) -> usize {
    // best[i] = min lines for the first i words.
    let n = lens.len();
    let mut best = vec![usize::MAX; n + 1];
    best[0] = 0;
    for end in 1..=n {
        for start in (0..end).rev() {
            let chars: usize = lens[start..end].iter().sum::<usize>() + (end - start - 1);
            if chars > max_chars {
                break;
            }
            if best[start] != usize::MAX {
                best[end] = best[end].min(best[start] + 1);
            }
        }
    }
    best[n]
}

proptest! {
    #[test]
    fn greedy_wrap_is_minimal_and_within_width(
        lens in prop::collection::vec(1usize..8, 1..12),
        max_chars in 8usize..30,
    ) {
        let words: Vec<String> = lens.iter().map(|&n| "x".repeat(n)).collect();
        let message = words.join(" ");
        let max_width = max_chars as f32 * 10.0;

        let block = wrap_words(&message, max_width, &mut mono);

        prop_assert_eq!(block.len(), min_lines(&lens, max_chars));
        for line in &block.lines {
            prop_assert!(line.width <= max_width);
        }
        let rejoined = block.texts().join(" ");
        prop_assert_eq!(rejoined, message);
    }

    #[test]
    fn one_word_is_always_one_line(len in 1usize..200, max_chars in 1usize..50) {
        let word = "w".repeat(len);
        let block = wrap_words(&word, max_chars as f32 * 10.0, &mut mono);
        prop_assert_eq!(block.len(), 1);
    }
}
