//! Property-based invariant tests for the scoring and text-stream engine.
//!
//! 1. Correct and error counts add up to the typed length.
//! 2. Accuracy is the rounded share of correct characters.
//! 3. Zero or negative elapsed time gives the neutral score.
//! 4. Target length never shrinks and growth only appends.
//! 5. Growth checks at one cursor position stop once the margin is restored.
//! 6. The controller never accepts input containing a space.

use std::time::Duration;

use monkeysee::buffer::{StreamBuffer, GROWTH_THRESHOLD};
use monkeysee::clock::ManualClock;
use monkeysee::controller::SessionController;
use monkeysee::leaderboard::Leaderboard;
use monkeysee::provider::StaticProvider;
use monkeysee::scoring::{consistency, score, Score};
use monkeysee::session::{SampleRecord, SessionConfig};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn text_strategy() -> impl Strategy<Value = Vec<char>> {
    prop::collection::vec(prop::char::range('a', 'e'), 0..120)
}

fn words_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,8}", 1..12)
}

// ═════════════════════════════════════════════════════════════════════════
// 1–3. Scoring
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn counts_cover_every_typed_char(
        typed in text_strategy(),
        target in text_strategy(),
        elapsed in 0.01f64..600.0,
    ) {
        let s = score(&typed, &target, elapsed);
        prop_assert_eq!(s.correct + s.errors, typed.len());
        prop_assert!(s.wpm <= s.raw_wpm);
    }

    #[test]
    fn accuracy_is_rounded_share_of_correct(
        typed in prop::collection::vec(prop::char::range('a', 'e'), 1..120),
        target in text_strategy(),
        elapsed in 0.01f64..600.0,
    ) {
        let s = score(&typed, &target, elapsed);
        let expected = (s.correct as f64 / typed.len() as f64 * 100.0).round() as u32;
        prop_assert_eq!(s.accuracy, expected);
        prop_assert!(s.accuracy <= 100);
    }

    #[test]
    fn no_elapsed_time_is_neutral(
        typed in text_strategy(),
        target in text_strategy(),
        elapsed in -10.0f64..=0.0,
    ) {
        prop_assert_eq!(score(&typed, &target, elapsed), Score::NEUTRAL);
    }

    #[test]
    fn consistency_stays_in_range(wpms in prop::collection::vec(0u32..300, 0..60)) {
        let history: Vec<SampleRecord> = wpms
            .iter()
            .enumerate()
            .map(|(i, &wpm)| SampleRecord { second: i as u64 + 1, wpm, raw_wpm: wpm })
            .collect();
        prop_assert!(consistency(&history) <= 100);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4–5. Stream buffer growth
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn growth_only_appends(words in words_strategy(), steps in prop::collection::vec(0usize..400, 1..40)) {
        let mut buffer = StreamBuffer::new(words).unwrap();
        let mut typed_len = 0;

        for step in steps {
            let before = buffer.target().to_vec();
            typed_len += step % 20;
            buffer.grow_if_needed(typed_len);

            prop_assert!(buffer.target_len() >= before.len());
            prop_assert_eq!(&buffer.target()[..before.len()], &before[..]);
            let joined: String = buffer.words().concat();
            prop_assert_eq!(joined.chars().collect::<Vec<_>>(), buffer.target().to_vec());
        }
    }

    #[test]
    fn growth_settles_at_a_fixed_position(words in words_strategy(), typed_len in 0usize..200) {
        let mut buffer = StreamBuffer::new(words).unwrap();
        let mut grown = 0;
        while buffer.grow_if_needed(typed_len) {
            grown += 1;
            prop_assert!(grown <= 300);
        }

        prop_assert!(buffer.remaining_capacity(typed_len) >= GROWTH_THRESHOLD as isize);
        let settled = buffer.target_len();
        prop_assert!(!buffer.grow_if_needed(typed_len));
        prop_assert_eq!(buffer.target_len(), settled);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Space filtering at the controller boundary
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn typed_input_never_contains_spaces(keys in prop::collection::vec(prop::sample::select(vec!['a', 'b', ' ', 'c']), 0..80)) {
        let clock = ManualClock::default();
        let mut controller = SessionController::new(
            SessionConfig::default(),
            "prop",
            StaticProvider::new("abc cab bca"),
            clock.clone(),
            Leaderboard::new().shared(),
        );

        for key in keys {
            controller.push_char(key);
            clock.advance(Duration::from_millis(150));
            controller.poll_clock();
        }

        prop_assert!(!controller.typed().contains(&' '));
        prop_assert!(controller.buffer().target_len() >= controller.typed().len());
    }
}
