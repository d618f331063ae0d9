//! The drill state machine.
//!
//! ```text
//! Fresh / Restore ──► Practicing ──(queue empty)──► Complete
//!                       │   ▲
//!     wrong, tries > 1  │   │ advance_after_reveal (front rotates to the back)
//!                       ▼   │
//!               wrong, last try ─► revealed
//! ```
//!
//! Every transition returns an [`Outcome`] carrying the cues for the
//! announcer, in delivery order. The session never performs I/O; persisting
//! [`Session::snapshot`] and speaking the cues is the caller's job.

use std::collections::VecDeque;

use rand::Rng;
use serde::Serialize;

use crate::text_prep::{answers_match, is_blank};
use crate::types::{Attempt, Cue, MAX_TRIES, Phase, SessionView, Snapshot, Word};

/// Where a session comes from.
#[derive(Debug, Clone)]
pub enum Source {
    /// Build a new session over these word texts.
    Fresh(Vec<String>),
    /// Resume from a snapshot; `fallback` seeds a fresh session if it is unusable.
    Restore {
        snapshot: Snapshot,
        fallback: Vec<String>,
    },
}

/// Why a snapshot could not be resumed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RestoreError {
    #[error("snapshot has no words")]
    NoWords,
    #[error("duplicate word id {0}")]
    DuplicateId(u32),
    #[error("unknown word id {0}")]
    UnknownWord(u32),
    #[error("word id {0} is listed more than once")]
    RepeatedId(u32),
    #[error("word id {0} is both queued and mastered")]
    QueuedAndMastered(u32),
    #[error("tries left out of range: {0}")]
    TriesOutOfRange(u8),
}

/// What a command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Verdict {
    /// Precondition not met; nothing changed.
    Ignored,
    /// A session was created, restored, or reset.
    Started,
    Correct,
    TryAgain,
    Revealed,
    Advanced,
    Replayed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub verdict: Verdict,
    pub cues: Vec<Cue>,
}

impl Outcome {
    pub fn ignored() -> Self {
        Self {
            verdict: Verdict::Ignored,
            cues: Vec::new(),
        }
    }

    fn new(verdict: Verdict, cues: Vec<Cue>) -> Self {
        Self { verdict, cues }
    }

    /// Whether the session state changed and should be persisted.
    pub fn is_transition(&self) -> bool {
        !matches!(self.verdict, Verdict::Ignored | Verdict::Replayed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    words: Vec<Word>,
    queue: VecDeque<u32>,
    /// Insertion order is kept so snapshots round-trip exactly.
    mastered: Vec<u32>,
    attempt: Attempt,
    phase: Phase,
}

impl Session {
    /// Build or resume a session. Never fails: an unusable snapshot falls
    /// back to a fresh session over the fallback words.
    ///
    /// Returns the session plus the error that forced a fallback, if any.
    pub fn initialize<R: Rng + ?Sized>(
        source: Source,
        rng: &mut R,
    ) -> (Self, Outcome, Option<RestoreError>) {
        match source {
            Source::Fresh(texts) => {
                let session = Self::fresh(texts, rng);
                let outcome = session.start_outcome();
                (session, outcome, None)
            }
            Source::Restore { snapshot, fallback } => match Self::restore(snapshot) {
                Ok(session) => {
                    let outcome = session.start_outcome();
                    (session, outcome, None)
                }
                Err(e) => {
                    let session = Self::fresh(fallback, rng);
                    let outcome = session.start_outcome();
                    (session, outcome, Some(e))
                }
            },
        }
    }

    /// Assign ids 1..=n, zero the counters, and shuffle the queue.
    pub fn fresh<R: Rng + ?Sized>(texts: Vec<String>, rng: &mut R) -> Self {
        let words: Vec<Word> = texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| Word {
                id: i as u32 + 1,
                text,
                incorrect_attempts: 0,
            })
            .collect();

        let mut ids: Vec<u32> = words.iter().map(|w| w.id).collect();
        shuffle(&mut ids, rng);

        let mut session = Self {
            words,
            queue: ids.into(),
            mastered: Vec::new(),
            attempt: Attempt::default(),
            phase: Phase::Practicing,
        };
        session.settle_phase();
        session
    }

    /// Adopt a snapshot verbatim after checking its invariants.
    ///
    /// The phase is derived from the queue rather than trusted.
    pub fn restore(snapshot: Snapshot) -> Result<Self, RestoreError> {
        if snapshot.words.is_empty() {
            return Err(RestoreError::NoWords);
        }

        let mut seen = std::collections::HashSet::new();
        for word in &snapshot.words {
            if !seen.insert(word.id) {
                return Err(RestoreError::DuplicateId(word.id));
            }
        }

        let mut listed = std::collections::HashSet::new();
        for &id in &snapshot.queue_ids {
            if !seen.contains(&id) {
                return Err(RestoreError::UnknownWord(id));
            }
            if !listed.insert(id) {
                return Err(RestoreError::RepeatedId(id));
            }
        }
        let mut mastered_seen = std::collections::HashSet::new();
        for &id in &snapshot.mastered_ids {
            if !seen.contains(&id) {
                return Err(RestoreError::UnknownWord(id));
            }
            if listed.contains(&id) {
                return Err(RestoreError::QueuedAndMastered(id));
            }
            if !mastered_seen.insert(id) {
                return Err(RestoreError::RepeatedId(id));
            }
        }

        if snapshot.tries_left > MAX_TRIES {
            return Err(RestoreError::TriesOutOfRange(snapshot.tries_left));
        }

        let mut session = Self {
            words: snapshot.words,
            queue: snapshot.queue_ids.into(),
            mastered: snapshot.mastered_ids,
            attempt: Attempt {
                tries_left: snapshot.tries_left,
                revealed: snapshot.revealed,
                draft_answer: snapshot.draft_answer,
            },
            phase: snapshot.phase,
        };
        session.settle_phase();
        Ok(session)
    }

    /// Check a typed answer against the current word.
    pub fn submit_answer(&mut self, raw: &str) -> Outcome {
        if self.phase != Phase::Practicing || is_blank(raw) || self.attempt.revealed {
            return Outcome::ignored();
        }
        let Some(current) = self.current_word().cloned() else {
            return Outcome::ignored();
        };

        if answers_match(raw, &current.text) {
            self.queue.pop_front();
            self.mastered.push(current.id);
            self.attempt = Attempt::default();
            self.settle_phase();

            let mut cues = vec![Cue::Celebrate, Cue::Correct];
            cues.extend(self.announce_current(true));
            return Outcome::new(Verdict::Correct, cues);
        }

        if let Some(word) = self.words.iter_mut().find(|w| w.id == current.id) {
            word.incorrect_attempts = word.incorrect_attempts.saturating_add(1);
        }

        if self.attempt.tries_left > 1 {
            self.attempt.tries_left -= 1;
            Outcome::new(
                Verdict::TryAgain,
                vec![
                    Cue::TryAgain,
                    Cue::Announce {
                        word: current.text,
                        intro: false,
                    },
                ],
            )
        } else {
            self.attempt.tries_left = 0;
            self.attempt.revealed = true;
            Outcome::new(Verdict::Revealed, vec![Cue::Reveal { word: current.text }])
        }
    }

    /// Leave reveal mode: the revealed word goes to the back of the queue.
    pub fn advance_after_reveal(&mut self) -> Outcome {
        if !self.attempt.revealed {
            return Outcome::ignored();
        }
        let Some(front) = self.queue.pop_front() else {
            return Outcome::ignored();
        };

        self.queue.push_back(front);
        self.attempt = Attempt::default();
        self.settle_phase();
        Outcome::new(Verdict::Advanced, self.announce_current(true))
    }

    /// Start over with every counter zeroed and a new shuffle.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Outcome {
        let mut words = self.words.clone();
        words.sort_by_key(|w| w.id);
        let texts = words.into_iter().map(|w| w.text).collect();
        *self = Self::fresh(texts, rng);
        self.start_outcome()
    }

    /// Store the in-progress answer. Does not check it.
    pub fn update_draft(&mut self, text: &str) {
        self.attempt.draft_answer = text.to_string();
    }

    /// Say the current word again, without the intro.
    pub fn replay(&self) -> Outcome {
        let cues = self.announce_current(false);
        if cues.is_empty() {
            Outcome::ignored()
        } else {
            Outcome::new(Verdict::Replayed, cues)
        }
    }

    pub fn current_word(&self) -> Option<&Word> {
        let id = *self.queue.front()?;
        self.word(id)
    }

    pub fn word(&self, id: u32) -> Option<&Word> {
        self.words.iter().find(|w| w.id == id)
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn queue(&self) -> &VecDeque<u32> {
        &self.queue
    }

    pub fn mastered(&self) -> &[u32] {
        &self.mastered
    }

    pub fn is_mastered(&self, id: u32) -> bool {
        self.mastered.contains(&id)
    }

    pub fn attempt(&self) -> &Attempt {
        &self.attempt
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn total_mistakes(&self) -> u32 {
        self.words
            .iter()
            .fold(0u32, |total, w| total.saturating_add(w.incorrect_attempts))
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            words: self.words.clone(),
            queue_ids: self.queue.iter().copied().collect(),
            mastered_ids: self.mastered.clone(),
            tries_left: self.attempt.tries_left,
            revealed: self.attempt.revealed,
            draft_answer: self.attempt.draft_answer.clone(),
            phase: self.phase,
        }
    }

    pub fn view(&self) -> SessionView {
        let current = self.current_word().cloned();
        SessionView {
            current_mistakes: current.as_ref().map_or(0, |w| w.incorrect_attempts),
            current_word: current,
            mastered: self.mastered.len(),
            remaining: self.queue.len(),
            total: self.words.len(),
            total_mistakes: self.total_mistakes(),
            tries_left: self.attempt.tries_left,
            revealed: self.attempt.revealed,
            phase: self.phase,
            draft_answer: self.attempt.draft_answer.clone(),
        }
    }

    /// Cues for a newly created or resumed session. A resumed word that is
    /// still revealed is on screen already, so it is not announced.
    fn start_outcome(&self) -> Outcome {
        let cues = if self.attempt.revealed {
            Vec::new()
        } else {
            self.announce_current(true)
        };
        Outcome::new(Verdict::Started, cues)
    }

    fn announce_current(&self, intro: bool) -> Vec<Cue> {
        if self.phase != Phase::Practicing {
            return Vec::new();
        }
        self.current_word()
            .map(|w| Cue::Announce {
                word: w.text.clone(),
                intro,
            })
            .into_iter()
            .collect()
    }

    fn settle_phase(&mut self) {
        self.phase = if self.queue.is_empty() {
            Phase::Complete
        } else {
            Phase::Practicing
        };
    }
}

/// Fisher–Yates: from the last index down to 1, swap with a uniform index ≤ i.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashMap;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    /// A session whose queue follows `order` exactly.
    fn ordered(order: &[&str]) -> Session {
        let words: Vec<Word> = order
            .iter()
            .enumerate()
            .map(|(i, t)| Word {
                id: i as u32 + 1,
                text: t.to_string(),
                incorrect_attempts: 0,
            })
            .collect();
        let queue_ids = words.iter().map(|w| w.id).collect();
        Session::restore(Snapshot {
            words,
            queue_ids,
            mastered_ids: Vec::new(),
            tries_left: MAX_TRIES,
            revealed: false,
            draft_answer: String::new(),
            phase: Phase::Practicing,
        })
        .unwrap()
    }

    fn current(s: &Session) -> &str {
        &s.current_word().unwrap().text
    }

    // ── initialize ──────────────────────────────────────────────────

    #[test]
    fn fresh_assigns_sequential_ids_and_shuffles_all() {
        let mut rng = rng();
        let s = Session::fresh(vec!["a".into(), "b".into(), "c".into()], &mut rng);
        let ids: Vec<u32> = s.words().iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        let mut queued: Vec<u32> = s.queue().iter().copied().collect();
        queued.sort();
        assert_eq!(queued, vec![1, 2, 3]);
        assert!(s.mastered().is_empty());
        assert_eq!(s.attempt(), &Attempt::default());
        assert_eq!(s.phase(), Phase::Practicing);
    }

    #[test]
    fn fresh_announces_first_word_with_intro() {
        let (s, outcome, err) = Session::initialize(
            Source::Fresh(vec!["cat".into(), "dog".into()]),
            &mut rng(),
        );
        assert!(err.is_none());
        assert_eq!(outcome.verdict, Verdict::Started);
        assert_eq!(
            outcome.cues,
            vec![Cue::Announce {
                word: current(&s).to_string(),
                intro: true
            }]
        );
    }

    #[test]
    fn empty_snapshot_falls_back_to_fresh() {
        let snapshot: Snapshot = serde_json::from_str("{}").unwrap();
        let (s, outcome, err) = Session::initialize(
            Source::Restore {
                snapshot,
                fallback: vec!["bug".into()],
            },
            &mut rng(),
        );
        assert_eq!(err, Some(RestoreError::NoWords));
        assert_eq!(current(&s), "bug");
        assert_eq!(outcome.cues.len(), 1);
    }

    #[test]
    fn inconsistent_snapshot_falls_back_to_fresh() {
        let mut snapshot = ordered(&["cat", "dog"]).snapshot();
        snapshot.mastered_ids = vec![1];
        let (s, _, err) = Session::initialize(
            Source::Restore {
                snapshot,
                fallback: vec!["cat".into(), "dog".into()],
            },
            &mut rng(),
        );
        assert_eq!(err, Some(RestoreError::QueuedAndMastered(1)));
        assert!(s.mastered().is_empty());
        assert_eq!(s.queue().len(), 2);
    }

    #[test]
    fn unknown_queue_id_is_rejected() {
        let mut snapshot = ordered(&["cat"]).snapshot();
        snapshot.queue_ids = vec![1, 9];
        assert_eq!(Session::restore(snapshot), Err(RestoreError::UnknownWord(9)));
    }

    #[test]
    fn restored_reveal_is_not_announced() {
        let mut s = ordered(&["bug", "cat"]);
        s.submit_answer("bog");
        s.submit_answer("big");
        let (restored, outcome, _) = Session::initialize(
            Source::Restore {
                snapshot: s.snapshot(),
                fallback: Vec::new(),
            },
            &mut rng(),
        );
        assert!(restored.attempt().revealed);
        assert!(outcome.cues.is_empty());
    }

    #[test]
    fn restore_derives_complete_from_empty_queue() {
        let mut snapshot = ordered(&["cat"]).snapshot();
        snapshot.queue_ids.clear();
        snapshot.mastered_ids = vec![1];
        let s = Session::restore(snapshot).unwrap();
        assert_eq!(s.phase(), Phase::Complete);
        assert!(s.start_outcome().cues.is_empty());
    }

    // ── shuffle ─────────────────────────────────────────────────────

    #[test]
    fn shuffle_is_uniform_over_permutations() {
        let mut rng = StdRng::seed_from_u64(2024);
        let mut counts: HashMap<Vec<u32>, u32> = HashMap::new();
        let draws = 6000;
        for _ in 0..draws {
            let mut ids = vec![1, 2, 3];
            shuffle(&mut ids, &mut rng);
            *counts.entry(ids).or_default() += 1;
        }
        assert_eq!(counts.len(), 6);
        for (perm, n) in counts {
            // expected 1000, σ ≈ 29
            assert!((850..=1150).contains(&n), "{perm:?} drawn {n} times");
        }
    }

    #[test]
    fn shuffle_handles_tiny_inputs() {
        let mut rng = rng();
        let mut empty: Vec<u32> = Vec::new();
        shuffle(&mut empty, &mut rng);
        let mut one = vec![7];
        shuffle(&mut one, &mut rng);
        assert_eq!(one, vec![7]);
    }

    // ── submit ──────────────────────────────────────────────────────

    #[test]
    fn blank_submission_is_a_no_op() {
        let mut s = ordered(&["cat", "dog"]);
        s.submit_answer("cet");
        let before = s.clone();
        for blank in ["", "   ", "\t\n"] {
            assert_eq!(s.submit_answer(blank), Outcome::ignored());
            assert_eq!(s, before);
        }
    }

    #[test]
    fn cat_dog_scenario() {
        let mut s = ordered(&["dog", "cat"]);

        let outcome = s.submit_answer("dog");
        assert_eq!(outcome.verdict, Verdict::Correct);
        assert_eq!(
            outcome.cues,
            vec![
                Cue::Celebrate,
                Cue::Correct,
                Cue::Announce {
                    word: "cat".into(),
                    intro: true
                }
            ]
        );
        assert_eq!(s.mastered(), &[1]);
        assert_eq!(s.queue().iter().copied().collect::<Vec<_>>(), vec![2]);
        assert_eq!(s.attempt(), &Attempt::default());

        let outcome = s.submit_answer("cet");
        assert_eq!(outcome.verdict, Verdict::TryAgain);
        assert_eq!(
            outcome.cues,
            vec![
                Cue::TryAgain,
                Cue::Announce {
                    word: "cat".into(),
                    intro: false
                }
            ]
        );
        assert_eq!(s.word(2).unwrap().incorrect_attempts, 1);
        assert_eq!(s.attempt().tries_left, 1);

        let outcome = s.submit_answer("cat");
        assert_eq!(outcome.cues, vec![Cue::Celebrate, Cue::Correct]);
        assert_eq!(s.mastered(), &[1, 2]);
        assert!(s.queue().is_empty());
        assert_eq!(s.phase(), Phase::Complete);
        assert_eq!(s.total_mistakes(), 1);
    }

    #[test]
    fn two_tries_then_reveal() {
        let mut s = ordered(&["bug"]);
        assert_eq!(s.submit_answer("bog").verdict, Verdict::TryAgain);
        let outcome = s.submit_answer("big");
        assert_eq!(outcome.verdict, Verdict::Revealed);
        assert_eq!(outcome.cues, vec![Cue::Reveal { word: "bug".into() }]);
        assert_eq!(s.attempt().tries_left, 0);
        assert!(s.attempt().revealed);
        assert_eq!(s.word(1).unwrap().incorrect_attempts, 2);

        let before = s.clone();
        assert_eq!(s.submit_answer("bag"), Outcome::ignored());
        assert_eq!(s, before);
    }

    #[test]
    fn revealed_word_cannot_be_mastered_by_typing() {
        let mut s = ordered(&["bug"]);
        s.submit_answer("bog");
        s.submit_answer("big");
        assert_eq!(s.submit_answer("bug"), Outcome::ignored());
        assert!(s.mastered().is_empty());
    }

    #[test]
    fn answer_normalization_applies() {
        let mut s = ordered(&["ice cream"]);
        assert_eq!(s.submit_answer("  ICE   cream ").verdict, Verdict::Correct);
    }

    #[test]
    fn submit_after_completion_is_ignored() {
        let mut s = ordered(&["cat"]);
        s.submit_answer("cat");
        assert_eq!(s.submit_answer("cat"), Outcome::ignored());
    }

    #[test]
    fn wrong_answer_keeps_the_draft() {
        let mut s = ordered(&["cat"]);
        s.update_draft("cet");
        s.submit_answer("cet");
        assert_eq!(s.attempt().draft_answer, "cet");
        s.update_draft("cat");
        s.submit_answer("cat");
        assert_eq!(s.attempt().draft_answer, "");
    }

    // ── advance ─────────────────────────────────────────────────────

    #[test]
    fn bug_reveal_rotation_scenario() {
        let mut s = ordered(&["bug"]);
        s.submit_answer("bog");
        s.submit_answer("big");

        let outcome = s.advance_after_reveal();
        assert_eq!(outcome.verdict, Verdict::Advanced);
        assert_eq!(
            outcome.cues,
            vec![Cue::Announce {
                word: "bug".into(),
                intro: true
            }]
        );
        assert_eq!(s.queue().len(), 1);
        assert_eq!(current(&s), "bug");
        assert_eq!(s.attempt(), &Attempt::default());
        assert_eq!(s.word(1).unwrap().incorrect_attempts, 2);
        assert_eq!(s.phase(), Phase::Practicing);
    }

    #[test]
    fn advance_rotates_to_the_back() {
        let mut s = ordered(&["one", "two", "three"]);
        s.submit_answer("x");
        s.submit_answer("y");
        s.advance_after_reveal();
        assert_eq!(s.queue().iter().copied().collect::<Vec<_>>(), vec![2, 3, 1]);
        assert_eq!(current(&s), "two");
    }

    #[test]
    fn advance_without_reveal_is_ignored() {
        let mut s = ordered(&["cat", "dog"]);
        let before = s.clone();
        assert_eq!(s.advance_after_reveal(), Outcome::ignored());
        assert_eq!(s, before);
    }

    #[test]
    fn rotated_word_gets_two_fresh_tries_and_keeps_counting() {
        let mut s = ordered(&["bug"]);
        s.submit_answer("a");
        s.submit_answer("b");
        s.advance_after_reveal();
        assert_eq!(s.submit_answer("c").verdict, Verdict::TryAgain);
        assert_eq!(s.word(1).unwrap().incorrect_attempts, 3);
        assert_eq!(s.submit_answer("bug").verdict, Verdict::Correct);
        assert_eq!(s.phase(), Phase::Complete);
    }

    // ── reset / replay / view ───────────────────────────────────────

    #[test]
    fn reset_zeroes_everything() {
        let mut s = ordered(&["cat", "dog"]);
        s.submit_answer("dog");
        s.submit_answer("cat");
        s.update_draft("half");
        let outcome = s.reset(&mut rng());
        assert_eq!(outcome.verdict, Verdict::Started);
        assert_eq!(outcome.cues.len(), 1);
        assert!(s.mastered().is_empty());
        assert_eq!(s.queue().len(), 2);
        assert_eq!(s.total_mistakes(), 0);
        assert_eq!(s.attempt(), &Attempt::default());
        let texts: Vec<&str> = s.words().iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["cat", "dog"]);
    }

    #[test]
    fn replay_says_the_bare_word_without_changes() {
        let s = ordered(&["cat"]);
        let outcome = s.replay();
        assert_eq!(outcome.verdict, Verdict::Replayed);
        assert!(!outcome.is_transition());
        assert_eq!(
            outcome.cues,
            vec![Cue::Announce {
                word: "cat".into(),
                intro: false
            }]
        );
    }

    #[test]
    fn replay_when_complete_is_ignored() {
        let mut s = ordered(&["cat"]);
        s.submit_answer("cat");
        assert_eq!(s.replay(), Outcome::ignored());
    }

    #[test]
    fn view_counts() {
        let mut s = ordered(&["dog", "cat", "bug"]);
        s.submit_answer("dog");
        s.submit_answer("cet");
        let view = s.view();
        assert_eq!(view.current_word.as_ref().unwrap().text, "cat");
        assert_eq!(view.mastered, 1);
        assert_eq!(view.remaining, 2);
        assert_eq!(view.total, 3);
        assert_eq!(view.total_mistakes, 1);
        assert_eq!(view.current_mistakes, 1);
        assert_eq!(view.tries_left, 1);
        assert!(!view.revealed);
        assert_eq!(view.phase, Phase::Practicing);
    }

    // ── persistence ─────────────────────────────────────────────────

    #[test]
    fn snapshot_round_trip_is_exact() {
        let mut s = Session::fresh(
            ["about", "above", "after", "again"].map(String::from).to_vec(),
            &mut rng(),
        );
        let first = current(&s).to_string();
        s.submit_answer(&first);
        s.submit_answer("nope");
        s.update_draft("draft in progress");

        let json = serde_json::to_string(&s.snapshot()).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s.snapshot());
        assert_eq!(Session::restore(back).unwrap(), s);
    }

    #[test]
    fn snapshot_json_is_camel_case() {
        let json = serde_json::to_value(ordered(&["cat"]).snapshot()).unwrap();
        for key in [
            "words",
            "queueIds",
            "masteredIds",
            "triesLeft",
            "revealed",
            "draftAnswer",
            "phase",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["phase"], "practicing");
        assert_eq!(json["words"][0]["incorrectAttempts"], 0);
    }

    #[test]
    fn huge_restored_counters_saturate() {
        let mut snapshot = ordered(&["cat", "dog"]).snapshot();
        for word in &mut snapshot.words {
            word.incorrect_attempts = u32::MAX - 1;
        }
        let mut s = Session::restore(snapshot).unwrap();
        assert_eq!(s.view().total_mistakes, u32::MAX);

        s.submit_answer("wrong");
        s.submit_answer("wrong");
        assert_eq!(s.word(1).unwrap().incorrect_attempts, u32::MAX);
        assert_eq!(s.view().current_mistakes, u32::MAX);
        assert_eq!(s.total_mistakes(), u32::MAX);
    }

    // ── invariants under a random walk ──────────────────────────────

    #[test]
    fn random_walk_keeps_invariants_and_completes() {
        for seed in 0..20u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let n = 1 + (seed as usize % 6);
            let texts: Vec<String> = (0..n).map(|i| format!("word{i}")).collect();
            let mut s = Session::fresh(texts, &mut rng);

            let mut steps = 0;
            while s.phase() == Phase::Practicing {
                steps += 1;
                assert!(steps < 1000, "seed {seed} did not complete");

                let before = s.clone();
                let target = current(&s).to_string();
                let outcome = match rng.random_range(0..4) {
                    0 => s.submit_answer(&target),
                    1 => s.submit_answer("wrong"),
                    2 => s.submit_answer("  "),
                    _ => s.advance_after_reveal(),
                };

                // mastered ids stay mastered and never come back
                for id in before.mastered() {
                    assert!(s.is_mastered(*id));
                    assert!(!s.queue().contains(id));
                }
                // counters only move up, by one per counted miss
                for (old, new) in before.words().iter().zip(s.words()) {
                    let bump = new.incorrect_attempts - old.incorrect_attempts;
                    let counted = outcome.verdict == Verdict::TryAgain
                        || outcome.verdict == Verdict::Revealed;
                    let expected = u32::from(counted && old.text == target);
                    assert_eq!(bump, expected);
                }
                if outcome.verdict == Verdict::Ignored {
                    assert_eq!(s, before);
                }
                assert_eq!(s.queue().len() + s.mastered().len(), n);

                let json = serde_json::to_string(&s.snapshot()).unwrap();
                let back: Snapshot = serde_json::from_str(&json).unwrap();
                assert_eq!(Session::restore(back).unwrap(), s, "seed {seed} step {steps}");
            }
            assert!(s.queue().is_empty());
            assert_eq!(s.mastered().len(), n);
        }
    }
}
