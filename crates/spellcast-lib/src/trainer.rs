//! Session driver: the process-wide drill session.
//!
//! Owns the [`Session`] behind an async mutex so commands are applied one at
//! a time, speaks each transition's cues through the [`Announcer`], and
//! persists a snapshot after every committed transition. Every write, the
//! final flush included, goes through a single writer task fed in order over
//! an `mpsc` channel. Queued saves superseded by a newer one are skipped, so
//! the newest snapshot always lands last.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};

use spellcast_core::session::{Outcome, Session, Source, Verdict};
use spellcast_core::types::{AnnouncerStatus, Cue, SessionView, Snapshot, VoiceAvailability};
use spellcast_core::words::default_words;

use crate::announcer::Announcer;
use crate::store::{SNAPSHOT_KEY, SnapshotStore, StoreError};

/// Buffered cue events per subscriber before old ones are dropped.
const CUE_CHANNEL_CAPACITY: usize = 64;

/// Result of a command: what happened and the state afterwards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult {
    pub verdict: Verdict,
    pub view: SessionView,
}

pub struct Trainer {
    session: Mutex<Session>,
    announcer: Announcer,
    store: Arc<dyn SnapshotStore>,
    persist_tx: mpsc::UnboundedSender<Persist>,
    cues_tx: broadcast::Sender<Cue>,
}

/// A serialized snapshot for the writer task.
enum Persist {
    Save(String),
    /// Save, then report the outcome of the write.
    Flush {
        json: String,
        done: oneshot::Sender<Result<(), StoreError>>,
    },
}

impl Trainer {
    /// Resume the saved session, or start a fresh one over the built-in words.
    pub async fn start(store: Arc<dyn SnapshotStore>, announcer: Announcer) -> Self {
        Self::start_with_words(store, announcer, default_words()).await
    }

    /// Like [`Trainer::start`], with `words` seeding any fresh session.
    pub async fn start_with_words(
        store: Arc<dyn SnapshotStore>,
        announcer: Announcer,
        words: Vec<String>,
    ) -> Self {
        let source = match load_snapshot(store.as_ref()).await {
            Some(snapshot) => Source::Restore {
                snapshot,
                fallback: words,
            },
            None => Source::Fresh(words),
        };

        let (session, outcome, restore_err) = Session::initialize(source, &mut rand::rng());
        match restore_err {
            Some(e) => warn!("trainer: saved session unusable, starting fresh: {e}"),
            None => info!(
                "trainer: session ready, {} of {} words left",
                session.queue().len(),
                session.words().len()
            ),
        }

        let (persist_tx, persist_rx) = mpsc::unbounded_channel();
        tokio::spawn(persist_task(store.clone(), persist_rx));
        let (cues_tx, _) = broadcast::channel(CUE_CHANNEL_CAPACITY);

        let trainer = Self {
            session: Mutex::new(session),
            announcer,
            store,
            persist_tx,
            cues_tx,
        };
        {
            let session = trainer.session.lock().await;
            trainer.commit(&session, &outcome);
        }
        trainer
    }

    pub async fn view(&self) -> SessionView {
        self.session.lock().await.view()
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.session.lock().await.snapshot()
    }

    /// Store the in-progress answer.
    pub async fn update_draft(&self, text: &str) -> SessionView {
        let mut session = self.session.lock().await;
        session.update_draft(text);
        self.persist(&session);
        session.view()
    }

    /// Check the current draft answer.
    pub async fn submit(&self) -> CommandResult {
        let mut session = self.session.lock().await;
        let draft = session.attempt().draft_answer.clone();
        let outcome = session.submit_answer(&draft);
        self.finish(&session, outcome)
    }

    /// Set the draft to `answer` and check it in one step.
    pub async fn submit_answer(&self, answer: &str) -> CommandResult {
        let mut session = self.session.lock().await;
        session.update_draft(answer);
        self.persist(&session);
        let outcome = session.submit_answer(answer);
        self.finish(&session, outcome)
    }

    pub async fn advance_after_reveal(&self) -> CommandResult {
        let mut session = self.session.lock().await;
        let outcome = session.advance_after_reveal();
        self.finish(&session, outcome)
    }

    /// Drop the saved session and start over with a new shuffle.
    pub async fn reset(&self) -> CommandResult {
        let mut session = self.session.lock().await;
        if let Err(e) = self.store.remove(SNAPSHOT_KEY).await {
            warn!("trainer: could not discard saved session: {e}");
        }
        let outcome = session.reset(&mut rand::rng());
        info!("trainer: reset, {} words queued", session.queue().len());
        self.finish(&session, outcome)
    }

    pub async fn replay_current_word(&self) -> CommandResult {
        let session = self.session.lock().await;
        let outcome = session.replay();
        self.finish(&session, outcome)
    }

    /// Subscribe to cues (celebrations, encouragement, announcements) as
    /// they are issued.
    pub fn subscribe(&self) -> broadcast::Receiver<Cue> {
        self.cues_tx.subscribe()
    }

    pub fn voice_availability(&self) -> VoiceAvailability {
        self.announcer.availability()
    }

    pub fn announcer_status(&self) -> AnnouncerStatus {
        self.announcer.status()
    }

    /// Write the current snapshot and wait for the write to land.
    ///
    /// Queued behind any earlier saves, so nothing older can overwrite it.
    pub async fn flush(&self) -> Result<(), StoreError> {
        let (done, rx) = oneshot::channel();
        {
            let session = self.session.lock().await;
            let json = match serde_json::to_string(&session.snapshot()) {
                Ok(json) => json,
                Err(e) => {
                    warn!("trainer: could not serialize session: {e}");
                    return Ok(());
                }
            };
            if let Err(mpsc::error::SendError(Persist::Flush { json, .. })) =
                self.persist_tx.send(Persist::Flush { json, done })
            {
                warn!("trainer: writer gone, saving directly");
                return self.store.set(SNAPSHOT_KEY, &json).await;
            }
        }
        match rx.await {
            Ok(result) => result,
            Err(_) => {
                warn!("trainer: writer stopped before the final save");
                Ok(())
            }
        }
    }

    /// Final write and silence. Call once on exit.
    pub async fn shutdown(&self) -> Result<(), StoreError> {
        self.announcer.stop();
        self.flush().await
    }

    fn finish(&self, session: &Session, outcome: Outcome) -> CommandResult {
        self.commit(session, &outcome);
        CommandResult {
            verdict: outcome.verdict,
            view: session.view(),
        }
    }

    fn commit(&self, session: &Session, outcome: &Outcome) {
        debug!("trainer: {:?}, {} cues", outcome.verdict, outcome.cues.len());
        if outcome.is_transition() {
            self.persist(session);
        }
        if outcome.cues.is_empty() {
            return;
        }
        for cue in &outcome.cues {
            let _ = self.cues_tx.send(cue.clone());
        }
        self.announcer.announce_cues(&outcome.cues);
    }

    /// Hand the snapshot to the writer task. Fire and forget.
    fn persist(&self, session: &Session) {
        match serde_json::to_string(&session.snapshot()) {
            Ok(json) => {
                let _ = self.persist_tx.send(Persist::Save(json));
            }
            Err(e) => warn!("trainer: could not serialize session: {e}"),
        }
    }
}

async fn load_snapshot(store: &dyn SnapshotStore) -> Option<Snapshot> {
    let raw = match store.get(SNAPSHOT_KEY).await {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!("trainer: no saved session");
            return None;
        }
        Err(e) => {
            warn!("trainer: could not read saved session: {e}");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            warn!("trainer: saved session is corrupt: {e}");
            None
        }
    }
}

async fn persist_task(store: Arc<dyn SnapshotStore>, mut rx: mpsc::UnboundedReceiver<Persist>) {
    while let Some(mut next) = rx.recv().await {
        // Skip saves that a queued message already supersedes.
        while let Persist::Save(_) = next {
            match rx.try_recv() {
                Ok(newer) => next = newer,
                Err(_) => break,
            }
        }

        match next {
            Persist::Save(json) => {
                if let Err(e) = store.set(SNAPSHOT_KEY, &json).await {
                    warn!("trainer: could not save session: {e}");
                }
            }
            Persist::Flush { json, done } => {
                let result = store.set(SNAPSHOT_KEY, &json).await;
                if let Err(e) = &result {
                    warn!("trainer: could not save session: {e}");
                }
                let _ = done.send(result);
            }
        }
    }
}
