//! Announcer: turns of utterances → ranked voice chain → audio.
//!
//! ```text
//! announce(turn) → bump epoch, stop playback → [cmd_tx] → sequencer task
//!     → utterance 1: voices.speak(..).await
//!     → utterance 2: pause
//!     → utterance 3: voices.speak(..).await
//! ```
//!
//! Utterances of a turn run strictly in order, each waiting for the previous
//! to finish. A newer turn preempts the running one: `announce()` bumps an
//! [`AtomicU64`] epoch and cuts playback off synchronously, and the sequencer
//! drops the old turn's future as soon as the new command arrives. The epoch
//! check between utterances closes the gap where an interrupted clip resolves
//! before the sequencer has seen the new command.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{mpsc, watch};
use tracing::debug;

use spellcast_core::script::{Utterance, script};
use spellcast_core::types::{AnnouncerState, AnnouncerStatus, Cue, VoiceAvailability};

use crate::voice::VoiceChain;

/// Cloneable handle to the announcer. All methods are non-blocking.
#[derive(Clone)]
pub struct Announcer {
    cmd_tx: mpsc::UnboundedSender<Cmd>,
    status_rx: watch::Receiver<AnnouncerStatus>,
    epoch: Arc<AtomicU64>,
    voices: VoiceChain,
}

enum Cmd {
    Turn { utterances: Vec<Utterance>, epoch: u64 },
    Stop,
}

impl Announcer {
    /// Spawn the sequencer. Must be called inside a tokio runtime.
    pub fn new(voices: VoiceChain) -> Self {
        let epoch = Arc::new(AtomicU64::new(0));
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(AnnouncerStatus {
            state: AnnouncerState::Idle,
            turn: 0,
            last_voice: None,
        });

        let task_voices = voices.clone();
        let task_epoch = epoch.clone();
        tokio::spawn(async move {
            sequencer_task(cmd_rx, task_voices, task_epoch, status_tx).await;
        });

        Self {
            cmd_tx,
            status_rx,
            epoch,
            voices,
        }
    }

    /// Script `cues` and play them as one turn.
    pub fn announce_cues(&self, cues: &[Cue]) {
        let utterances = script(cues, &mut rand::rng());
        self.announce(utterances);
    }

    /// Play `utterances` as a new turn, cutting off the current one.
    /// An empty turn leaves whatever is playing alone.
    pub fn announce(&self, utterances: Vec<Utterance>) {
        if utterances.is_empty() {
            return;
        }
        let epoch = self.preempt();
        debug!("announcer: turn {epoch} with {} utterances", utterances.len());
        let _ = self.cmd_tx.send(Cmd::Turn { utterances, epoch });
    }

    /// Stop all speech immediately.
    pub fn stop(&self) {
        self.preempt();
        let _ = self.cmd_tx.send(Cmd::Stop);
    }

    pub fn status(&self) -> AnnouncerStatus {
        self.status_rx.borrow().clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<AnnouncerStatus> {
        self.status_rx.clone()
    }

    /// Whether the enhanced voice is in use.
    pub fn availability(&self) -> VoiceAvailability {
        self.voices.availability()
    }

    fn preempt(&self) -> u64 {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.voices.interrupt();
        epoch
    }
}

// ─── Sequencer ────────────────────────────────────────────────────────────

async fn sequencer_task(
    mut cmd_rx: mpsc::UnboundedReceiver<Cmd>,
    voices: VoiceChain,
    epoch: Arc<AtomicU64>,
    status_tx: watch::Sender<AnnouncerStatus>,
) {
    let mut next = cmd_rx.recv().await;

    while let Some(cmd) = next.take() {
        match cmd {
            Cmd::Stop => {
                update_status(&status_tx, |s| s.state = AnnouncerState::Idle);
                next = cmd_rx.recv().await;
            }

            Cmd::Turn { utterances, epoch: turn } => {
                if turn != epoch.load(Ordering::SeqCst) {
                    debug!("announcer: discarding stale turn {turn}");
                    next = cmd_rx.recv().await;
                    continue;
                }

                update_status(&status_tx, |s| {
                    s.state = AnnouncerState::Speaking;
                    s.turn = turn;
                });

                let preempted = tokio::select! {
                    biased;
                    cmd = cmd_rx.recv() => Some(cmd),
                    _ = run_turn(&voices, &utterances, turn, &epoch, &status_tx) => None,
                };

                next = match preempted {
                    Some(cmd) => {
                        debug!("announcer: turn {turn} preempted");
                        cmd
                    }
                    None => {
                        update_status(&status_tx, |s| {
                            if s.turn == turn {
                                s.state = AnnouncerState::Idle;
                            }
                        });
                        cmd_rx.recv().await
                    }
                };
            }
        }
    }
}

async fn run_turn(
    voices: &VoiceChain,
    utterances: &[Utterance],
    turn: u64,
    epoch: &AtomicU64,
    status_tx: &watch::Sender<AnnouncerStatus>,
) {
    for utterance in utterances {
        if epoch.load(Ordering::SeqCst) != turn {
            return;
        }
        match utterance {
            Utterance::Say(text) => {
                if let Some(voice) = voices.speak(text).await {
                    update_status(status_tx, |s| s.last_voice = Some(voice.to_string()));
                }
            }
            Utterance::Pause(gap) => tokio::time::sleep(*gap).await,
        }
    }
}

fn update_status(tx: &watch::Sender<AnnouncerStatus>, f: impl FnOnce(&mut AnnouncerStatus)) {
    tx.send_modify(f);
}
