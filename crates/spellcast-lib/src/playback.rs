//! Audio output: one OS thread owns the output device.
//!
//! rodio's `OutputStream` is `!Send`, so playback lives on a dedicated thread
//! and is driven over a std channel. Each `play()` hands over an encoded clip
//! (mp3 or wav) and resolves once the clip has finished, been replaced, or
//! been stopped. At most one clip plays at a time: a new clip stops the old.

use std::io::Cursor;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tokio::sync::oneshot;
use tracing::{debug, error};

use crate::voice::SpeechError;

/// How often the thread checks whether the sink drained.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

type Done = oneshot::Sender<Result<(), SpeechError>>;

enum PlayCmd {
    Play { audio: Vec<u8>, done: Done },
    Stop,
}

/// Cloneable handle to the playback thread.
#[derive(Clone)]
pub struct AudioOut {
    cmd_tx: mpsc::Sender<PlayCmd>,
}

impl AudioOut {
    /// Spawn the playback thread. If the thread or the device cannot be
    /// opened, every `play()` fails with [`SpeechError::NoAudioOutput`].
    pub fn spawn() -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<PlayCmd>();
        if let Err(e) = std::thread::Builder::new()
            .name("spellcast-playback".into())
            .spawn(move || playback_thread(cmd_rx))
        {
            error!("playback: failed to spawn thread: {e}");
        }
        Self { cmd_tx }
    }

    /// Play an encoded clip and wait for it to end.
    pub async fn play(&self, audio: Vec<u8>) -> Result<(), SpeechError> {
        let (done, rx) = oneshot::channel();
        self.cmd_tx
            .send(PlayCmd::Play { audio, done })
            .map_err(|_| SpeechError::NoAudioOutput)?;
        rx.await.unwrap_or(Err(SpeechError::NoAudioOutput))
    }

    /// Cut the current clip off immediately.
    pub fn stop(&self) {
        let _ = self.cmd_tx.send(PlayCmd::Stop);
    }
}

fn playback_thread(cmd_rx: mpsc::Receiver<PlayCmd>) {
    let (_stream, stream_handle) = match OutputStream::try_default() {
        Ok(pair) => pair,
        Err(e) => {
            error!("playback: failed to open audio output: {e}");
            reject_all(cmd_rx);
            return;
        }
    };

    let Some(mut sink) = new_sink(&stream_handle) else {
        reject_all(cmd_rx);
        return;
    };
    let mut pending: Option<Done> = None;

    loop {
        match cmd_rx.recv_timeout(POLL_INTERVAL) {
            Ok(PlayCmd::Play { audio, done }) => {
                if let Some(prev) = pending.take() {
                    debug!("playback: replacing unfinished clip");
                    let _ = prev.send(Err(SpeechError::Interrupted));
                    sink.stop();
                    match new_sink(&stream_handle) {
                        Some(s) => sink = s,
                        None => break,
                    }
                }
                match Decoder::new(Cursor::new(audio)) {
                    Ok(source) => {
                        sink.append(source);
                        pending = Some(done);
                    }
                    Err(e) => {
                        let _ = done.send(Err(SpeechError::Decode(e.to_string())));
                    }
                }
            }
            Ok(PlayCmd::Stop) => {
                sink.stop();
                match new_sink(&stream_handle) {
                    Some(s) => sink = s,
                    None => break,
                }
                if let Some(prev) = pending.take() {
                    let _ = prev.send(Err(SpeechError::Interrupted));
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                sink.stop();
                break;
            }
        }

        if sink.empty() {
            if let Some(done) = pending.take() {
                let _ = done.send(Ok(()));
            }
        }
    }

    if let Some(done) = pending.take() {
        let _ = done.send(Err(SpeechError::NoAudioOutput));
    }
}

fn new_sink(handle: &OutputStreamHandle) -> Option<Sink> {
    match Sink::try_new(handle) {
        Ok(sink) => Some(sink),
        Err(e) => {
            error!("playback: failed to create sink: {e}");
            None
        }
    }
}

/// No device: fail every request so the voice chain falls through.
fn reject_all(cmd_rx: mpsc::Receiver<PlayCmd>) {
    for cmd in cmd_rx {
        if let PlayCmd::Play { done, .. } = cmd {
            let _ = done.send(Err(SpeechError::NoAudioOutput));
        }
    }
}
