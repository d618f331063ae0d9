#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use spellcast_lib::voice::{SpeechError, SpeechProvider, VoiceChain};

/// Provider that records what it was asked to say.
///
/// `hold` makes it block on one phrase until `stop()` is called, standing in
/// for a clip that is still playing.
pub struct Recorder {
    name: &'static str,
    events: Mutex<Vec<String>>,
    hold: Option<String>,
    delay: Duration,
    fail: bool,
    release: Notify,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Self::build("recorder", None, Duration::ZERO, false)
    }

    pub fn holding(phrase: &str) -> Arc<Self> {
        Self::build("recorder", Some(phrase.to_string()), Duration::ZERO, false)
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Self::build("recorder", None, delay, false)
    }

    pub fn failing(name: &'static str) -> Arc<Self> {
        Self::build(name, None, Duration::ZERO, true)
    }

    fn build(name: &'static str, hold: Option<String>, delay: Duration, fail: bool) -> Arc<Self> {
        Arc::new(Self {
            name,
            events: Mutex::new(Vec::new()),
            hold,
            delay,
            fail,
            release: Notify::new(),
        })
    }

    /// Phrases this provider started saying, in order.
    pub fn said(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| e.strip_prefix("start:").map(str::to_string))
            .collect()
    }

    /// Raw start/end log.
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn log(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl SpeechProvider for Recorder {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        if self.fail {
            return Err(SpeechError::Service {
                status: 503,
                body: "unavailable".into(),
            });
        }
        let released = self.release.notified();
        self.log(format!("start:{text}"));
        if self.hold.as_deref() == Some(text) {
            released.await;
            self.log(format!("cut:{text}"));
            return Err(SpeechError::Interrupted);
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.log(format!("end:{text}"));
        Ok(())
    }

    fn stop(&self) {
        self.release.notify_waiters();
    }
}

pub fn chain(providers: Vec<Arc<Recorder>>) -> VoiceChain {
    VoiceChain::new(
        providers
            .into_iter()
            .map(|p| p as Arc<dyn SpeechProvider>)
            .collect(),
    )
}

/// Poll `check` until it holds, failing the test after a few seconds.
pub async fn eventually(mut check: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
