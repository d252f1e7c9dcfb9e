use std::sync::{
    mpsc::{self, Receiver, Sender},
    Mutex,
};

use crate::{error::ResolveError, search::result::ResultSet};

/// One-way notification contract from a resolution run to its caller.
///
/// `on_progress` fires zero or more times with a fraction in 0.0..=1.0;
/// exactly one of `on_success` / `on_error` follows and terminates the
/// run. Implementations are called from the worker thread and must be
/// thread-safe.
pub trait ProgressCallback: Send + Sync {
    fn on_progress(&self, fraction: f64);

    fn on_success(&self, result: ResultSet);

    fn on_error(&self, error: &ResolveError);
}

/// Serializes and rate-limits progress emission. Fractions below the
/// last emitted value or advancing by less than 0.1% are dropped, so a
/// caller never observes progress moving backwards or a flooded
/// channel. `finish` pads the final emission to exactly 1.0.
pub struct ProgressEmitter<'a> {
    callback: &'a dyn ProgressCallback,
    last_emitted: Mutex<f64>,
}

impl<'a> ProgressEmitter<'a> {
    const MIN_STEP: f64 = 0.001;

    pub fn new(callback: &'a dyn ProgressCallback) -> ProgressEmitter<'a> {
        ProgressEmitter {
            callback,
            last_emitted: Mutex::new(0.0),
        }
    }

    pub fn emit(&self, fraction: f64) {
        let fraction = fraction.clamp(0.0, 1.0);

        let mut last_emitted = self.last_emitted.lock().unwrap();
        if fraction >= *last_emitted + Self::MIN_STEP {
            *last_emitted = fraction;
            self.callback.on_progress(fraction);
        }
    }

    pub fn finish(&self) {
        let mut last_emitted = self.last_emitted.lock().unwrap();
        if *last_emitted < 1.0 {
            *last_emitted = 1.0;
            self.callback.on_progress(1.0);
        }
    }
}

/// Tagged-union form of the callback contract, for callers that prefer
/// draining a channel over implementing the trait.
#[derive(Debug)]
pub enum RunEvent {
    Progress(f64),
    Success(ResultSet),
    Error(String),
}

/// Adapts `ProgressCallback` onto an mpsc channel. Send errors are
/// ignored; a dropped receiver just means nobody is listening anymore.
pub struct ChannelCallback {
    sender: Mutex<Sender<RunEvent>>,
}

impl ChannelCallback {
    pub fn new() -> (ChannelCallback, Receiver<RunEvent>) {
        let (sender, receiver) = mpsc::channel();
        let callback = ChannelCallback {
            sender: Mutex::new(sender),
        };

        (callback, receiver)
    }

    fn send(&self, event: RunEvent) {
        let _ = self.sender.lock().unwrap().send(event);
    }
}

impl ProgressCallback for ChannelCallback {
    fn on_progress(&self, fraction: f64) {
        self.send(RunEvent::Progress(fraction));
    }

    fn on_success(&self, result: ResultSet) {
        self.send(RunEvent::Success(result));
    }

    fn on_error(&self, error: &ResolveError) {
        self.send(RunEvent::Error(error.to_string()));
    }
}
