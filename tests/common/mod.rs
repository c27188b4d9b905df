//! scripted terminal & app helpers shared by the integration tests
#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

use wanderer::build_app;
use wanderer::config::SimConfig;
use wanderer::terminal::{Key, TerminalIo, TerminalSession};

pub const TICK: Duration = Duration::from_millis(100);

#[derive(Default)]
pub struct Transcript {
    /// one batch per poll; an empty queue polls as "no keys"
    pub pending: VecDeque<Vec<Key>>,
    pub frames: Vec<Vec<String>>,
    current: Vec<String>,
    pub enabled: u32,
    pub disabled: u32,
    /// make `disable_raw_input` report an error
    pub fail_restore: bool,
}

/// terminal whose input is scripted and whose output is recorded
#[derive(Clone, Default)]
pub struct ScriptedTerminal {
    inner: Arc<Mutex<Transcript>>,
}

impl ScriptedTerminal {
    pub fn new() -> Self {
        Self::default()
    }

    /// queue one poll's worth of characters
    pub fn push_keys(&self, keys: &str) {
        self.transcript()
            .pending
            .push_back(keys.chars().map(Key::Char).collect());
    }

    pub fn transcript(&self) -> MutexGuard<'_, Transcript> {
        self.inner.lock().unwrap()
    }
}

impl TerminalIo for ScriptedTerminal {
    fn enable_raw_input(&mut self) -> io::Result<()> {
        self.transcript().enabled += 1;
        Ok(())
    }

    fn disable_raw_input(&mut self) -> io::Result<()> {
        let mut t = self.transcript();
        t.disabled += 1;
        if t.fail_restore {
            return Err(io::Error::new(io::ErrorKind::Other, "tty went away"));
        }
        Ok(())
    }

    fn poll_pending_keys(&mut self) -> io::Result<Vec<Key>> {
        Ok(self.transcript().pending.pop_front().unwrap_or_default())
    }

    fn clear_screen(&mut self) -> io::Result<()> {
        self.transcript().current.clear();
        Ok(())
    }

    fn write_line(&mut self, text: &str) -> io::Result<()> {
        self.transcript().current.push(text.to_owned());
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut t = self.transcript();
        let frame = std::mem::take(&mut t.current);
        t.frames.push(frame);
        Ok(())
    }
}

/// quiet config: no spawns unless a test asks for them
pub fn test_config() -> SimConfig {
    SimConfig {
        seed: 42,
        frequency: 0.05,
        spawn_interval: 1000.0..=1000.0,
        ..default()
    }
}

/// app with a fixed 100 ms step and a scripted terminal
pub fn test_app(config: SimConfig) -> (App, ScriptedTerminal) {
    let terminal = ScriptedTerminal::new();
    let session = TerminalSession::acquire(terminal.clone()).expect("scripted terminal");
    let mut app = build_app(config, session);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(TICK));
    (app, terminal)
}
