//! terminal I/O seam & the raw‑mode session that owns it
//!
//! Everything the simulation needs from the terminal goes through
//! [`TerminalIo`]; the real implementation is crossterm, tests script it.

use std::io::{self, Stdout, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use bevy::prelude::*;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute, queue,
    style::Print,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing::{error, info};

use crate::render::Frame;

/// a key event as the simulation sees it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Char(char),
    /// Ctrl‑C / Esc; raw mode turns SIGINT into a keystroke
    Interrupt,
}

pub trait TerminalIo: Send + Sync {
    fn enable_raw_input(&mut self) -> io::Result<()>;
    fn disable_raw_input(&mut self) -> io::Result<()>;
    /// never blocks; returns whatever arrived since the last call
    fn poll_pending_keys(&mut self) -> io::Result<Vec<Key>>;
    fn clear_screen(&mut self) -> io::Result<()>;
    fn write_line(&mut self, text: &str) -> io::Result<()>;
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/* ===========================================================
   crossterm backend
   =========================================================== */
pub struct CrosstermTerminal {
    out: Stdout,
}

impl CrosstermTerminal {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for CrosstermTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalIo for CrosstermTerminal {
    fn enable_raw_input(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        if let Err(err) = execute!(self.out, EnterAlternateScreen, cursor::Hide) {
            terminal::disable_raw_mode().ok();
            return Err(err);
        }
        Ok(())
    }

    fn disable_raw_input(&mut self) -> io::Result<()> {
        let raw = terminal::disable_raw_mode();
        execute!(self.out, cursor::Show, LeaveAlternateScreen)?;
        raw
    }

    fn poll_pending_keys(&mut self) -> io::Result<Vec<Key>> {
        let mut keys = Vec::new();
        while event::poll(Duration::ZERO)? {
            let Event::Key(k) = event::read()? else { continue };
            if k.kind == KeyEventKind::Release {
                continue;
            }
            match k.code {
                KeyCode::Char('c') if k.modifiers.contains(KeyModifiers::CONTROL) => {
                    keys.push(Key::Interrupt)
                }
                KeyCode::Char(c) => keys.push(Key::Char(c)),
                KeyCode::Esc => keys.push(Key::Interrupt),
                _ => {}
            }
        }
        Ok(keys)
    }

    fn clear_screen(&mut self) -> io::Result<()> {
        queue!(self.out, Clear(ClearType::All), cursor::MoveTo(0, 0))
    }

    fn write_line(&mut self, text: &str) -> io::Result<()> {
        // raw mode: no implicit carriage return
        queue!(self.out, Print(text), Print("\r\n"))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/* ===========================================================
   termination signals
   =========================================================== */
#[cfg(unix)]
const TERMINATION_SIGNALS: &[i32] = &[
    signal_hook::consts::SIGTERM,
    signal_hook::consts::SIGHUP,
    signal_hook::consts::SIGQUIT,
];
#[cfg(not(unix))]
const TERMINATION_SIGNALS: &[i32] = &[signal_hook::consts::SIGTERM];

/// Raised by SIGTERM / SIGHUP / SIGQUIT once [`TerminationFlag::install`]
/// has run; the input system treats it like the interrupt key.
#[derive(Resource, Clone, Debug, Default)]
pub struct TerminationFlag(Arc<AtomicBool>);

impl TerminationFlag {
    pub fn install() -> Result<Self> {
        let flag = Self::default();
        for &signal in TERMINATION_SIGNALS {
            signal_hook::flag::register(signal, Arc::clone(&flag.0))
                .with_context(|| format!("failed to watch signal {signal}"))?;
        }
        Ok(flag)
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/* ===========================================================
   session resource
   =========================================================== */

/// Owned raw‑mode session.
///
/// Raw input is enabled by [`TerminalSession::acquire`] and disabled exactly
/// once. The run loop calls [`TerminalSession::release`] and reports its
/// error; drop is the fallback for a panic unwinding through the app.
#[derive(Resource)]
pub struct TerminalSession {
    io: Box<dyn TerminalIo>,
    raw: bool,
}

impl TerminalSession {
    pub fn acquire(io: impl TerminalIo + 'static) -> Result<Self> {
        let mut io: Box<dyn TerminalIo> = Box::new(io);
        io.enable_raw_input()
            .context("failed to put terminal into raw mode")?;
        info!(target: "wanderer::terminal", "raw input enabled");
        Ok(Self { io, raw: true })
    }

    pub fn poll_keys(&mut self) -> io::Result<Vec<Key>> {
        self.io.poll_pending_keys()
    }

    /// full‑screen clear, then every row and the status line
    pub fn present(&mut self, frame: &Frame) -> io::Result<()> {
        self.io.clear_screen()?;
        for row in &frame.rows {
            self.io.write_line(row)?;
        }
        self.io.write_line(&frame.status)?;
        self.io.flush()
    }

    pub fn is_raw(&self) -> bool {
        self.raw
    }

    /// restore the terminal; later calls are no‑ops
    pub fn release(&mut self) -> Result<()> {
        if !self.raw {
            return Ok(());
        }
        self.raw = false;
        self.io
            .disable_raw_input()
            .context("failed to restore terminal mode")?;
        info!(target: "wanderer::terminal", "raw input disabled");
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if let Err(err) = self.release() {
            error!(target: "wanderer::terminal", ?err, "terminal left in raw mode");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Counts {
        enabled: u32,
        disabled: u32,
        lines: Vec<String>,
        clears: u32,
    }

    struct CountingIo {
        counts: Arc<Mutex<Counts>>,
        fail_enable: bool,
        fail_disable: bool,
    }

    impl TerminalIo for CountingIo {
        fn enable_raw_input(&mut self) -> io::Result<()> {
            if self.fail_enable {
                return Err(io::Error::new(io::ErrorKind::Other, "not a tty"));
            }
            self.counts.lock().unwrap().enabled += 1;
            Ok(())
        }
        fn disable_raw_input(&mut self) -> io::Result<()> {
            self.counts.lock().unwrap().disabled += 1;
            if self.fail_disable {
                return Err(io::Error::new(io::ErrorKind::Other, "tty went away"));
            }
            Ok(())
        }
        fn poll_pending_keys(&mut self) -> io::Result<Vec<Key>> {
            Ok(Vec::new())
        }
        fn clear_screen(&mut self) -> io::Result<()> {
            self.counts.lock().unwrap().clears += 1;
            Ok(())
        }
        fn write_line(&mut self, text: &str) -> io::Result<()> {
            self.counts.lock().unwrap().lines.push(text.to_owned());
            Ok(())
        }
    }

    fn counting_io(fail_enable: bool) -> (CountingIo, Arc<Mutex<Counts>>) {
        let counts = Arc::new(Mutex::new(Counts::default()));
        let io = CountingIo {
            counts: counts.clone(),
            fail_enable,
            fail_disable: false,
        };
        (io, counts)
    }

    #[test]
    fn drop_restores_exactly_once() {
        let (io, counts) = counting_io(false);
        let mut session = TerminalSession::acquire(io).unwrap();
        assert!(session.is_raw());
        session.release().unwrap();
        session.release().unwrap();
        drop(session);

        let counts = counts.lock().unwrap();
        assert_eq!((counts.enabled, counts.disabled), (1, 1));
    }

    #[test]
    fn drop_alone_restores() {
        let (io, counts) = counting_io(false);
        drop(TerminalSession::acquire(io).unwrap());
        assert_eq!(counts.lock().unwrap().disabled, 1);
    }

    #[test]
    fn failed_enable_is_reported_and_never_restored() {
        let (io, counts) = counting_io(true);
        let err = TerminalSession::acquire(io).err().expect("acquire should fail");
        assert!(format!("{err:#}").contains("not a tty"));
        assert_eq!(counts.lock().unwrap().disabled, 0);
    }

    #[test]
    fn failed_restore_is_reported_once() {
        let (mut io, counts) = counting_io(false);
        io.fail_disable = true;
        let mut session = TerminalSession::acquire(io).unwrap();

        let err = session.release().unwrap_err();
        assert!(format!("{err:#}").contains("tty went away"));
        // neither a second release nor drop retries
        session.release().unwrap();
        drop(session);
        assert_eq!(counts.lock().unwrap().disabled, 1);
    }

    #[test]
    fn termination_flag_starts_lowered() {
        let flag = TerminationFlag::default();
        let shared = flag.clone();
        assert!(!flag.is_raised());
        shared.raise();
        assert!(flag.is_raised());
    }

    #[cfg(unix)]
    #[test]
    fn hangup_raises_installed_flag() {
        let flag = TerminationFlag::install().unwrap();
        signal_hook::low_level::raise(signal_hook::consts::SIGHUP).unwrap();
        assert!(flag.is_raised());
    }

    #[test]
    fn present_clears_then_writes_rows_and_status() {
        let (io, counts) = counting_io(false);
        let mut session = TerminalSession::acquire(io).unwrap();
        let frame = Frame {
            rows: vec!["ab".into(), "cd".into()],
            status: "status".into(),
        };
        session.present(&frame).unwrap();

        let counts = counts.lock().unwrap();
        assert_eq!(counts.clears, 1);
        assert_eq!(counts.lines, ["ab", "cd", "status"]);
    }
}
