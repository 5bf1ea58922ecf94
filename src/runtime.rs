use std::cell::Cell;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};
use tracing::debug;

/// Default frame interval, roughly 30 frames per second
pub const FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// What the runner hands the app on each step
#[derive(Clone, Debug)]
pub enum WheelEvent {
    Key(KeyEvent),
    Resize,
    /// Time to advance animations and redraw
    Frame,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait WheelEventSource: Send {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<WheelEvent, RecvTimeoutError>;
}

/// Event source backed by a channel. In production a reader thread feeds it
/// from crossterm; tests push events into the sender directly.
pub struct ChannelEventSource {
    rx: Receiver<WheelEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<WheelEvent>) -> Self {
        Self { rx }
    }

    pub fn crossterm() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let forwarded = match event::read() {
                // key release events are reported on some platforms
                Ok(CtEvent::Key(key)) if key.kind != KeyEventKind::Release => {
                    tx.send(WheelEvent::Key(key))
                }
                Ok(CtEvent::Resize(_, _)) => tx.send(WheelEvent::Resize),
                Ok(_) => Ok(()),
                Err(e) => {
                    debug!(error = %e, "terminal input closed");
                    break;
                }
            };
            if forwarded.is_err() {
                break;
            }
        });

        Self::new(rx)
    }
}

impl WheelEventSource for ChannelEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<WheelEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Time since the session started. Everything that animates reads this.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall clock anchored at construction
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, to: Duration) {
        self.now.set(to);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Interleaves input with frames on a fixed schedule. Pending input is
/// always delivered first; a frame is emitted once the deadline passes with
/// the queue empty, so held keys cannot stall an animation.
pub struct Runner<E: WheelEventSource, C: Clock> {
    source: E,
    clock: C,
    interval: Duration,
    next_frame: Cell<Duration>,
}

impl<E: WheelEventSource, C: Clock> Runner<E, C> {
    pub fn new(source: E, clock: C) -> Self {
        Self::with_interval(source, clock, FRAME_INTERVAL)
    }

    pub fn with_interval(source: E, clock: C, interval: Duration) -> Self {
        let next_frame = Cell::new(clock.now());
        Self {
            source,
            clock,
            interval,
            next_frame,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Next event and the time it should be handled at
    pub fn step(&self) -> (WheelEvent, Duration) {
        let due = self.next_frame.get();
        let wait = due.saturating_sub(self.clock.now());

        match self.source.recv_timeout(wait) {
            Ok(ev) => (ev, self.clock.now()),
            Err(e) => {
                if e == RecvTimeoutError::Disconnected {
                    std::thread::sleep(wait);
                }
                let now = self.clock.now();
                self.next_frame.set(due.max(now) + self.interval);
                (WheelEvent::Frame, now)
            }
        }
    }
}
