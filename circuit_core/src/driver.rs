//! Wall-clock driver for [`WorkoutTimer`].
//!
//! One background thread owns the engine. User commands reach it over a
//! channel and ticks are produced on the same thread, so a tick and a
//! command can never interleave. When a tick deadline and a command are
//! both due, the tick is applied first.
//!
//! While the timer is paused or completed the thread blocks without a
//! deadline: no tick is delivered until the timer is running again.

use crate::{Error, Result, TimerPhase, WorkoutTimer};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Operations a user can request while the timer is live
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerCommand {
    StartPause,
    Skip,
    CompleteCurrent,
    Shutdown,
}

/// Observable timer state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerSnapshot {
    pub phase: TimerPhase,
    pub index: usize,
    pub remaining_seconds: u32,
    pub running: bool,
}

impl TimerSnapshot {
    pub fn of(timer: &WorkoutTimer) -> Self {
        Self {
            phase: timer.phase(),
            index: timer.current_index(),
            remaining_seconds: timer.remaining_seconds(),
            running: timer.is_running(),
        }
    }
}

/// Emitted after every state change the driver applies
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerEvent {
    Ticked(TimerSnapshot),
    Applied(TimerCommand, TimerSnapshot),
}

impl TimerEvent {
    pub fn snapshot(&self) -> TimerSnapshot {
        match self {
            TimerEvent::Ticked(s) | TimerEvent::Applied(_, s) => *s,
        }
    }
}

/// Handle to a running timer thread
pub struct TimerDriver {
    commands: Sender<TimerCommand>,
    latest: Arc<Mutex<TimerSnapshot>>,
    handle: Option<JoinHandle<WorkoutTimer>>,
}

impl TimerDriver {
    /// Spawn the driver thread
    ///
    /// `period` is the length of one timer second (1s in production).
    /// `observer` runs on the driver thread after each tick or command.
    pub fn spawn<F>(timer: WorkoutTimer, period: Duration, observer: F) -> Result<Self>
    where
        F: FnMut(TimerEvent) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let latest = Arc::new(Mutex::new(TimerSnapshot::of(&timer)));
        let shared = Arc::clone(&latest);

        let handle = std::thread::Builder::new()
            .name("circuit-timer".into())
            .spawn(move || run_loop(timer, rx, period, shared, observer))?;

        tracing::debug!("Timer driver started with {:?} period", period);

        Ok(Self {
            commands: tx,
            latest,
            handle: Some(handle),
        })
    }

    pub fn start_pause(&self) {
        self.send(TimerCommand::StartPause);
    }

    pub fn skip(&self) {
        self.send(TimerCommand::Skip);
    }

    pub fn complete_current(&self) {
        self.send(TimerCommand::CompleteCurrent);
    }

    /// Most recent state published by the driver thread
    pub fn snapshot(&self) -> TimerSnapshot {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stop the thread and take the engine back (e.g. to call `finish`)
    pub fn shutdown(mut self) -> Result<WorkoutTimer> {
        self.send(TimerCommand::Shutdown);
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| Error::Other("timer thread panicked".into())),
            None => Err(Error::Other("timer driver already stopped".into())),
        }
    }

    fn send(&self, command: TimerCommand) {
        if self.commands.send(command).is_err() {
            tracing::debug!("Timer thread gone, dropping {:?}", command);
        }
    }
}

impl Drop for TimerDriver {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.commands.send(TimerCommand::Shutdown);
            let _ = handle.join();
        }
    }
}

fn run_loop<F>(
    mut timer: WorkoutTimer,
    commands: Receiver<TimerCommand>,
    period: Duration,
    latest: Arc<Mutex<TimerSnapshot>>,
    mut observer: F,
) -> WorkoutTimer
where
    F: FnMut(TimerEvent),
{
    let mut deadline: Option<Instant> = None;

    loop {
        let command = if timer.is_running() {
            let due = *deadline.get_or_insert_with(|| Instant::now() + period);
            let now = Instant::now();
            if now >= due {
                None
            } else {
                match commands.recv_timeout(due - now) {
                    Ok(command) => Some(command),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        } else {
            deadline = None;
            match commands.recv() {
                Ok(command) => Some(command),
                Err(_) => break,
            }
        };

        let event = match command {
            None => {
                timer.tick();
                deadline = if timer.is_running() {
                    deadline.map(|d| d + period)
                } else {
                    None
                };
                TimerEvent::Ticked(TimerSnapshot::of(&timer))
            }
            Some(TimerCommand::Shutdown) => break,
            Some(command) => {
                match command {
                    TimerCommand::StartPause => timer.start_pause(),
                    TimerCommand::Skip => timer.skip(),
                    TimerCommand::CompleteCurrent => timer.complete_current(),
                    TimerCommand::Shutdown => {}
                }
                // A fresh phase (or a resume) gets a full second before its first tick
                deadline = timer.is_running().then(|| Instant::now() + period);
                TimerEvent::Applied(command, TimerSnapshot::of(&timer))
            }
        };

        *latest.lock().unwrap_or_else(PoisonError::into_inner) = event.snapshot();
        observer(event);
    }

    tracing::debug!("Timer driver stopped");
    timer
}
