//! Single-owner async host for a [`SessionController`]
//!
//! One tokio task owns the controller. Events, snapshot requests and timer firings all reach it
//! through channels, so they are handled strictly one after another. Timers are spawned tasks
//! that report back tagged with a sequence number; a firing whose number no longer matches the
//! live timer of its kind (cancelled or restarted meanwhile) is dropped.

use crate::controller::{
    SessionController, SessionEvent, SessionNotification, SessionOutput, SessionSnapshot,
    TimerKind, TimerRequest,
};
use crate::error::RuntimeError;
use log::{debug, info};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

enum Command {
    Event(SessionEvent),
    Snapshot(oneshot::Sender<SessionSnapshot>),
}

struct RunningTimer {
    seq: u64,
    repeating: bool,
    task: JoinHandle<()>,
}

/// Spawns session tasks
pub struct SessionRuntime;

impl SessionRuntime {
    /// Moves `controller` into a new task
    ///
    /// Returns the handle used to drive it and the stream of notifications it produces.
    pub fn spawn(
        controller: SessionController,
    ) -> (SessionHandle, mpsc::UnboundedReceiver<SessionNotification>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (notify_tx, notify_rx) = mpsc::unbounded_channel();
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();

        let actor = SessionActor {
            controller,
            notifications: notify_tx,
            fired_tx,
            timers: HashMap::new(),
            next_seq: 0,
        };
        let task = tokio::spawn(actor.run(command_rx, fired_rx));

        (
            SessionHandle {
                commands: command_tx,
                task,
            },
            notify_rx,
        )
    }
}

/// Handle to a running session
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
    task: JoinHandle<SessionController>,
}

impl SessionHandle {
    /// Queues an event for the session
    pub fn send(&self, event: SessionEvent) -> Result<(), RuntimeError> {
        self.commands
            .send(Command::Event(event))
            .map_err(|_| RuntimeError::Stopped)
    }

    /// Captures the session state after every event queued before this call
    pub async fn snapshot(&self) -> Result<SessionSnapshot, RuntimeError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(Command::Snapshot(reply_tx))
            .map_err(|_| RuntimeError::Stopped)?;
        reply_rx.await.map_err(|_| RuntimeError::Stopped)
    }

    /// Closes the session and waits for its task, returning the controller
    pub async fn close(self) -> Result<SessionController, RuntimeError> {
        // already stopped if this fails; the join below still returns the controller
        let _ = self.commands.send(Command::Event(SessionEvent::Close));
        drop(self.commands);
        Ok(self.task.await?)
    }
}

struct SessionActor {
    controller: SessionController,
    notifications: mpsc::UnboundedSender<SessionNotification>,
    fired_tx: mpsc::UnboundedSender<(TimerKind, u64)>,
    timers: HashMap<TimerKind, RunningTimer>,
    next_seq: u64,
}

impl SessionActor {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut fired: mpsc::UnboundedReceiver<(TimerKind, u64)>,
    ) -> SessionController {
        info!("Session task started");

        while !self.controller.is_closed() {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Event(event)) => self.dispatch(event),
                    Some(Command::Snapshot(reply)) => {
                        let _ = reply.send(self.controller.snapshot());
                    }
                    None => {
                        debug!("All session handles dropped, closing");
                        self.dispatch(SessionEvent::Close);
                    }
                },
                Some((kind, seq)) = fired.recv() => self.on_fired(kind, seq),
            }
        }

        for (_, timer) in self.timers.drain() {
            timer.task.abort();
        }
        info!("Session task finished");
        self.controller
    }

    fn dispatch(&mut self, event: SessionEvent) {
        for output in self.controller.handle(event) {
            match output {
                SessionOutput::Notify(notification) => {
                    // nobody listening is fine
                    let _ = self.notifications.send(notification);
                }
                SessionOutput::Timer(request) => self.apply_timer(request),
            }
        }
    }

    fn on_fired(&mut self, kind: TimerKind, seq: u64) {
        let live = match self.timers.get(&kind) {
            Some(timer) if timer.seq == seq => timer.repeating,
            _ => {
                debug!("Dropping stale {:?} timer #{}", kind, seq);
                return;
            }
        };

        if !live {
            self.timers.remove(&kind);
        }
        self.dispatch(SessionEvent::TimerFired(kind));
    }

    fn apply_timer(&mut self, request: TimerRequest) {
        match request {
            TimerRequest::Start {
                kind,
                after,
                repeating,
            } => {
                self.cancel(kind);
                self.next_seq += 1;
                let seq = self.next_seq;
                let task = tokio::spawn(timer_task(
                    kind,
                    seq,
                    after,
                    repeating,
                    self.fired_tx.clone(),
                ));
                self.timers.insert(
                    kind,
                    RunningTimer {
                        seq,
                        repeating,
                        task,
                    },
                );
            }
            TimerRequest::Cancel(kind) => self.cancel(kind),
        }
    }

    fn cancel(&mut self, kind: TimerKind) {
        if let Some(timer) = self.timers.remove(&kind) {
            timer.task.abort();
        }
    }
}

async fn timer_task(
    kind: TimerKind,
    seq: u64,
    after: Duration,
    repeating: bool,
    fired: mpsc::UnboundedSender<(TimerKind, u64)>,
) {
    if !repeating {
        tokio::time::sleep(after).await;
        let _ = fired.send((kind, seq));
        return;
    }

    let mut interval = tokio::time::interval_at(Instant::now() + after, after);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        if fired.send((kind, seq)).is_err() {
            break;
        }
    }
}
