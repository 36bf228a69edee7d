//! Timing behaviour of the session task, on a paused tokio clock

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::sync::mpsc::UnboundedReceiver;
use vidshell_session::{
    ContentId, MediaStatus, MemoryFileSystem, MemoryResumeStore, RecordingTransport,
    ResumeStore, SeekDirection, SessionController, SessionEvent, SessionHandle,
    SessionNotification, SessionRuntime, SessionSettings, SessionState, TransportCommand,
    TransportEvent,
};

type TestResult = Result<(), Box<dyn std::error::Error>>;

struct Running {
    handle: SessionHandle,
    notifications: UnboundedReceiver<SessionNotification>,
    transport: RecordingTransport,
    store: MemoryResumeStore,
    fs: MemoryFileSystem,
}

fn start() -> Running {
    let fs = MemoryFileSystem::new();
    fs.insert("/videos/a.mp4", 1_000, SystemTime::UNIX_EPOCH);
    fs.insert("/videos/b.mp4", 2_000, SystemTime::UNIX_EPOCH);
    let store = MemoryResumeStore::new();
    let transport = RecordingTransport::new();

    let controller = SessionController::new(
        SessionSettings::default(),
        Box::new(fs.clone()),
        Box::new(store.clone()),
        Box::new(transport.clone()),
    );
    let (handle, notifications) = SessionRuntime::spawn(controller);

    Running {
        handle,
        notifications,
        transport,
        store,
        fs,
    }
}

fn drain_notifications(
    notifications: &mut UnboundedReceiver<SessionNotification>,
) -> Vec<SessionNotification> {
    let mut received = Vec::new();
    while let Ok(notification) = notifications.try_recv() {
        received.push(notification);
    }
    received
}

impl Running {
    /// Loads the folder and opens the first item with a known duration
    async fn open_first(&mut self, duration_ms: i64) -> TestResult {
        self.handle
            .send(SessionEvent::LoadFolder(PathBuf::from("/videos")))?;
        self.handle.send(SessionEvent::ActivateItem(0))?;
        self.handle.send(SessionEvent::Transport(
            TransportEvent::DurationChanged(duration_ms),
        ))?;
        self.handle.send(SessionEvent::Transport(TransportEvent::StatusChanged(
            MediaStatus::Loaded,
        )))?;
        self.handle.snapshot().await?;
        self.transport.take();
        Ok(())
    }

    fn drain(&mut self) -> Vec<SessionNotification> {
        drain_notifications(&mut self.notifications)
    }

    fn set_positions(&self) -> Vec<i64> {
        self.transport
            .commands()
            .into_iter()
            .filter_map(|c| match c {
                TransportCommand::SetPosition(ms) => Some(ms),
                _ => None,
            })
            .collect()
    }
}

fn forward(down: bool) -> SessionEvent {
    if down {
        SessionEvent::KeyDown {
            direction: SeekDirection::Forward,
            auto_repeat: false,
        }
    } else {
        SessionEvent::KeyUp {
            direction: SeekDirection::Forward,
            auto_repeat: false,
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_hold_750ms_seeks_twice() -> TestResult {
    let mut session = start();
    session.open_first(600_000).await?;

    session.handle.send(forward(true))?;
    tokio::time::sleep(Duration::from_millis(750)).await;
    session.handle.send(forward(false))?;
    session.handle.snapshot().await?;

    // repeat ticks at 600 ms and 700 ms
    assert_eq!(session.set_positions(), vec![2_000, 4_000]);

    tokio::time::sleep(Duration::from_secs(1)).await;
    session.handle.snapshot().await?;
    assert_eq!(session.set_positions().len(), 2);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_tap_seeks_once() -> TestResult {
    let mut session = start();
    session.open_first(600_000).await?;

    session.handle.send(forward(true))?;
    tokio::time::sleep(Duration::from_millis(200)).await;
    session.handle.send(forward(false))?;

    // the cancelled arm timer must not start repeating later
    tokio::time::sleep(Duration::from_secs(2)).await;
    let snapshot = session.handle.snapshot().await?;

    assert_eq!(session.set_positions(), vec![15_000]);
    assert_eq!(snapshot.position_ms, 15_000);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_os_key_repeat_does_not_prevent_hold() -> TestResult {
    let mut session = start();
    session.open_first(600_000).await?;

    session.handle.send(forward(true))?;
    for _ in 0..10 {
        tokio::time::sleep(Duration::from_millis(50)).await;
        session.handle.send(SessionEvent::KeyDown {
            direction: SeekDirection::Forward,
            auto_repeat: true,
        })?;
    }
    // 500 ms elapsed: armed timer fires now, first tick at 600 ms
    tokio::time::sleep(Duration::from_millis(150)).await;
    session.handle.send(forward(false))?;
    session.handle.snapshot().await?;

    assert_eq!(session.set_positions(), vec![2_000]);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_resume_offer_times_out() -> TestResult {
    let mut session = start();
    let id = ContentId::compute(&session.fs, Path::new("/videos/a.mp4"))?;
    session.store.clone().put(&id, 90_000)?;

    session.open_first(600_000).await?;
    let offer_id = session
        .drain()
        .into_iter()
        .find_map(|n| match n {
            SessionNotification::ResumeOffered(prompt) => Some(prompt.offer_id),
            _ => None,
        })
        .ok_or("no resume offer")?;

    tokio::time::sleep(Duration::from_secs(9)).await;
    assert!(session.handle.snapshot().await?.resume_prompt.is_some());

    tokio::time::sleep(Duration::from_secs(2)).await;
    let snapshot = session.handle.snapshot().await?;

    assert!(snapshot.resume_prompt.is_none());
    assert!(session
        .drain()
        .contains(&SessionNotification::ResumeOfferClosed { offer_id }));
    assert!(session.set_positions().is_empty());
    assert_eq!(snapshot.state, SessionState::Playing);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_close_returns_controller_and_saves() -> TestResult {
    let mut session = start();
    session.open_first(600_000).await?;
    session
        .handle
        .send(SessionEvent::Transport(TransportEvent::PositionChanged(
            120_000,
        )))?;

    let controller = session.handle.close().await?;

    assert!(controller.is_closed());
    let id = ContentId::compute(&session.fs, Path::new("/videos/a.mp4"))?;
    assert_eq!(session.store.get(&id), Some(120_000));
    assert!(drain_notifications(&mut session.notifications).contains(&SessionNotification::Closed));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_dropping_handle_closes_session() -> TestResult {
    let Running {
        handle,
        mut notifications,
        ..
    } = start();
    drop(handle);

    let mut closed = false;
    while let Some(notification) = notifications.recv().await {
        closed |= notification == SessionNotification::Closed;
    }
    assert!(closed);
    Ok(())
}
