//! Live scan driver
//!
//! Runs a [`ScanSession`] on a fixed cadence from a dedicated thread. All ticks
//! execute on that one thread, each under the session lock, so ticks never
//! overlap. `pause` and `stop` first suspend the cadence thread and wait for it
//! to acknowledge; once they return, no further tick can fire until the
//! session is resumed.
//!
//! Observers run on a separate notifier thread, fed in the order changes were
//! applied, so they are free to issue commands of their own.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle, ThreadId};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, never, select, tick, unbounded, Receiver, Sender};
use tracing::{debug, error};

use crate::session::{EngineState, ScanSession, ScanSnapshot};
use crate::stats::ScanStats;

type Observer = Arc<dyn Fn(&ScanSnapshot) + Send + Sync>;
type Observers = Arc<Mutex<Vec<Observer>>>;

enum Control {
    Resume,
    Suspend(Sender<()>),
    Shutdown,
}

enum Update {
    Changed(ScanSnapshot),
    Shutdown,
}

struct Shared {
    session: Mutex<ScanSession>,
    observers: Observers,
    updates: Sender<Update>,
}

impl Shared {
    fn session(&self) -> MutexGuard<'_, ScanSession> {
        lock(&self.session)
    }

    /// Run one tick; returns whether the cadence should keep going
    fn run_tick(&self) -> bool {
        let result = {
            let mut session = self.session();
            let result = session.tick();
            if !matches!(result, Ok(None)) {
                self.publish(&session);
            }
            result
        };

        match result {
            Ok(Some(_)) => true,
            Ok(None) => false,
            Err(e) => {
                error!(error = %e, "Cadence halted");
                false
            }
        }
    }

    /// Queue a snapshot for observers. Called with the session lock held so
    /// the notifier sees changes in the order they were applied.
    fn publish(&self, session: &ScanSession) {
        if !lock(&self.observers).is_empty() {
            let _ = self.updates.send(Update::Changed(session.snapshot()));
        }
    }

    fn publish_current(&self) {
        let session = self.session();
        self.publish(&session);
    }
}

/// Timer-driven scan engine with synchronous commands.
///
/// Observers registered with [`Scanner::on_change`] receive a fresh snapshot
/// after every tick and every command, on the scanner's notifier thread.
pub struct Scanner {
    shared: Arc<Shared>,
    control: Sender<Control>,
    commands: Mutex<()>,
    cadence: Option<JoinHandle<()>>,
    notifier: Option<JoinHandle<()>>,
    notifier_id: ThreadId,
}

impl Scanner {
    pub fn new(session: ScanSession) -> Self {
        let period = session.config().tick_period();
        let observers: Observers = Arc::new(Mutex::new(Vec::new()));
        let (updates, updates_rx) = unbounded();
        let shared = Arc::new(Shared {
            session: Mutex::new(session),
            observers: observers.clone(),
            updates,
        });
        let (control, control_rx) = unbounded();

        let cadence_shared = shared.clone();
        let cadence = thread::spawn(move || run_cadence(cadence_shared, control_rx, period));
        let notifier = thread::spawn(move || run_notifier(observers, updates_rx));
        let notifier_id = notifier.thread().id();

        Self {
            shared,
            control,
            commands: Mutex::new(()),
            cadence: Some(cadence),
            notifier: Some(notifier),
            notifier_id,
        }
    }

    /// Register an observer called with a fresh snapshot on every change
    pub fn on_change<F>(&self, observer: F)
    where
        F: Fn(&ScanSnapshot) + Send + Sync + 'static,
    {
        lock(&self.shared.observers).push(Arc::new(observer));
    }

    /// Enter or resume scanning
    pub fn start(&self) {
        let _guard = lock(&self.commands);
        let mut session = self.shared.session();
        if session.start().is_scanning() {
            let _ = self.control.send(Control::Resume);
        }
        self.shared.publish(&session);
    }

    /// Pause while scanning, resume while paused
    pub fn pause(&self) {
        let _guard = lock(&self.commands);
        self.suspend();
        let mut session = self.shared.session();
        if session.pause().is_scanning() {
            let _ = self.control.send(Control::Resume);
        }
        self.shared.publish(&session);
    }

    /// Halt the cadence, then reset the session to idle
    pub fn stop(&self) {
        let _guard = lock(&self.commands);
        self.suspend();
        self.shared.session().stop();
        self.shared.publish_current();
    }

    /// Copy of the current session state
    pub fn snapshot(&self) -> ScanSnapshot {
        self.shared.session().snapshot()
    }

    pub fn state(&self) -> EngineState {
        self.shared.session().state()
    }

    pub fn stats(&self) -> ScanStats {
        self.shared.session().stats()
    }

    /// Block until the cadence thread has dropped its timer
    fn suspend(&self) {
        let (ack_tx, ack_rx) = bounded(1);
        if self.control.send(Control::Suspend(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }
}

impl Drop for Scanner {
    fn drop(&mut self) {
        let _ = self.control.send(Control::Shutdown);
        if let Some(handle) = self.cadence.take() {
            let _ = handle.join();
        }
        let _ = self.shared.updates.send(Update::Shutdown);
        // An observer holding the last handle drops the scanner on the notifier itself
        if thread::current().id() != self.notifier_id {
            if let Some(handle) = self.notifier.take() {
                let _ = handle.join();
            }
        }
    }
}

fn run_cadence(shared: Arc<Shared>, control: Receiver<Control>, period: Duration) {
    let mut ticker: Option<Receiver<Instant>> = None;

    loop {
        let timer = ticker.clone().unwrap_or_else(never);
        select! {
            recv(control) -> msg => match msg {
                Ok(Control::Resume) => {
                    if ticker.is_none() {
                        debug!(?period, "Cadence resumed");
                        ticker = Some(tick(period));
                    }
                }
                Ok(Control::Suspend(ack)) => {
                    if ticker.take().is_some() {
                        debug!("Cadence suspended");
                    }
                    let _ = ack.send(());
                }
                Ok(Control::Shutdown) | Err(_) => break,
            },
            recv(timer) -> _ => {
                if !shared.run_tick() {
                    ticker = None;
                }
            }
        }
    }
}

fn run_notifier(observers: Observers, updates: Receiver<Update>) {
    for update in updates {
        let snapshot = match update {
            Update::Changed(snapshot) => snapshot,
            Update::Shutdown => break,
        };
        let current: Vec<Observer> = lock(&observers).clone();
        for observer in current {
            observer(&snapshot);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScanConfig;
    use crate::log_buffer::LogKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use seedscan_chains::all_chains;
    use seedscan_phrase::Vocabulary;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn scanner(probability: f64) -> Scanner {
        let config = ScanConfig {
            hit_probability: probability,
            tick_period_ms: 1,
            ..Default::default()
        };
        let session = ScanSession::with_rng(
            config,
            Vocabulary::english(),
            all_chains(),
            StdRng::seed_from_u64(21),
        )
        .unwrap();
        Scanner::new(session)
    }

    fn wait_for_ticks(scanner: &Scanner, count: u64) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while scanner.stats().checked < count {
            assert!(Instant::now() < deadline, "cadence produced no ticks");
            thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn test_idle_scanner_does_not_tick() {
        let scanner = scanner(1.0);
        thread::sleep(Duration::from_millis(30));
        assert_eq!(scanner.state(), EngineState::Idle);
        assert_eq!(scanner.stats().checked, 0);
    }

    #[test]
    fn test_start_drives_ticks() {
        let scanner = scanner(0.0);
        scanner.start();
        assert_eq!(scanner.state(), EngineState::Scanning);
        wait_for_ticks(&scanner, 5);

        let snapshot = scanner.snapshot();
        assert_eq!(snapshot.stats.found, 0);
        assert!(snapshot.logs.len() <= 31);
        assert!(snapshot.logs.iter().all(|l| l.kind == LogKind::Info));
    }

    #[test]
    fn test_pause_freezes_counters() {
        let scanner = scanner(1.0);
        scanner.start();
        wait_for_ticks(&scanner, 3);

        scanner.pause();
        assert_eq!(scanner.state(), EngineState::Paused);
        let frozen = scanner.snapshot();
        thread::sleep(Duration::from_millis(40));
        assert_eq!(scanner.snapshot(), frozen);
        assert_eq!(frozen.stats.found, frozen.hits.len() as u64);

        scanner.pause();
        assert_eq!(scanner.state(), EngineState::Scanning);
        wait_for_ticks(&scanner, frozen.stats.checked + 3);
    }

    #[test]
    fn test_stop_leaves_no_ghost_ticks() {
        let scanner = scanner(1.0);
        scanner.start();
        wait_for_ticks(&scanner, 3);

        scanner.stop();
        let snapshot = scanner.snapshot();
        assert_eq!(snapshot.state, EngineState::Idle);
        assert_eq!(snapshot.stats, ScanStats::default());
        assert!(snapshot.logs.is_empty());
        assert!(snapshot.hits.is_empty());

        thread::sleep(Duration::from_millis(40));
        assert_eq!(scanner.snapshot(), snapshot);
    }

    #[test]
    fn test_pause_then_stop() {
        let scanner = scanner(1.0);
        scanner.start();
        wait_for_ticks(&scanner, 2);
        scanner.pause();
        let paused = scanner.stats();
        assert_eq!(scanner.stats(), paused);
        scanner.stop();
        assert_eq!(scanner.stats(), ScanStats::default());
    }

    #[test]
    fn test_restart_after_stop() {
        let scanner = scanner(0.0);
        scanner.start();
        wait_for_ticks(&scanner, 2);
        scanner.stop();
        scanner.start();
        assert!(scanner.stats().is_started());
        wait_for_ticks(&scanner, 2);
    }

    #[test]
    fn test_observers_see_commands_and_ticks() {
        let scanner = scanner(0.0);
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        scanner.on_change(move |snapshot| {
            assert!(snapshot.logs.len() <= 31);
            seen.fetch_add(1, Ordering::SeqCst);
        });

        scanner.start();
        wait_for_ticks(&scanner, 3);
        scanner.stop();

        // one per command plus one per tick, delivered on the notifier thread
        let deadline = Instant::now() + Duration::from_secs(10);
        while calls.load(Ordering::SeqCst) < 5 {
            assert!(Instant::now() < deadline, "observer was not notified");
            thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn test_observer_can_pause_on_first_hit() {
        let scanner = Arc::new(scanner(1.0));
        let handle = Arc::downgrade(&scanner);
        let paused = Arc::new(AtomicBool::new(false));
        let (done_tx, done_rx) = bounded(1);

        let once = paused.clone();
        scanner.on_change(move |snapshot| {
            if snapshot.stats.found >= 1 && !once.swap(true, Ordering::SeqCst) {
                if let Some(scanner) = handle.upgrade() {
                    scanner.pause();
                    let _ = done_tx.send(scanner.state());
                }
            }
        });

        scanner.start();
        let state = done_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("pause issued from an observer did not return");
        assert_eq!(state, EngineState::Paused);

        let frozen = scanner.stats();
        thread::sleep(Duration::from_millis(30));
        assert_eq!(scanner.stats(), frozen);
        assert_eq!(scanner.state(), EngineState::Paused);

        scanner.stop();
        assert_eq!(scanner.stats(), ScanStats::default());
    }

    #[test]
    fn test_observer_can_stop() {
        let scanner = Arc::new(scanner(1.0));
        let handle = Arc::downgrade(&scanner);
        let (done_tx, done_rx) = bounded(1);

        scanner.on_change(move |snapshot| {
            if snapshot.stats.found >= 3 {
                if let Some(scanner) = handle.upgrade() {
                    scanner.stop();
                    let _ = done_tx.try_send(());
                }
            }
        });

        scanner.start();
        done_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("stop issued from an observer did not return");
        assert_eq!(scanner.state(), EngineState::Idle);
        assert_eq!(scanner.stats(), ScanStats::default());
    }

    #[test]
    fn test_drop_joins_cadence_thread() {
        let scanner = scanner(0.0);
        scanner.start();
        wait_for_ticks(&scanner, 1);
        drop(scanner);
    }
}
