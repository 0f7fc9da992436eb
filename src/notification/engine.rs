use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};

use serde::Serialize;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::clock::Clock;
use crate::model::{Reminder, User};
use crate::repo::Repos;

use super::{due_notifications, DueNotification, Moment, NotificationEmitter, Notice, SentLedger};

/// How often the timer checks for due notifications, unless configured otherwise
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// Outcome of one check
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickReport {
    pub date: NaiveDate,
    #[serde(with = "crate::model::time_of_day")]
    pub time: NaiveTime,
    pub users_checked: usize,
    pub sent: usize,
    pub failed: usize,
    pub already_sent: usize,
    /// Set when the stores could not be read; nothing was sent
    pub error: Option<String>,
}

impl TickReport {
    fn new(now: Moment) -> Self {
        Self {
            date: now.date,
            time: now.time,
            users_checked: 0,
            sent: 0,
            failed: 0,
            already_sent: 0,
            error: None,
        }
    }
}

struct Inner {
    repos: Repos,
    emitter: Arc<dyn NotificationEmitter>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    ledger: SentLedger,
    /// Shutdown handle of the running timer task
    timer: Mutex<Option<mpsc::Sender<()>>>,
}

/// Periodically matches reminders against the clock and sends what is due, each
/// notification at most once.
///
/// Cloning is cheap and every clone drives the same timer and ledger.
#[derive(Clone)]
pub struct NotificationEngine {
    inner: Arc<Inner>,
}

impl NotificationEngine {
    pub fn new(repos: Repos, emitter: Arc<dyn NotificationEmitter>, clock: Arc<dyn Clock>) -> Self {
        Self::with_interval(repos, emitter, clock, DEFAULT_INTERVAL)
    }

    pub fn with_interval(
        repos: Repos,
        emitter: Arc<dyn NotificationEmitter>,
        clock: Arc<dyn Clock>,
        interval: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                repos,
                emitter,
                clock,
                interval,
                ledger: SentLedger::default(),
                timer: Mutex::new(None),
            }),
        }
    }

    fn timer(&self) -> MutexGuard<'_, Option<mpsc::Sender<()>>> {
        self.inner.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_running(&self) -> bool {
        self.timer().is_some()
    }

    /// Start the periodic timer with an immediate first check.
    /// Returns `false` if it was already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) -> bool {
        let mut timer = self.timer();
        if timer.is_some() {
            tracing::debug!("Notification engine already running");
            return false;
        }

        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);
        let engine = self.clone();
        tokio::spawn(async move {
            engine.run(&mut shutdown_rx).await;
        });
        *timer = Some(shutdown_tx);

        tracing::info!(
            interval_seconds = self.inner.interval.as_secs(),
            "Notification engine started"
        );
        true
    }

    /// Stop the periodic timer. A check already in progress runs to completion.
    /// Returns `false` if it was not running.
    pub fn stop(&self) -> bool {
        let Some(shutdown_tx) = self.timer().take() else {
            return false;
        };
        // A full channel or a finished task both mean the loop is on its way out
        let _ = shutdown_tx.try_send(());

        tracing::info!("Notification engine stopped");
        true
    }

    async fn run(&self, shutdown_rx: &mut mpsc::Receiver<()>) {
        let mut interval = tokio::time::interval(self.inner.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => break,
                _ = interval.tick() => {
                    self.tick().await;
                }
            }
        }

        tracing::debug!("Notification timer exited");
    }

    /// Run one check: evaluate every user against every reminder at the current minute and
    /// send whatever is due and not yet in the ledger.
    #[tracing::instrument(name = "Check for due notifications", skip(self))]
    pub async fn tick(&self) -> TickReport {
        let now = Moment::from(self.inner.clock.now());
        let mut report = TickReport::new(now);

        let pruned = self.inner.ledger.roll_over(now.date);
        if pruned > 0 {
            tracing::info!(pruned, date = %now.date, "Dropped notification records of past days");
        }

        let users = match self.inner.repos.users.find_all().await {
            Ok(users) => users,
            Err(e) => {
                tracing::error!(error.cause_chain = ?e, "Failed to load users");
                report.error = Some(e.to_string());
                return report;
            }
        };
        let reminders = match self.inner.repos.reminders.find_all().await {
            Ok(reminders) => reminders,
            Err(e) => {
                tracing::error!(error.cause_chain = ?e, "Failed to load reminders");
                report.error = Some(e.to_string());
                return report;
            }
        };

        for user in &users {
            report.users_checked += 1;
            for due in due_notifications(user, &reminders, now) {
                if self.inner.ledger.contains(&due.key) {
                    report.already_sent += 1;
                    continue;
                }

                let key = due.key;
                if self.dispatch(user, due).await {
                    self.inner.ledger.record(key);
                    report.sent += 1;
                } else {
                    tracing::warn!(%key, "Notification not delivered, will retry");
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            %now,
            users = report.users_checked,
            sent = report.sent,
            failed = report.failed,
            already_sent = report.already_sent,
            "Notification check finished"
        );
        report
    }

    async fn dispatch(&self, user: &User, due: DueNotification<'_>) -> bool {
        let emitter = &self.inner.emitter;
        match due.notice {
            Notice::Digest(reminders) => {
                let reminders: Vec<Reminder> = reminders.into_iter().cloned().collect();
                emitter.send_summary(&reminders, user).await
            }
            Notice::Exact(reminder) => emitter.send_exact(reminder, user).await,
            Notice::Advance { reminder, minutes } => {
                emitter.send_advance(reminder, user, minutes).await
            }
        }
    }

    /// Forget every delivered notification
    pub fn reset_sent_notifications(&self) {
        self.inner.ledger.clear();
        tracing::info!("Sent notification records cleared");
    }

    /// Keys of delivered notifications, oldest first
    pub fn sent_notifications(&self) -> Vec<String> {
        self.inner.ledger.keys()
    }
}
