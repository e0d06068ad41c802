// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The per-animation emission loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::command::Command;
use crate::error::SendError;
use crate::protocol::DeviceCommandSink;

use super::AnimationKey;
use super::config::RunnerConfig;
use super::recipe::{Outcome, Recipe};
use super::step::{Action, Deferred, Step};

/// Summary of a finished animation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    /// Whether the recipe ran to completion.
    pub outcome: Outcome,
    /// Commands the sink accepted, settle commands included.
    pub sent: usize,
    /// Commands that failed or timed out.
    pub failed: usize,
}

impl RunReport {
    fn record(&mut self, ok: bool) {
        if ok {
            self.sent += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// Sends one command through `sink`, bounded by `timeout`.
pub(crate) async fn send_bounded<C: Command + ?Sized>(
    sink: &dyn DeviceCommandSink,
    timeout: Duration,
    target: &str,
    command: &C,
) -> Result<(), SendError> {
    let name = command.name();
    let value = command.wire_payload();
    match tokio::time::timeout(timeout, sink.send(target, &name, &value)).await {
        Ok(result) => result,
        Err(_) => Err(SendError::Timeout(
            u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        )),
    }
}

/// Drives one recipe against a sink until it completes or is cancelled.
///
/// The runner checks the cancellation token before every action and races
/// every hold against it, so a stop takes effect within one step. Send
/// failures are logged and counted; they never abort the sequence. Whatever
/// the outcome, the recipe's settle commands are sent last.
pub struct AnimationRunner {
    key: AnimationKey,
    sink: Arc<dyn DeviceCommandSink>,
    cancel: CancellationToken,
    config: RunnerConfig,
}

impl AnimationRunner {
    /// Creates a runner for the animation called `key`.
    #[must_use]
    pub fn new(
        key: AnimationKey,
        sink: Arc<dyn DeviceCommandSink>,
        cancel: CancellationToken,
        config: RunnerConfig,
    ) -> Self {
        Self {
            key,
            sink,
            cancel,
            config,
        }
    }

    /// Runs `recipe` to the end.
    pub async fn run(self, mut recipe: Box<dyn Recipe>) -> RunReport {
        let mut report = RunReport {
            outcome: Outcome::Completed,
            sent: 0,
            failed: 0,
        };
        let mut children: JoinSet<Option<bool>> = JoinSet::new();

        tracing::debug!(key = %self.key, recipe = recipe.name(), "Animation loop started");

        loop {
            if self.cancel.is_cancelled() {
                report.outcome = Outcome::Cancelled;
                break;
            }
            let Some(action) = recipe.next_action() else {
                break;
            };
            let hold = action.hold();
            match action {
                Action::Send(step) => {
                    let ok = self.emit(&step.target, &step.command).await;
                    report.record(ok);
                }
                Action::Defer(deferred) => self.schedule(&mut children, deferred),
            }
            if !self.hold(hold).await {
                report.outcome = Outcome::Cancelled;
                break;
            }
        }

        match report.outcome {
            Outcome::Completed => {
                while let Some(joined) = children.join_next().await {
                    if let Ok(Some(ok)) = joined {
                        report.record(ok);
                    }
                }
                if self.cancel.is_cancelled() {
                    report.outcome = Outcome::Cancelled;
                }
            }
            Outcome::Cancelled => children.shutdown().await,
        }

        self.settle(recipe.settle(report.outcome), &mut report).await;

        tracing::debug!(
            key = %self.key,
            outcome = ?report.outcome,
            sent = report.sent,
            failed = report.failed,
            "Animation loop finished"
        );
        report
    }

    async fn emit(&self, target: &str, command: &impl Command) -> bool {
        match send_bounded(self.sink.as_ref(), self.config.send_timeout, target, command).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    key = %self.key,
                    target,
                    command = %command.name(),
                    error = %e,
                    "Animation step failed"
                );
                false
            }
        }
    }

    /// Waits for `hold`, returning `false` if cancelled first.
    async fn hold(&self, hold: Duration) -> bool {
        if hold.is_zero() {
            return !self.cancel.is_cancelled();
        }
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => false,
            () = tokio::time::sleep(hold) => true,
        }
    }

    fn schedule(&self, children: &mut JoinSet<Option<bool>>, deferred: Deferred) {
        let token = self.cancel.child_token();
        let sink = Arc::clone(&self.sink);
        let key = self.key.clone();
        let timeout = self.config.send_timeout;

        children.spawn(async move {
            tokio::select! {
                biased;
                () = token.cancelled() => None,
                () = tokio::time::sleep(deferred.delay) => {
                    let result =
                        send_bounded(sink.as_ref(), timeout, &deferred.target, &deferred.command)
                            .await;
                    if let Err(e) = &result {
                        tracing::warn!(
                            key = %key,
                            target = %deferred.target,
                            error = %e,
                            "Deferred animation step failed"
                        );
                    }
                    Some(result.is_ok())
                }
            }
        });
    }

    async fn settle(&self, steps: Vec<Step>, report: &mut RunReport) {
        if !steps.is_empty() {
            tracing::trace!(key = %self.key, count = steps.len(), "Settling animation targets");
        }
        for step in steps {
            let ok = self.emit(&step.target, &step.command).await;
            report.record(ok);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use tokio::time::Instant;

    use super::*;
    use crate::animation::recipe::{Cycled, Pulse, Wave};

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<(String, String, String, Instant)>>,
        fail_target: Option<String>,
        stall: bool,
    }

    #[async_trait]
    impl DeviceCommandSink for Recorder {
        async fn send(&self, target: &str, command: &str, value: &str) -> Result<(), SendError> {
            if self.stall {
                std::future::pending::<()>().await;
            }
            if self.fail_target.as_deref() == Some(target) {
                return Err(SendError::Rejected("offline".to_string()));
            }
            self.sent.lock().push((
                target.to_string(),
                command.to_string(),
                value.to_string(),
                Instant::now(),
            ));
            Ok(())
        }
    }

    fn runner(sink: &Arc<Recorder>, cancel: CancellationToken) -> AnimationRunner {
        AnimationRunner::new(
            AnimationKey::new("test"),
            Arc::clone(sink) as Arc<dyn DeviceCommandSink>,
            cancel,
            RunnerConfig::default(),
        )
    }

    fn pulse(cycles: u32) -> Box<dyn Recipe> {
        Box::new(Cycled::new(Pulse {
            target: "T".to_string(),
            cycles,
            interval_ms: 100,
        }))
    }

    #[tokio::test(start_paused = true)]
    async fn completed_run_sends_everything_then_settles() {
        let sink = Arc::new(Recorder::default());
        let report = runner(&sink, CancellationToken::new()).run(pulse(3)).await;

        assert_eq!(report.outcome, Outcome::Completed);
        assert_eq!(report.sent, 7);
        let values: Vec<_> = sink.sent.lock().iter().map(|s| s.2.clone()).collect();
        assert_eq!(values, ["ON", "OFF", "ON", "OFF", "ON", "OFF", "ON"]);
    }

    #[tokio::test(start_paused = true)]
    async fn holds_separate_sends() {
        let sink = Arc::new(Recorder::default());
        runner(&sink, CancellationToken::new()).run(pulse(2)).await;

        let sent = sink.sent.lock();
        assert!(sent[1].3 - sent[0].3 >= Duration::from_millis(50));
        assert!(sent[2].3 - sent[0].3 >= Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_hold_and_still_settles() {
        let sink = Arc::new(Recorder::default());
        let cancel = CancellationToken::new();
        let task = tokio::spawn(runner(&sink, cancel.clone()).run(pulse(100)));

        tokio::time::sleep(Duration::from_millis(120)).await;
        cancel.cancel();
        let report = task.await.unwrap();

        assert_eq!(report.outcome, Outcome::Cancelled);
        let sent = sink.sent.lock();
        assert!(sent.len() < 10);
        let last = sent.last().unwrap();
        assert_eq!((last.1.as_str(), last.2.as_str()), ("Power", "ON"));
    }

    #[tokio::test(start_paused = true)]
    async fn failures_are_counted_not_fatal() {
        let sink = Arc::new(Recorder {
            fail_target: Some("T".to_string()),
            ..Recorder::default()
        });
        let report = runner(&sink, CancellationToken::new()).run(pulse(2)).await;

        assert_eq!(report.outcome, Outcome::Completed);
        assert_eq!(report.failed, 5);
        assert_eq!(report.sent, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_sink_times_out() {
        let sink = Arc::new(Recorder {
            stall: true,
            ..Recorder::default()
        });
        let runner = AnimationRunner::new(
            AnimationKey::new("stall"),
            Arc::clone(&sink) as Arc<dyn DeviceCommandSink>,
            CancellationToken::new(),
            RunnerConfig::default().with_send_timeout(Duration::from_millis(10)),
        );
        let report = runner.run(pulse(1)).await;
        assert_eq!(report.failed, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn wave_waits_for_deferred_offs() {
        let sink = Arc::new(Recorder::default());
        let wave = Box::new(Cycled::new(Wave {
            targets: vec!["A".to_string(), "B".to_string()],
            delay_ms: 100,
            on_duration_ms: 500,
        }));
        let report = runner(&sink, CancellationToken::new()).run(wave).await;

        assert_eq!(report.sent, 4);
        let sent = sink.sent.lock();
        let order: Vec<_> = sent.iter().map(|s| format!("{} {}", s.0, s.2)).collect();
        assert_eq!(order, ["A ON", "B ON", "A OFF", "B OFF"]);
        assert!(sent[2].3 - sent[0].3 >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_wave_drops_pending_offs() {
        let sink = Arc::new(Recorder::default());
        let cancel = CancellationToken::new();
        let wave = Box::new(Cycled::new(Wave {
            targets: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            delay_ms: 100,
            on_duration_ms: 1000,
        }));
        let task = tokio::spawn(runner(&sink, cancel.clone()).run(wave));

        tokio::time::sleep(Duration::from_millis(150)).await;
        cancel.cancel();
        let report = task.await.unwrap();

        assert_eq!(report.outcome, Outcome::Cancelled);
        tokio::time::sleep(Duration::from_secs(2)).await;
        let sent = sink.sent.lock();
        assert!(sent.iter().all(|s| s.2 == "ON"));
        assert_eq!(sent.len(), 2);
    }
}
