//! Sender manager that coordinates sender workers and the progress monitor.
//!
//! The manager owns the message pool, the delivery statistics, and the lock
//! that guards both. `run()` spawns one task per sender plus the progress
//! monitor and resolves once every task has observed an empty pool.

use crate::config::SimulationConfig;
use futures::future::join_all;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sms_messages::Message;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use tracing::info;

/// Delivery statistics accumulated by the sender workers.
#[derive(Clone, Copy, Debug, Default)]
pub struct SendStats {
    /// Number of messages that were sent successfully.
    pub messages_sent: u64,

    /// Number of messages that failed to send.
    pub messages_failed: u64,

    /// Total simulated seconds spent on successful sends.
    pub total_send_time_secs: f64,
}

impl SendStats {
    /// Average simulated send time across successful sends, 0.0 when none.
    pub fn average_send_time_secs(&self) -> f64 {
        if self.messages_sent == 0 {
            0.0
        } else {
            self.total_send_time_secs / self.messages_sent as f64
        }
    }
}

/// Pool and statistics behind a single lock.
///
/// The check-and-pop on the pool and the matching stats update must be one
/// critical section, so both live under the same mutex.
struct SharedState {
    pool: Vec<Message>,
    stats: SendStats,
}

/// Coordinates sender workers and the progress monitor over one message pool.
pub struct SenderManager {
    avg_send_time: u64,
    avg_send_time_factor: u64,
    failure_rate: u8,
    num_senders: usize,
    refresh_rate: u64,
    initial_pool_size: usize,
    seed: u64,
    shared: Arc<Mutex<SharedState>>,
}

impl SenderManager {
    /// Create a new sender manager.
    ///
    /// All arguments are validated before any task is spawned:
    /// `avg_send_time` must be 2 or greater, `failure_rate` at most 100,
    /// `msg_pool` non-empty, `num_senders` and `refresh_rate` 1 or greater.
    pub fn new(
        avg_send_time: u64,
        avg_send_time_factor: u64,
        failure_rate: u8,
        msg_pool: Vec<Message>,
        num_senders: usize,
        refresh_rate: u64,
    ) -> Result<Self, SenderManagerError> {
        if avg_send_time < 2 {
            return Err(SenderManagerError::AverageSendTime(avg_send_time));
        }
        if failure_rate > 100 {
            return Err(SenderManagerError::FailureRate(failure_rate));
        }
        if msg_pool.is_empty() {
            return Err(SenderManagerError::EmptyPool);
        }
        if num_senders < 1 {
            return Err(SenderManagerError::NumSenders(num_senders));
        }
        if refresh_rate < 1 {
            return Err(SenderManagerError::RefreshRate(refresh_rate));
        }

        let initial_pool_size = msg_pool.len();

        Ok(Self {
            avg_send_time,
            avg_send_time_factor,
            failure_rate,
            num_senders,
            refresh_rate,
            initial_pool_size,
            seed: default_seed(),
            shared: Arc::new(Mutex::new(SharedState {
                pool: msg_pool,
                stats: SendStats::default(),
            })),
        })
    }

    /// Create a sender manager from a loaded configuration and message pool.
    pub fn from_config(
        config: &SimulationConfig,
        msg_pool: Vec<Message>,
    ) -> Result<Self, SenderManagerError> {
        Self::new(
            config.msg_sender.average_send_time,
            config.msg_sender.average_send_time_factor,
            config.msg_sender.failure_rate,
            msg_pool,
            config.msg_sender.num_senders,
            config.progress_monitor.refresh_rate,
        )
    }

    /// Pin the base RNG seed for a reproducible run.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Run the simulation to completion.
    ///
    /// Spawns `num_senders` worker tasks plus the progress monitor, all over
    /// the same pool/stats/lock, and returns only after every task has
    /// finished. No tasks outlive this call.
    pub async fn run(&self) -> SimulationReport {
        let start = Instant::now();

        info!(
            num_senders = self.num_senders,
            messages = self.initial_pool_size,
            avg_send_time_secs = self.avg_send_time,
            avg_send_time_factor_secs = self.avg_send_time_factor,
            failure_rate = self.failure_rate,
            refresh_rate_secs = self.refresh_rate,
            "Starting sender workers and progress monitor"
        );

        let mut handles = Vec::with_capacity(self.num_senders + 1);

        for worker_id in 0..self.num_senders {
            let worker = SenderWorker {
                shared: Arc::clone(&self.shared),
                avg_send_time: self.avg_send_time,
                avg_send_time_factor: self.avg_send_time_factor,
                success_rate: 1.0 - f64::from(self.failure_rate) / 100.0,
                rng: ChaCha8Rng::seed_from_u64(self.seed.wrapping_add(worker_id as u64)),
            };
            handles.push(tokio::spawn(worker.run()));
        }

        let monitor = ProgressMonitor {
            shared: Arc::clone(&self.shared),
            refresh_interval: Duration::from_secs(self.refresh_rate),
        };
        handles.push(tokio::spawn(monitor.run()));

        join_all(handles).await;

        let stats = self.shared.lock().await.stats;

        info!(
            messages_sent = stats.messages_sent,
            messages_failed = stats.messages_failed,
            "All messages drained"
        );

        SimulationReport {
            duration: start.elapsed(),
            messages_sent: stats.messages_sent,
            messages_failed: stats.messages_failed,
            average_send_time_secs: stats.average_send_time_secs(),
        }
    }

    /// Size of the pool before any message was claimed.
    pub fn initial_pool_size(&self) -> usize {
        self.initial_pool_size
    }

    /// Number of messages still waiting in the pool.
    pub async fn remaining(&self) -> usize {
        self.shared.lock().await.pool.len()
    }

    /// Snapshot of the current delivery statistics.
    pub async fn stats(&self) -> SendStats {
        self.shared.lock().await.stats
    }
}

/// Worker task that drains messages from the shared pool.
struct SenderWorker {
    shared: Arc<Mutex<SharedState>>,
    avg_send_time: u64,
    avg_send_time_factor: u64,
    success_rate: f64,
    rng: ChaCha8Rng,
}

impl SenderWorker {
    async fn run(mut self) {
        // Jitter never takes the delay below one second.
        let min_send_time = self
            .avg_send_time
            .saturating_sub(self.avg_send_time_factor)
            .max(1);
        let max_send_time = self.avg_send_time + self.avg_send_time_factor;

        loop {
            if self.shared.lock().await.pool.is_empty() {
                break;
            }

            // Delay and outcome are drawn before taking the lock so every
            // worker sleeps concurrently and the lock covers only the
            // pool and stats update.
            let send_time = self.rng.gen_range(min_send_time..=max_send_time);
            let sent = self.rng.gen_bool(self.success_rate);

            tokio::time::sleep(Duration::from_secs(send_time)).await;

            let mut shared = self.shared.lock().await;
            // The pool may have drained while this worker was sleeping.
            let Some(mut msg) = shared.pool.pop() else {
                break;
            };
            msg.send_time_secs = send_time;
            msg.sent = sent;

            info!(
                phone_number = %msg.phone_number,
                body = %msg.body,
                send_time_secs = msg.send_time_secs,
                sent = msg.sent,
                "Processed message"
            );

            if msg.sent {
                shared.stats.messages_sent += 1;
                shared.stats.total_send_time_secs += send_time as f64;
            } else {
                shared.stats.messages_failed += 1;
            }
        }
    }
}

/// Task that prints delivery statistics on a fixed cadence.
struct ProgressMonitor {
    shared: Arc<Mutex<SharedState>>,
    refresh_interval: Duration,
}

impl ProgressMonitor {
    async fn run(self) {
        loop {
            if self.shared.lock().await.pool.is_empty() {
                break;
            }

            tokio::time::sleep(self.refresh_interval).await;

            let stats = self.shared.lock().await.stats;
            println!("{}", progress_report(&stats));
        }
    }
}

/// Render the fixed-format progress block.
fn progress_report(stats: &SendStats) -> String {
    format!(
        "\nProgress Monitor\n\
         -------------------------------------------------------------\n\
         Messages Sent: {}\n\
         Average Message Send Time: {:.2}s\n\
         Messages Failed: {}\n\
         -------------------------------------------------------------",
        stats.messages_sent,
        stats.average_send_time_secs(),
        stats.messages_failed
    )
}

/// Base seed derived from the wall clock, varied per worker.
fn default_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}

/// Report generated after a simulation run.
pub struct SimulationReport {
    /// Wall-clock duration of the run.
    pub duration: Duration,

    /// Total messages sent successfully.
    pub messages_sent: u64,

    /// Total messages that failed to send.
    pub messages_failed: u64,

    /// Average simulated send time across successful sends.
    pub average_send_time_secs: f64,
}

impl SimulationReport {
    /// Print the report to stdout.
    pub fn print(&self) {
        println!("\n=== Simulation Report ===");
        println!("Duration: {:?}", self.duration);
        println!("Messages Sent: {}", self.messages_sent);
        println!("Messages Failed: {}", self.messages_failed);
        println!(
            "Average Message Send Time: {:.2}s",
            self.average_send_time_secs
        );
    }
}

/// Errors while constructing a sender manager.
#[derive(Debug, thiserror::Error)]
pub enum SenderManagerError {
    #[error("average_send_time cannot be {0}, must be 2 or greater")]
    AverageSendTime(u64),

    #[error("failure_rate cannot be {0}, must be in the range 0-100")]
    FailureRate(u8),

    #[error("msg_pool cannot be empty, must hold at least one message")]
    EmptyPool,

    #[error("num_senders cannot be {0}, must be 1 or greater")]
    NumSenders(usize),

    #[error("refresh_rate cannot be {0}, must be 1 or greater")]
    RefreshRate(u64),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha8Rng;

    fn test_pool(count: usize) -> Vec<Message> {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        sms_messages::generate_pool(count, &mut rng).unwrap()
    }

    #[test]
    fn test_rejects_bad_arguments() {
        let pool = test_pool(1);

        assert!(matches!(
            SenderManager::new(1, 0, 0, pool.clone(), 1, 1),
            Err(SenderManagerError::AverageSendTime(1))
        ));
        assert!(matches!(
            SenderManager::new(2, 0, 150, pool.clone(), 1, 1),
            Err(SenderManagerError::FailureRate(150))
        ));
        assert!(matches!(
            SenderManager::new(2, 0, 0, Vec::new(), 1, 1),
            Err(SenderManagerError::EmptyPool)
        ));
        assert!(matches!(
            SenderManager::new(2, 0, 0, pool.clone(), 0, 1),
            Err(SenderManagerError::NumSenders(0))
        ));
        assert!(matches!(
            SenderManager::new(2, 0, 0, pool, 1, 0),
            Err(SenderManagerError::RefreshRate(0))
        ));
    }

    #[test]
    fn test_accessors_before_run() {
        let manager = SenderManager::new(2, 0, 0, test_pool(10), 2, 1).unwrap();

        assert_eq!(manager.initial_pool_size(), 10);
        assert_eq!(tokio_test::block_on(manager.remaining()), 10);

        let stats = tokio_test::block_on(manager.stats());
        assert_eq!(stats.messages_sent, 0);
        assert_eq!(stats.messages_failed, 0);
        assert_eq!(stats.total_send_time_secs, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scenario_all_success() {
        // 50 messages, 5 senders, no jitter, no failures.
        let manager = SenderManager::new(2, 0, 0, test_pool(50), 5, 1)
            .unwrap()
            .with_seed(7);
        let report = manager.run().await;

        assert_eq!(report.messages_sent, 50);
        assert_eq!(report.messages_failed, 0);
        assert_eq!(manager.remaining().await, 0);
        // Without jitter every send takes exactly the average.
        assert_eq!(report.average_send_time_secs, 2.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_sends_fail() {
        let manager = SenderManager::new(2, 0, 100, test_pool(20), 4, 1)
            .unwrap()
            .with_seed(7);
        let report = manager.run().await;

        assert_eq!(report.messages_sent, 0);
        assert_eq!(report.messages_failed, 20);
        assert_eq!(report.average_send_time_secs, 0.0);

        let stats = manager.stats().await;
        assert_eq!(stats.total_send_time_secs, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_message_dropped_or_double_counted() {
        // Ten workers racing over a large pool with jitter and failures.
        let manager = SenderManager::new(3, 2, 37, test_pool(1000), 10, 5)
            .unwrap()
            .with_seed(1234);
        let report = manager.run().await;

        assert_eq!(manager.remaining().await, 0);
        assert_eq!(report.messages_sent + report.messages_failed, 1000);

        let stats = manager.stats().await;
        assert_eq!(stats.messages_sent + stats.messages_failed, 1000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_sender_drains_pool() {
        let manager = SenderManager::new(2, 1, 50, test_pool(5), 1, 1)
            .unwrap()
            .with_seed(3);
        let report = manager.run().await;

        assert_eq!(report.messages_sent + report.messages_failed, 5);
        assert_eq!(manager.remaining().await, 0);
    }

    #[test]
    fn test_progress_report_with_zero_sent() {
        let report = progress_report(&SendStats::default());

        assert!(report.contains("Progress Monitor"));
        assert!(report.contains("Messages Sent: 0"));
        assert!(report.contains("Average Message Send Time: 0.00s"));
        assert!(report.contains("Messages Failed: 0"));
    }

    #[test]
    fn test_average_send_time() {
        let stats = SendStats {
            messages_sent: 4,
            messages_failed: 1,
            total_send_time_secs: 10.0,
        };
        assert_eq!(stats.average_send_time_secs(), 2.5);
    }
}
