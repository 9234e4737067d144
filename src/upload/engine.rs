//! The retry/backoff loop driving a resumable transfer.

use rand::Rng;

use crate::error::{Error, Result};
use crate::upload::request::VideoId;
use crate::upload::retry::RetryPolicy;
use crate::upload::transport::{ChunkOutcome, ResumableTransfer};

/// Mutable state threaded through one upload's retry loop.
///
/// Lives only for the duration of the loop; nothing is persisted, so a
/// process crash mid-upload restarts the whole transfer on the next run.
#[derive(Debug, Default)]
pub struct UploadSession {
    pub bytes_acknowledged: u64,
    pub retry_count: u32,
    pub last_error: Option<String>,
}

/// Drives a `ResumableTransfer` to completion, retrying transient failures
/// with exponential backoff and full jitter.
pub struct UploadEngine {
    policy: RetryPolicy,
}

impl UploadEngine {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Run the transfer until terminal success or failure.
    ///
    /// Returns the uploaded video's id on success. Fails with
    /// `Error::Upload` on a non-retriable remote error,
    /// `Error::UnexpectedResponse` if the final response carries no id, and
    /// `Error::RetriesExhausted` once the retry budget is spent.
    pub async fn run<T, R>(&self, transfer: &mut T, rng: &mut R) -> Result<VideoId>
    where
        T: ResumableTransfer + Send,
        R: Rng,
    {
        let mut session = UploadSession::default();

        loop {
            tracing::info!("Uploading file...");

            match transfer.advance().await {
                Ok(ChunkOutcome::Done(body)) => {
                    return match body.get("id").and_then(|v| v.as_str()) {
                        Some(id) => {
                            tracing::info!("Video id '{}' was successfully uploaded", id);
                            Ok(VideoId(id.to_string()))
                        }
                        None => Err(Error::UnexpectedResponse(body.to_string())),
                    };
                }
                Ok(ChunkOutcome::Progress { bytes_acknowledged }) => {
                    session.bytes_acknowledged = bytes_acknowledged;
                }
                Err(error) => {
                    let decision =
                        self.policy
                            .decide(&error, session.retry_count + 1, rng);
                    if !decision.retriable {
                        return Err(Error::Upload(error.to_string()));
                    }

                    tracing::error!("A retriable error occurred: {}", error);
                    session.last_error = Some(error.to_string());
                    session.retry_count += 1;

                    if session.retry_count > self.policy.max_retries {
                        return Err(Error::RetriesExhausted {
                            attempts: session.retry_count,
                            last_error: session.last_error.clone().unwrap_or_default(),
                        });
                    }

                    tracing::info!(
                        "Sleeping {:.3} seconds and then retrying...",
                        decision.delay.as_secs_f64()
                    );
                    tokio::time::sleep(decision.delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::retry::AttemptError;

    use std::collections::VecDeque;

    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;
    use tokio::time::Instant;

    /// Transfer that replays a scripted sequence of outcomes.
    struct ScriptedTransfer {
        steps: VecDeque<std::result::Result<ChunkOutcome, AttemptError>>,
        calls: u32,
    }

    impl ScriptedTransfer {
        fn new(
            steps: Vec<std::result::Result<ChunkOutcome, AttemptError>>,
        ) -> Self {
            Self {
                steps: steps.into(),
                calls: 0,
            }
        }
    }

    #[async_trait]
    impl ResumableTransfer for ScriptedTransfer {
        async fn advance(&mut self) -> std::result::Result<ChunkOutcome, AttemptError> {
            self.calls += 1;
            self.steps
                .pop_front()
                .expect("transfer advanced past end of script")
        }
    }

    /// Transfer that fails the same way forever.
    struct AlwaysFailing(u16);

    #[async_trait]
    impl ResumableTransfer for AlwaysFailing {
        async fn advance(&mut self) -> std::result::Result<ChunkOutcome, AttemptError> {
            Err(AttemptError::Status {
                status: self.0,
                body: "backend unavailable".into(),
            })
        }
    }

    fn engine() -> UploadEngine {
        UploadEngine::new(RetryPolicy::default())
    }

    #[tokio::test]
    async fn test_success_returns_video_id() {
        let mut transfer = ScriptedTransfer::new(vec![
            Ok(ChunkOutcome::Progress {
                bytes_acknowledged: 0,
            }),
            Ok(ChunkOutcome::Done(json!({"id": "dQw4w9WgXcQ"}))),
        ]);
        let mut rng = StdRng::seed_from_u64(1);

        let id = engine().run(&mut transfer, &mut rng).await.unwrap();
        assert_eq!(id, VideoId("dQw4w9WgXcQ".to_string()));
        assert_eq!(transfer.calls, 2);
    }

    #[tokio::test]
    async fn test_response_without_id_is_fatal_not_retried() {
        let mut transfer = ScriptedTransfer::new(vec![Ok(ChunkOutcome::Done(
            json!({"kind": "youtube#video"}),
        ))]);
        let mut rng = StdRng::seed_from_u64(1);

        let err = engine().run(&mut transfer, &mut rng).await.unwrap_err();
        assert!(matches!(err, Error::UnexpectedResponse(_)));
        assert!(err.is_fatal());
        assert_eq!(transfer.calls, 1);
    }

    #[tokio::test]
    async fn test_non_retriable_status_propagates_immediately() {
        let mut transfer = ScriptedTransfer::new(vec![Err(AttemptError::Status {
            status: 403,
            body: "quota exceeded".into(),
        })]);
        let mut rng = StdRng::seed_from_u64(1);

        let err = engine().run(&mut transfer, &mut rng).await.unwrap_err();
        assert!(matches!(err, Error::Upload(_)));
        assert_eq!(transfer.calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_then_succeeds_with_bounded_sleeps() {
        let mut transfer = ScriptedTransfer::new(vec![
            Err(AttemptError::Status {
                status: 503,
                body: String::new(),
            }),
            Err(AttemptError::Status {
                status: 503,
                body: String::new(),
            }),
            Ok(ChunkOutcome::Done(json!({"id": "abc123"}))),
        ]);

        // Same seed twice: one rng drives the engine, the other reproduces
        // the expected jittered delays.
        let policy = RetryPolicy::default();
        let mut expected_rng = StdRng::seed_from_u64(99);
        let fail = AttemptError::Status {
            status: 503,
            body: String::new(),
        };
        let first = policy.decide(&fail, 1, &mut expected_rng).delay;
        let second = policy.decide(&fail, 2, &mut expected_rng).delay;
        assert!(first.as_secs_f64() < 2.0);
        assert!(second.as_secs_f64() < 4.0);

        let mut rng = StdRng::seed_from_u64(99);
        let start = Instant::now();
        let id = engine().run(&mut transfer, &mut rng).await.unwrap();

        assert_eq!(id, VideoId("abc123".to_string()));
        // Timer granularity is 1ms, so allow a little slack above the sum.
        let elapsed = start.elapsed();
        assert!(elapsed >= first + second);
        assert!(elapsed < first + second + std::time::Duration::from_millis(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_budget_exhausted() {
        let mut transfer = AlwaysFailing(500);
        let mut rng = StdRng::seed_from_u64(5);

        let err = engine().run(&mut transfer, &mut rng).await.unwrap_err();
        match err {
            Error::RetriesExhausted {
                attempts,
                last_error,
            } => {
                assert_eq!(attempts, 11);
                assert!(last_error.contains("500"));
            }
            other => panic!("expected RetriesExhausted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transport_faults_are_retried() {
        let mut transfer = ScriptedTransfer::new(vec![
            Err(AttemptError::Transport("connection reset by peer".into())),
            Ok(ChunkOutcome::Done(json!({"id": "xyz"}))),
        ]);
        let mut rng = StdRng::seed_from_u64(3);

        let id = engine().run(&mut transfer, &mut rng).await.unwrap();
        assert_eq!(id, VideoId("xyz".to_string()));
        assert_eq!(transfer.calls, 2);
    }

    #[tokio::test]
    async fn test_progress_does_not_consume_retries() {
        let mut steps: Vec<std::result::Result<ChunkOutcome, AttemptError>> = (0..20)
            .map(|i| {
                Ok(ChunkOutcome::Progress {
                    bytes_acknowledged: i * 1024,
                })
            })
            .collect();
        steps.push(Ok(ChunkOutcome::Done(json!({"id": "slow-but-steady"}))));

        let mut transfer = ScriptedTransfer::new(steps);
        let mut rng = StdRng::seed_from_u64(8);

        let id = engine().run(&mut transfer, &mut rng).await.unwrap();
        assert_eq!(id, VideoId("slow-but-steady".to_string()));
    }
}
