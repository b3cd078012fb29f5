use std::{future::Future, time::Duration};

///
/// Run async function until it returns Ok, returns non retryable error
/// or `max_attempts` is reached.
///
/// Sleeps `retry_interval * attempt` between attempts.
/// Use only with operations that can be safely repeated.
///
pub async fn retry<RetryableF, ErrF, F, Fut, T, E>(
    max_attempts: u8,
    retry_interval: Duration,
    is_retryable_fn: RetryableF,
    error_log_fn: ErrF,
    async_fn: F,
) -> Result<T, E>
where
    RetryableF: Fn(&E) -> bool,
    ErrF: Fn(u8, &E),
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        let err = match async_fn().await {
            Ok(output) => return Ok(output),
            Err(err) => err,
        };

        error_log_fn(attempt, &err);
        if attempt >= max_attempts || !is_retryable_fn(&err) {
            return Err(err);
        }

        tokio::time::sleep(retry_interval * u32::from(attempt)).await;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::atomic::{AtomicU8, Ordering};

    #[tokio::test(start_paused = true)]
    async fn retry_succeeds_after_failures() {
        let calls = AtomicU8::new(0);

        let result = retry(
            3,
            Duration::from_secs(1),
            |_: &&str| true,
            |_, _| {},
            || async {
                match calls.fetch_add(1, Ordering::SeqCst) {
                    0 | 1 => Err("unavailable"),
                    _ => Ok(7),
                }
            },
        )
        .await;

        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_gives_up_after_max_attempts() {
        let calls = AtomicU8::new(0);

        let result: Result<(), &str> = retry(
            2,
            Duration::from_secs(1),
            |_: &&str| true,
            |_, _| {},
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("unavailable")
            },
        )
        .await;

        assert_eq!(result, Err("unavailable"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_stops_on_non_retryable() {
        let calls = AtomicU8::new(0);

        let result: Result<(), &str> = retry(
            5,
            Duration::from_secs(1),
            |err: &&str| *err != "not found",
            |_, _| {},
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("not found")
            },
        )
        .await;

        assert_eq!(result, Err("not found"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
