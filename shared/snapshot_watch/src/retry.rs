use std::{fmt::Display, future::Future, time::Duration};

///
/// Awaits `open` until it succeeds, sleeping `retry_interval` between attempts.
///
/// Attempts are counted from 1. `on_attempt` runs before every attempt
/// and `on_error` gets every failure, so the caller decides how loud they are.
///
pub async fn retry<T, E, Open, Fut, OnAttempt, OnError>(
    retry_interval: Duration,
    on_attempt: OnAttempt,
    on_error: OnError,
    open: Open,
) -> T
where
    E: Display,
    Open: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    OnAttempt: Fn(u32),
    OnError: Fn(u32, E),
{
    let mut attempt: u32 = 0;

    loop {
        attempt = attempt.saturating_add(1);
        on_attempt(attempt);

        let err = match open().await {
            Ok(opened) => return opened,
            Err(err) => err,
        };
        on_error(attempt, err);

        tokio::time::sleep(retry_interval).await;
    }
}
