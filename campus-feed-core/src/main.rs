mod application;

use application::ApplicationEnv;
use campus_feed_core::dto::MembershipKey;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    #[cfg(debug_assertions)]
    {
        // Ignore error because .env file is not required
        // as long as env variables are set
        let _ = dotenvy::dotenv();
    }

    let env = ApplicationEnv::parse()?;

    application::setup_tracing(&env)?;

    let (state, state_to_close) = application::create_state(&env).await?;

    let mut feed_rx = state.notification_store.subscribe();
    state
        .stream_aggregator
        .subscribe(&env.user_id, env.user_role)
        .await;

    let watched_keys = env
        .watched_subjects
        .iter()
        .map(|subject| MembershipKey::new(subject.clone(), env.user_id.clone()))
        .collect::<Vec<_>>();
    for key in watched_keys.iter() {
        match state.optimistic_counter.status(key).await {
            Ok(status) => tracing::info!(
                kind = key.subject.kind.as_ref(),
                subject = %key.subject.id,
                is_member = status.is_member,
                count = status.count,
                "membership status"
            ),
            Err(err) => tracing::warn!(
                kind = key.subject.kind.as_ref(),
                subject = %key.subject.id,
                %err,
                "membership status unavailable"
            ),
        }
    }

    tokio::select! {
        _ = application::shutdown_signal() => {},
        _ = async {
            while feed_rx.changed().await.is_ok() {
                let feed = Arc::clone(&feed_rx.borrow_and_update());
                tracing::info!(
                    count = feed.notifications.len(),
                    unread_count = feed.unread_count,
                    "feed updated"
                );
            }
        } => {}
    }

    for key in watched_keys.iter() {
        state.optimistic_counter.release(key).await;
    }
    application::close(state_to_close).await;

    Ok(())
}
