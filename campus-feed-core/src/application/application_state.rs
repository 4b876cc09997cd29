use super::ApplicationEnv;
use campus_feed_core::{
    repository::{MembershipsRepositoryImpl, NotificationsRepositoryImpl},
    service::{
        NotificationStore, NotificationStoreConfig, OptimisticCounter, ReadStateReconciler,
        ReadStateReconcilerConfig, StreamAggregator,
    },
};
use mongodb::{options::ClientOptions, Client};
use snapshot_watch::SnapshotWatchConfig;
use std::sync::Arc;
use tokio::{sync::Notify, task::JoinHandle};

#[derive(Clone)]
pub struct ApplicationState {
    pub notification_store: Arc<NotificationStore>,
    pub stream_aggregator: Arc<StreamAggregator>,
    pub optimistic_counter: Arc<OptimisticCounter>,
}

pub struct ApplicationStateToClose {
    pub db_client: Client,
    pub stream_aggregator: Arc<StreamAggregator>,
    pub read_state_reconciler_close_notify: Arc<Notify>,
    pub read_state_reconciler_handle: JoinHandle<()>,
}

pub async fn create_state(
    env: &ApplicationEnv,
) -> anyhow::Result<(ApplicationState, ApplicationStateToClose)> {
    tracing::info!("connecting to database");
    let db_client_options = ClientOptions::parse(&env.db_connection_string).await?;
    let db_client = Client::with_options(db_client_options)?;
    let db = db_client.database(&env.db_name);

    tracing::info!("creating repositories");
    let watch_config = SnapshotWatchConfig {
        retry_interval: env.watch_retry_interval,
    };
    let notifications_repository =
        NotificationsRepositoryImpl::new(db.clone(), watch_config).await?;
    let notifications_repository = Arc::new(notifications_repository);
    let memberships_repository = Arc::new(MembershipsRepositoryImpl::new(db));

    tracing::info!("creating services");
    let config = NotificationStoreConfig {
        max_notifications: env.max_notifications,
    };
    let notification_store = NotificationStore::new(config, notifications_repository.clone());
    let notification_store = Arc::new(notification_store);

    let stream_aggregator =
        StreamAggregator::new(notifications_repository, notification_store.clone());
    let stream_aggregator = Arc::new(stream_aggregator);

    let optimistic_counter = Arc::new(OptimisticCounter::new(memberships_repository));

    tracing::info!("starting read state reconciler");
    let config = ReadStateReconcilerConfig {
        interval: env.read_state_reconcile_interval,
    };
    let read_state_reconciler = ReadStateReconciler::new(config, notification_store.clone());
    let read_state_reconciler_close_notify = Arc::new(Notify::new());
    let read_state_reconciler_handle =
        tokio::spawn(read_state_reconciler.run(read_state_reconciler_close_notify.clone()));

    Ok((
        ApplicationState {
            notification_store,
            stream_aggregator: stream_aggregator.clone(),
            optimistic_counter,
        },
        ApplicationStateToClose {
            db_client,
            stream_aggregator,
            read_state_reconciler_close_notify,
            read_state_reconciler_handle,
        },
    ))
}
