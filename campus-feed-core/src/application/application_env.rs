use anyhow::anyhow;
use campus_feed_core::{
    auth::Role,
    dto::{MembershipKind, SubjectRef, UserId},
};
use std::{str::FromStr, time::Duration};

pub struct ApplicationEnv {
    pub log_directory: String,
    pub log_filename: String,

    pub db_connection_string: String,
    pub db_name: String,

    pub user_id: UserId,
    pub user_role: Option<Role>,
    pub watched_subjects: Vec<SubjectRef>,

    pub max_notifications: usize,
    pub read_state_reconcile_interval: Duration,
    pub watch_retry_interval: Duration,
}

impl ApplicationEnv {
    pub fn parse() -> anyhow::Result<Self> {
        let log_directory = Self::env_var("CAMPUS_FEED_LOG_DIRECTORY")?;
        let log_filename = Self::env_var("CAMPUS_FEED_LOG_FILENAME")?;
        let db_connection_string = Self::env_var("CAMPUS_FEED_DB_CONNECTION_STRING")?;
        let db_name = Self::env_var("CAMPUS_FEED_DB_NAME")?;
        let user_id = UserId::new(Self::env_var("CAMPUS_FEED_USER_ID")?);
        if user_id.is_reserved() {
            return Err(anyhow!("CAMPUS_FEED_USER_ID can't be one of the scope markers"));
        }
        let user_role = match std::env::var("CAMPUS_FEED_USER_ROLE") {
            Ok(role) => Some(
                Role::from_str(&role)
                    .map_err(|_| anyhow!("CAMPUS_FEED_USER_ROLE has unknown role: {role}"))?,
            ),
            Err(_) => None,
        };
        let watched_subjects = match std::env::var("CAMPUS_FEED_WATCHED_SUBJECTS") {
            Ok(subjects) => Self::parse_subjects(&subjects)?,
            Err(_) => Vec::new(),
        };
        let max_notifications = Self::env_var("CAMPUS_FEED_MAX_NOTIFICATIONS")?.parse()?;
        let read_state_reconcile_interval =
            Self::env_var("CAMPUS_FEED_READ_STATE_RECONCILE_INTERVAL")?.parse()?;
        let read_state_reconcile_interval = Duration::from_secs(read_state_reconcile_interval);
        let watch_retry_interval = Self::env_var("CAMPUS_FEED_WATCH_RETRY_INTERVAL")?.parse()?;
        let watch_retry_interval = Duration::from_secs(watch_retry_interval);

        Ok(Self {
            log_directory,
            log_filename,
            db_connection_string,
            db_name,
            user_id,
            user_role,
            watched_subjects,
            max_notifications,
            read_state_reconcile_interval,
            watch_retry_interval,
        })
    }

    ///
    /// Parses comma separated `<kind>:<id>` pairs, e.g. `interest:event-1,like:post-7`
    ///
    fn parse_subjects(value: &str) -> anyhow::Result<Vec<SubjectRef>> {
        value
            .split(',')
            .map(str::trim)
            .filter(|subject| !subject.is_empty())
            .map(|subject| {
                let (kind, id) = subject
                    .split_once(':')
                    .ok_or_else(|| anyhow!("CAMPUS_FEED_WATCHED_SUBJECTS has invalid entry: {subject}"))?;
                let kind = MembershipKind::from_str(kind)
                    .map_err(|_| anyhow!("CAMPUS_FEED_WATCHED_SUBJECTS has unknown kind: {kind}"))?;

                Ok(SubjectRef {
                    kind,
                    id: id.to_string(),
                })
            })
            .collect()
    }

    fn env_var(name: &'static str) -> anyhow::Result<String> {
        std::env::var(name).map_err(|_| anyhow!("environment variable {name} not set"))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_subjects_of_both_kinds() {
        let subjects = ApplicationEnv::parse_subjects("interest:event-1, like:post-7,").unwrap();

        assert_eq!(
            subjects,
            vec![SubjectRef::event("event-1"), SubjectRef::post("post-7")]
        );
    }

    #[test]
    fn parse_subjects_unknown_kind() {
        let result = ApplicationEnv::parse_subjects("bookmark:post-7");

        assert!(result.is_err());
    }

    #[test]
    fn parse_subjects_missing_separator() {
        let result = ApplicationEnv::parse_subjects("event-1");

        assert!(result.is_err());
    }
}
