use anyhow::anyhow;
use std::time::Duration;
use uuid::Uuid;

pub struct ApplicationEnv {
    pub log_directory: String,
    pub log_filename: String,

    pub db_connection_string: String,
    pub db_name: String,

    pub request_timeout: Duration,
    pub load_retry_max_count: u8,
    pub load_retry_interval: Duration,
    pub resort_interval: Duration,
    pub push_buffer_size: usize,

    /// Appended to sign-in identifiers that are bare index numbers
    pub email_domain: String,

    pub session: Option<SessionEnv>,
}

///
/// Identity the binary signs in with right after start
///
pub struct SessionEnv {
    pub user_id: Uuid,
    pub identifier: String,
}

impl ApplicationEnv {
    pub fn parse() -> anyhow::Result<Self> {
        let log_directory = Self::env_var("PORTAL_NOTIFIER_LOG_DIRECTORY")?;
        let log_filename = Self::env_var("PORTAL_NOTIFIER_LOG_FILENAME")?;
        let db_connection_string = Self::env_var("PORTAL_NOTIFIER_DB_CONNECTION_STRING")?;
        let db_name = Self::env_var("PORTAL_NOTIFIER_DB_NAME")?;
        let request_timeout: u64 = Self::env_var("PORTAL_NOTIFIER_REQUEST_TIMEOUT")?.parse()?;
        let request_timeout = Duration::from_millis(request_timeout);
        let load_retry_max_count =
            Self::env_var("PORTAL_NOTIFIER_LOAD_RETRY_MAX_COUNT")?.parse()?;
        let load_retry_interval: u64 =
            Self::env_var("PORTAL_NOTIFIER_LOAD_RETRY_INTERVAL")?.parse()?;
        let load_retry_interval = Duration::from_millis(load_retry_interval);
        let resort_interval: u64 = Self::env_var("PORTAL_NOTIFIER_RESORT_INTERVAL")?.parse()?;
        if resort_interval == 0 {
            return Err(anyhow!("PORTAL_NOTIFIER_RESORT_INTERVAL must be greater than 0"));
        }
        let resort_interval = Duration::from_secs(resort_interval);
        let push_buffer_size: usize = Self::env_var("PORTAL_NOTIFIER_PUSH_BUFFER_SIZE")?.parse()?;
        if push_buffer_size == 0 {
            return Err(anyhow!("PORTAL_NOTIFIER_PUSH_BUFFER_SIZE must be greater than 0"));
        }
        let email_domain = Self::env_var("PORTAL_NOTIFIER_EMAIL_DOMAIN")?;
        let session = Self::parse_session()?;

        Ok(Self {
            log_directory,
            log_filename,
            db_connection_string,
            db_name,
            request_timeout,
            load_retry_max_count,
            load_retry_interval,
            resort_interval,
            push_buffer_size,
            email_domain,
            session,
        })
    }

    fn parse_session() -> anyhow::Result<Option<SessionEnv>> {
        let user_id = std::env::var("PORTAL_NOTIFIER_SESSION_USER_ID").ok();
        let identifier = std::env::var("PORTAL_NOTIFIER_SESSION_IDENTIFIER").ok();

        match (user_id, identifier) {
            (Some(user_id), Some(identifier)) => Ok(Some(SessionEnv {
                user_id: user_id.parse()?,
                identifier,
            })),
            (None, None) => Ok(None),
            _ => Err(anyhow!(
                "PORTAL_NOTIFIER_SESSION_USER_ID and PORTAL_NOTIFIER_SESSION_IDENTIFIER must be set together"
            )),
        }
    }

    fn env_var(name: &'static str) -> anyhow::Result<String> {
        std::env::var(name).map_err(|_| anyhow!("environment variable {name} not set"))
    }
}
