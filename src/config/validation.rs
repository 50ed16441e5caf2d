use crate::config::types::CrawlerConfig;
use crate::{ConfigError, ConfigResult};
use tokio::sync::Semaphore;

/// Validates a runtime crawler configuration
pub fn validate(config: &CrawlerConfig) -> ConfigResult<()> {
    if config.workers < 1 {
        return Err(ConfigError::Validation(format!(
            "workers must be >= 1, got {}",
            config.workers
        )));
    }

    if config.workers > Semaphore::MAX_PERMITS {
        return Err(ConfigError::Validation(format!(
            "workers must be <= {}, got {}",
            Semaphore::MAX_PERMITS,
            config.workers
        )));
    }

    if config.max_depth < -1 {
        return Err(ConfigError::Validation(format!(
            "max_depth must be -1 (unlimited) or >= 0, got {}",
            config.max_depth
        )));
    }

    if config.timeout.is_zero() {
        return Err(ConfigError::Validation(
            "timeout must be greater than zero".to_string(),
        ));
    }

    if let Some(user_agent) = &config.user_agent {
        if user_agent.trim().is_empty() {
            return Err(ConfigError::Validation(
                "user_agent cannot be empty when set".to_string(),
            ));
        }
    }

    if let Some(auth) = &config.auth {
        if auth.username.is_empty() && auth.password.is_empty() {
            return Err(ConfigError::Validation(
                "auth requires a username or a password".to_string(),
            ));
        }
    }

    Ok(())
}
