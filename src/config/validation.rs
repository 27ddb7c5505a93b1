//! Configuration validation.

use super::Config;

/// Validate security-sensitive settings. Returns a human-readable list of
/// problems; an empty token secret is fatal because no upgrade could ever
/// authenticate.
pub fn validate_config_security(config: &Config) -> Result<(), String> {
    let mut problems = Vec::new();

    if config.security.token_secret.trim().is_empty() {
        problems.push(
            "security.token_secret is empty; set a shared secret so bearer tokens can verify"
                .to_string(),
        );
    } else if config.security.token_secret.trim().len() < 16 {
        problems.push(
            "security.token_secret is shorter than 16 bytes; use a stronger secret".to_string(),
        );
    }

    if config.broadcast.period_ms == 0 {
        problems.push("broadcast.period_ms must be at least 1".to_string());
    }

    if config.server.queue_capacity == 0 {
        problems.push("server.queue_capacity must be at least 1".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.security.token_secret = "0123456789abcdef-strong".to_string();
        config
    }

    #[test]
    fn accepts_valid_config() {
        assert!(validate_config_security(&valid_config()).is_ok());
    }

    #[test]
    fn rejects_empty_secret() {
        let config = Config::default();
        let err = validate_config_security(&config).unwrap_err();
        assert!(err.contains("token_secret"));
    }

    #[test]
    fn rejects_zero_period() {
        let mut config = valid_config();
        config.broadcast.period_ms = 0;
        let err = validate_config_security(&config).unwrap_err();
        assert!(err.contains("period_ms"));
    }
}
