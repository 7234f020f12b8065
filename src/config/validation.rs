use crate::config::types::{Config, CrawlConfig, ExtractConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if let Some(crawl) = &config.crawl {
        validate_crawl(crawl)?;
    }
    validate_extract(&config.extract)?;
    Ok(())
}

/// Validates crawl configuration
pub fn validate_crawl(config: &CrawlConfig) -> Result<(), ConfigError> {
    validate_seed(&config.seed)?;

    if !(config.rps > 0.0 && config.rps.is_finite()) {
        return Err(ConfigError::Validation(format!(
            "rps must be a positive number, got {}",
            config.rps
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(
            "max_pages must be >= 1".to_string(),
        ));
    }

    if config.per_page_link_cap < 1 {
        return Err(ConfigError::Validation(
            "per_page_link_cap must be >= 1".to_string(),
        ));
    }

    if config.retry_attempts < 1 {
        return Err(ConfigError::Validation(
            "retry_attempts must be >= 1".to_string(),
        ));
    }

    if !(config.retry_backoff_base >= 0.0 && config.retry_backoff_base.is_finite()) {
        return Err(ConfigError::Validation(format!(
            "retry_backoff_base must be >= 0, got {}",
            config.retry_backoff_base
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.robots_cache_capacity < 1 {
        return Err(ConfigError::Validation(
            "robots_cache_capacity must be >= 1".to_string(),
        ));
    }

    if config.channel_capacity < 1 {
        return Err(ConfigError::Validation(
            "channel_capacity must be >= 1".to_string(),
        ));
    }

    for host in &config.extra_scope_hosts {
        validate_host(host)?;
    }

    Ok(())
}

/// Validates extraction configuration
pub fn validate_extract(config: &ExtractConfig) -> Result<(), ConfigError> {
    if config.max_insights < 1 {
        return Err(ConfigError::Validation(
            "max_insights must be >= 1".to_string(),
        ));
    }

    validate_threshold("fuzzy_threshold", config.fuzzy_threshold)?;
    validate_threshold("minhash.confirm_threshold", config.minhash.confirm_threshold)?;

    let minhash = &config.minhash;
    if minhash.signature_size < 1 || minhash.bands < 1 {
        return Err(ConfigError::Validation(
            "minhash signature_size and bands must be >= 1".to_string(),
        ));
    }

    if minhash.signature_size % minhash.bands != 0 {
        return Err(ConfigError::Validation(format!(
            "minhash bands ({}) must divide signature_size ({})",
            minhash.bands, minhash.signature_size
        )));
    }

    if minhash.shingle_k < 1 {
        return Err(ConfigError::Validation(
            "minhash shingle_k must be >= 1".to_string(),
        ));
    }

    if config.max_atomic_len < 20 {
        return Err(ConfigError::Validation(format!(
            "max_atomic_len must be >= 20, got {}",
            config.max_atomic_len
        )));
    }

    if config.max_candidate_len < config.max_atomic_len {
        return Err(ConfigError::Validation(format!(
            "max_candidate_len ({}) must be >= max_atomic_len ({})",
            config.max_candidate_len, config.max_atomic_len
        )));
    }

    Ok(())
}

/// The seed must be an absolute http(s) URL with a host
fn validate_seed(seed: &str) -> Result<(), ConfigError> {
    if seed.trim().is_empty() {
        return Err(ConfigError::Validation("seed cannot be empty".to_string()));
    }

    let url = Url::parse(seed)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' must use http or https",
            seed
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' has no host",
            seed
        )));
    }

    Ok(())
}

fn validate_threshold(name: &str, value: f64) -> Result<(), ConfigError> {
    if !(value > 0.0 && value <= 1.0) {
        return Err(ConfigError::Validation(format!(
            "{} must be in (0, 1], got {}",
            name, value
        )));
    }
    Ok(())
}

/// Validates a bare hostname used for extra scope
fn validate_host(host: &str) -> Result<(), ConfigError> {
    if host.is_empty() {
        return Err(ConfigError::Validation(
            "extra scope host cannot be empty".to_string(),
        ));
    }

    if !host
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "extra scope host '{}' contains invalid characters",
            host
        )));
    }

    if host.starts_with('.') || host.ends_with('.') || host.contains("..") {
        return Err(ConfigError::Validation(format!(
            "extra scope host '{}' is malformed",
            host
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_seed() {
        assert!(validate_seed("https://example.com/").is_ok());
        assert!(validate_seed("http://127.0.0.1:8080/").is_ok());

        assert!(validate_seed("").is_err());
        assert!(validate_seed("not a url").is_err());
        assert!(validate_seed("ftp://example.com/").is_err());
        assert!(validate_seed("mailto:someone@example.com").is_err());
    }

    #[test]
    fn test_default_crawl_config_needs_seed() {
        assert!(validate_crawl(&CrawlConfig::default()).is_err());
        assert!(validate_crawl(&CrawlConfig::new("https://example.com/")).is_ok());
    }

    #[test]
    fn test_crawl_bounds() {
        let mut config = CrawlConfig::new("https://example.com/");
        config.retry_attempts = 0;
        assert!(validate_crawl(&config).is_err());

        let mut config = CrawlConfig::new("https://example.com/");
        config.rps = -1.0;
        assert!(validate_crawl(&config).is_err());

        let mut config = CrawlConfig::new("https://example.com/");
        config.extra_scope_hosts = vec!["bad host".to_string()];
        assert!(validate_crawl(&config).is_err());
    }

    #[test]
    fn test_validate_host() {
        assert!(validate_host("docs.example.com").is_ok());
        assert!(validate_host("localhost").is_ok());

        assert!(validate_host("").is_err());
        assert!(validate_host(".example.com").is_err());
        assert!(validate_host("example..com").is_err());
    }

    #[test]
    fn test_extract_bounds() {
        assert!(validate_extract(&ExtractConfig::default()).is_ok());

        let mut config = ExtractConfig::default();
        config.minhash.bands = 5;
        assert!(validate_extract(&config).is_err());

        let mut config = ExtractConfig::default();
        config.fuzzy_threshold = 1.5;
        assert!(validate_extract(&config).is_err());

        let mut config = ExtractConfig::default();
        config.max_insights = 0;
        assert!(validate_extract(&config).is_err());
    }
}
