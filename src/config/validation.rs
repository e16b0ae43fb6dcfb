use crate::config::types::Config;
use crate::crawler::Charset;
use crate::ConfigError;
use url::Url;

/// Validates a parsed configuration
///
/// Checks performed:
/// - at least one worker
/// - at least one retry attempt
/// - non-empty target domain
/// - at least one seed URL, each parseable as an absolute http(s) URL
/// - at least one charset, each a recognized label
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.crawler.workers == 0 {
        return Err(ConfigError::Validation(
            "crawler.workers must be at least 1".to_string(),
        ));
    }

    if config.retry.max_attempts == 0 {
        return Err(ConfigError::Validation(
            "retry.max-attempts must be at least 1".to_string(),
        ));
    }

    if config.crawl.domain.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawl.domain must not be empty".to_string(),
        ));
    }

    if config.crawl.seeds.is_empty() {
        return Err(ConfigError::Validation(
            "crawl.seeds must contain at least one URL".to_string(),
        ));
    }

    for seed in &config.crawl.seeds {
        let url = Url::parse(seed).map_err(|_| ConfigError::InvalidUrl(seed.clone()))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(seed.clone()));
        }
    }

    if config.fetcher.charsets.is_empty() {
        return Err(ConfigError::Validation(
            "fetcher.charsets must contain at least one charset".to_string(),
        ));
    }

    for label in &config.fetcher.charsets {
        Charset::from_label(label).ok_or_else(|| ConfigError::UnknownCharset(label.clone()))?;
    }

    if let Some(proxy) = &config.fetcher.proxy {
        Url::parse(proxy).map_err(|_| ConfigError::InvalidUrl(proxy.clone()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::*;

    fn valid_config() -> Config {
        Config {
            crawl: CrawlConfig {
                domain: "example.com".to_string(),
                seeds: vec!["http://example.com/".to_string()],
            },
            crawler: CrawlerConfig {
                workers: 4,
                poll_interval_ms: 100,
                idle_backoff_ms: 50,
                max_idle_backoff_ms: 1000,
            },
            retry: RetryConfig {
                max_attempts: 3,
                base_wait_ms: 500,
            },
            fetcher: FetcherConfig {
                user_agent: "KumoSwarm/1.0".to_string(),
                charsets: vec!["utf-8".to_string()],
                proxy: None,
            },
            storage: StorageConfig {
                database_path: "./crawl.db".to_string(),
            },
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let mut config = valid_config();
        config.crawler.workers = 0;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let mut config = valid_config();
        config.retry.max_attempts = 0;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_empty_domain_rejected() {
        let mut config = valid_config();
        config.crawl.domain = "  ".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_seeds_rejected() {
        let mut config = valid_config();
        config.crawl.seeds.clear();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_malformed_seed_rejected() {
        let mut config = valid_config();
        config.crawl.seeds.push("not a url".to_string());
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_non_http_seed_rejected() {
        let mut config = valid_config();
        config.crawl.seeds = vec!["ftp://example.com/".to_string()];
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_unknown_charset_rejected() {
        let mut config = valid_config();
        config.fetcher.charsets.push("klingon-7".to_string());
        assert!(matches!(
            validate(&config),
            Err(ConfigError::UnknownCharset(_))
        ));
    }

    #[test]
    fn test_known_charset_labels_accepted() {
        let mut config = valid_config();
        config.fetcher.charsets = vec![
            "utf-8".to_string(),
            "ascii".to_string(),
            "utf-16".to_string(),
            "utf-16be".to_string(),
        ];
        assert!(validate(&config).is_ok());
    }
}
