use crate::config::types::{
    Config, FieldSelector, HarvesterConfig, OutputConfig, SelectorConfig, SiteConfig,
    UserAgentConfig, MAX_DETAIL_CONCURRENCY, QUERY_PLACEHOLDER,
};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_harvester_config(&config.harvester)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_selectors(&config.selectors)?;
    Ok(())
}

/// Validates target site configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if !config.listing_path_template.contains(QUERY_PLACEHOLDER) {
        return Err(ConfigError::Validation(format!(
            "listing-path-template must contain {}",
            QUERY_PLACEHOLDER
        )));
    }

    if config.detail_path_from.is_empty() {
        return Err(ConfigError::Validation(
            "detail-path-from cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates harvester configuration
fn validate_harvester_config(config: &HarvesterConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.max_concurrent_detail_fetches < 1
        || config.max_concurrent_detail_fetches > MAX_DETAIL_CONCURRENCY
    {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-detail-fetches must be between 1 and {}, got {}",
            MAX_DETAIL_CONCURRENCY, config.max_concurrent_detail_fetches
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "connect-timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.name.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent name cannot be empty".to_string(),
        ));
    }

    if !config
        .name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "user-agent name must contain only alphanumeric characters, hyphens and underscores, got '{}'",
            config.name
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    if config.summary_path.is_empty() {
        return Err(ConfigError::Validation(
            "summary-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the selector table: every entry must compile to an exact selector
fn validate_selectors(config: &SelectorConfig) -> Result<(), ConfigError> {
    for (field, selector) in config.entries() {
        validate_field_selector(field, selector)?;
    }

    if config.read_more_marker.is_empty() {
        return Err(ConfigError::Validation(
            "read-more-marker cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_field_selector(field: &str, selector: &FieldSelector) -> Result<(), ConfigError> {
    let invalid = |message: &str| ConfigError::InvalidSelector {
        field: field.to_string(),
        message: message.to_string(),
    };

    if selector.tag.is_empty() || !selector.tag.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(invalid("tag must be a non-empty alphanumeric element name"));
    }

    if selector.class.trim().is_empty() {
        return Err(invalid("class cannot be empty"));
    }

    if selector.class.contains('"') || selector.class.contains('\\') {
        return Err(invalid("class cannot contain quotes or backslashes"));
    }

    Selector::parse(&selector.to_css()).map_err(|e| invalid(&format!("{:?}", e)))?;

    Ok(())
}
