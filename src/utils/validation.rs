use crate::utils::error::{Result, ServiceError};
use std::net::SocketAddr;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: &str, reason: impl Into<String>) -> ServiceError {
    ServiceError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(invalid(
                field_name,
                url_str,
                format!("Unsupported URL scheme: {}", scheme),
            )),
        },
        Err(e) => Err(invalid(
            field_name,
            url_str,
            format!("Invalid URL format: {}", e),
        )),
    }
}

/// 佇列與結果儲存目前只支援行程內的 memory:// 後端
pub fn validate_backend_url(field_name: &str, url_str: &str) -> Result<()> {
    match Url::parse(url_str) {
        Ok(url) if url.scheme() == "memory" => Ok(()),
        Ok(url) => Err(invalid(
            field_name,
            url_str,
            format!(
                "Unsupported backend scheme: {} (only memory:// is available)",
                url.scheme()
            ),
        )),
        Err(e) => Err(invalid(
            field_name,
            url_str,
            format!("Invalid connection string: {}", e),
        )),
    }
}

pub fn validate_socket_addr(field_name: &str, addr: &str) -> Result<()> {
    addr.parse::<SocketAddr>()
        .map(|_| ())
        .map_err(|e| invalid(field_name, addr, format!("Invalid socket address: {}", e)))
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(invalid(
            field_name,
            &value.to_string(),
            format!("Value must be at least {}", min_value),
        ));
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(
            field_name,
            &value.to_string(),
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("directory.url", "https://example.com").is_ok());
        assert!(validate_url("directory.url", "http://universities.hipolabs.com/search").is_ok());
        assert!(validate_url("directory.url", "").is_err());
        assert!(validate_url("directory.url", "invalid-url").is_err());
        assert!(validate_url("directory.url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_backend_url() {
        assert!(validate_backend_url("queue.broker_url", "memory://").is_ok());
        assert!(validate_backend_url("queue.broker_url", "amqp://guest@localhost:5672//").is_err());
        assert!(validate_backend_url("queue.result_backend", "redis://localhost:6379/0").is_err());
        assert!(validate_backend_url("queue.result_backend", "").is_err());
    }

    #[test]
    fn test_validate_socket_addr() {
        assert!(validate_socket_addr("server.bind_addr", "127.0.0.1:9000").is_ok());
        assert!(validate_socket_addr("server.bind_addr", "localhost").is_err());
    }

    #[test]
    fn test_validate_positive_number_and_range() {
        assert!(validate_positive_number("queue.worker_concurrency", 4, 1).is_ok());
        assert!(validate_positive_number("queue.worker_concurrency", 0, 1).is_err());
        assert!(validate_range("queue.max_retries", 5u32, 0, 20).is_ok());
        assert!(validate_range("queue.max_retries", 21u32, 0, 20).is_err());
    }
}
