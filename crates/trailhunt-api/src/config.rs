//! Server configuration from environment variables.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use trailhunt_game::application::course::Course;

use crate::error::AppError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_COURSE: &str = "course.yaml";
const DEFAULT_DECODER_URL: &str = "http://localhost:8081/decode";
const DEFAULT_DECODER_TIMEOUT_SECS: u64 = 10;

/// Runtime configuration of the API server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Path of the YAML course file (`TRAILHUNT_COURSE`).
    pub course_path: PathBuf,
    /// Endpoint of the image decode service (`DECODER_URL`).
    pub decoder_url: String,
    /// Request timeout for the decode service (`DECODER_TIMEOUT_SECS`).
    pub decoder_timeout: Duration,
}

impl AppConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a numeric variable cannot be parsed.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, falling back to defaults for
    /// unset variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a numeric variable cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned());
        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => DEFAULT_PORT,
        };
        let course_path =
            PathBuf::from(lookup("TRAILHUNT_COURSE").unwrap_or_else(|| DEFAULT_COURSE.to_owned()));
        let decoder_url = lookup("DECODER_URL").unwrap_or_else(|| DEFAULT_DECODER_URL.to_owned());
        let timeout_secs = match lookup("DECODER_TIMEOUT_SECS") {
            Some(raw) => raw.parse().map_err(|e| {
                AppError::Config(format!("DECODER_TIMEOUT_SECS must be a whole number: {e}"))
            })?,
            None => DEFAULT_DECODER_TIMEOUT_SECS,
        };

        Ok(Self {
            host,
            port,
            course_path,
            decoder_url,
            decoder_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// The socket address to listen on.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if host and port do not form an address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

/// Reads and parses the course file at `path`.
///
/// # Errors
///
/// Returns `AppError::CourseFile` if the file cannot be read and
/// `AppError::Course` if it is not a valid course document.
pub fn load_course(path: &Path) -> Result<Course, AppError> {
    let raw = std::fs::read_to_string(path).map_err(|source| AppError::CourseFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_yaml::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.course_path, PathBuf::from("course.yaml"));
        assert_eq!(config.decoder_timeout, Duration::from_secs(10));
        assert_eq!(config.socket_addr().unwrap().port(), 3000);
    }

    #[test]
    fn test_reads_all_variables() {
        let config = AppConfig::from_lookup(lookup(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("TRAILHUNT_COURSE", "/srv/hunt.yaml"),
            ("DECODER_URL", "http://decoder:9000/decode"),
            ("DECODER_TIMEOUT_SECS", "3"),
        ]))
        .unwrap();

        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:8080");
        assert_eq!(config.course_path, PathBuf::from("/srv/hunt.yaml"));
        assert_eq!(config.decoder_url, "http://decoder:9000/decode");
        assert_eq!(config.decoder_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_rejects_invalid_port() {
        let result = AppConfig::from_lookup(lookup(&[("PORT", "eighty")]));

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_missing_course_file_is_reported_with_path() {
        let result = load_course(Path::new("/nonexistent/course.yaml"));

        match result {
            Err(AppError::CourseFile { path, .. }) => {
                assert_eq!(path, PathBuf::from("/nonexistent/course.yaml"));
            }
            other => panic!("expected CourseFile, got {other:?}"),
        }
    }
}
