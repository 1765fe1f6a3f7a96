//! Server configuration.

use crate::error::{ServerError, ServerResult};
use chrono_tz::Tz;
use config::{Config, Environment};
use postlog_sync_engine::{
    ClearRequest, CollectRequest, Credentials, IncludeMask, SyncConfig, SystemClock,
};
use serde::Deserialize;
use std::net::SocketAddr;

/// Prefix of the environment variables read by [`ServerConfig::from_env`].
pub const ENV_PREFIX: &str = "POSTLOG";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Settings as they come out of the environment, before validation.
#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    bind_addr: Option<String>,
    target_blog_name: Option<String>,
    storage_blog_name: Option<String>,
    storage_post_id: Option<String>,
    update_range: Option<String>,
    include_mask: Option<String>,
    timezone: Option<String>,
    access_token: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    user_id: Option<String>,
    user_pw: Option<String>,
    redirect_uri: Option<String>,
}

/// Validated server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    pub bind_addr: SocketAddr,
    /// Blog whose posts are counted.
    pub target_blog_name: String,
    /// Blog holding the storage post; the target blog when unset.
    pub storage_blog_name: Option<String>,
    /// Id of the storage post.
    pub storage_post_id: String,
    /// Months recounted per collect run.
    pub update_range: Option<u32>,
    /// Counted visibilities.
    pub include_mask: IncludeMask,
    /// Zone used to read "today"; `None` reads the host's zone.
    pub timezone: Option<Tz>,
    /// Credentials for the blog platform.
    pub credentials: Credentials,
}

impl ServerConfig {
    /// Loads the configuration from `POSTLOG_*` environment variables.
    pub fn from_env() -> ServerResult<Self> {
        Self::load(Environment::with_prefix(ENV_PREFIX))
    }

    /// Loads the configuration from an environment source.
    ///
    /// Every missing required key is reported in a single
    /// [`ServerError::MissingConfig`].
    pub fn load(source: Environment) -> ServerResult<Self> {
        let raw: RawSettings = Config::builder()
            .set_default("bind_addr", DEFAULT_BIND_ADDR)?
            .add_source(source)
            .build()?
            .try_deserialize()?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawSettings) -> ServerResult<Self> {
        let mut missing = Vec::new();
        let target_blog_name = required(raw.target_blog_name, "TARGET_BLOG_NAME", &mut missing);
        let storage_post_id = required(raw.storage_post_id, "STORAGE_POST_ID", &mut missing);
        if !missing.is_empty() {
            return Err(ServerError::MissingConfig(missing));
        }

        let bind_addr = raw
            .bind_addr
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse::<SocketAddr>()
            .map_err(|e| ServerError::InvalidConfig {
                key: "bind_addr",
                reason: format!("{e}"),
            })?;

        let update_range = raw
            .update_range
            .filter(|v| !v.trim().is_empty())
            .map(|v| {
                v.trim().parse::<u32>().map_err(|e| ServerError::InvalidConfig {
                    key: "update_range",
                    reason: format!("{v:?}: {e}"),
                })
            })
            .transpose()?;

        let include_mask = match raw.include_mask.as_deref().map(str::trim) {
            Some(mask) if !mask.is_empty() => mask.parse::<IncludeMask>()?,
            _ => IncludeMask::default(),
        };

        let timezone = SystemClock::from_name(raw.timezone.as_deref())?.timezone();

        let credentials = Credentials::from_parts(
            raw.access_token,
            raw.client_id,
            raw.client_secret,
            raw.user_id,
            raw.user_pw,
            raw.redirect_uri,
        )?;

        Ok(Self {
            bind_addr,
            target_blog_name: target_blog_name.unwrap_or_default(),
            storage_blog_name: raw.storage_blog_name.filter(|v| !v.trim().is_empty()),
            storage_post_id: storage_post_id.unwrap_or_default(),
            update_range,
            include_mask,
            timezone,
            credentials,
        })
    }

    /// Request issued by `POST /collect`.
    pub fn collect_request(&self) -> CollectRequest {
        let mut request =
            CollectRequest::new(self.target_blog_name.clone(), self.storage_post_id.clone());
        if let Some(blog) = &self.storage_blog_name {
            request = request.with_storage_blog(blog.clone());
        }
        if let Some(months) = self.update_range {
            request = request.with_update_range(months);
        }
        request
    }

    /// Request issued by `POST /clear`.
    pub fn clear_request(&self) -> ClearRequest {
        self.collect_request().storage()
    }

    /// Engine configuration derived from these settings.
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig::new().with_include_mask(self.include_mask)
    }

    /// Clock reading "today" in the configured zone.
    pub fn clock(&self) -> SystemClock {
        match self.timezone {
            Some(tz) => SystemClock::in_timezone(tz),
            None => SystemClock::local(),
        }
    }
}

fn required(value: Option<String>, key: &str, missing: &mut Vec<String>) -> Option<String> {
    let value = value.filter(|v| !v.trim().is_empty());
    if value.is_none() {
        missing.push(format!("{ENV_PREFIX}_{key}"));
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::Map;
    use postlog_sync_engine::{SyncError, DEFAULT_TIMEZONE};

    fn load(vars: &[(&str, &str)]) -> ServerResult<ServerConfig> {
        let map: Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::load(Environment::with_prefix(ENV_PREFIX).source(Some(map)))
    }

    const BASE: [(&str, &str); 3] = [
        ("POSTLOG_TARGET_BLOG_NAME", "aerocode"),
        ("POSTLOG_STORAGE_POST_ID", "100"),
        ("POSTLOG_ACCESS_TOKEN", "token"),
    ];

    #[test]
    fn reports_every_missing_key() {
        let err = load(&[("POSTLOG_ACCESS_TOKEN", "token")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing configuration: POSTLOG_TARGET_BLOG_NAME, POSTLOG_STORAGE_POST_ID"
        );
    }

    #[test]
    fn blank_values_count_as_missing() {
        let err = load(&[
            ("POSTLOG_TARGET_BLOG_NAME", "aerocode"),
            ("POSTLOG_STORAGE_POST_ID", "  "),
            ("POSTLOG_ACCESS_TOKEN", "token"),
        ])
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing configuration: POSTLOG_STORAGE_POST_ID"
        );
    }

    #[test]
    fn defaults() {
        let config = load(&BASE).unwrap();

        assert_eq!(
            config.bind_addr,
            "127.0.0.1:8080".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(config.include_mask, IncludeMask::PUBLISHED_ONLY);
        assert_eq!(config.update_range, None);
        assert_eq!(config.timezone, Some(DEFAULT_TIMEZONE));

        let collect = config.collect_request();
        assert_eq!(collect.storage_blog(), "aerocode");
        assert_eq!(collect.storage_post_id, "100");
        assert_eq!(config.clear_request(), ClearRequest::new("aerocode", "100"));
    }

    #[test]
    fn optional_settings() {
        let mut vars = BASE.to_vec();
        vars.extend([
            ("POSTLOG_BIND_ADDR", "0.0.0.0:3000"),
            ("POSTLOG_STORAGE_BLOG_NAME", "archive"),
            ("POSTLOG_UPDATE_RANGE", "3"),
            ("POSTLOG_INCLUDE_MASK", "111"),
            ("POSTLOG_TIMEZONE", "Europe/Berlin"),
        ]);
        let config = load(&vars).unwrap();

        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.update_range, Some(3));
        assert_eq!(config.include_mask, IncludeMask::ALL);
        assert_eq!(config.timezone, Some(chrono_tz::Europe::Berlin));
        assert_eq!(config.clear_request(), ClearRequest::new("archive", "100"));
    }

    #[test]
    fn local_timezone_uses_host_zone() {
        let mut vars = BASE.to_vec();
        vars.push(("POSTLOG_TIMEZONE", "local"));
        let config = load(&vars).unwrap();
        assert!(config.timezone.is_none());
        assert!(config.clock().timezone().is_none());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut vars = BASE.to_vec();
        vars.push(("POSTLOG_UPDATE_RANGE", "soon"));
        assert!(matches!(
            load(&vars),
            Err(ServerError::InvalidConfig { key: "update_range", .. })
        ));

        let mut vars = BASE.to_vec();
        vars.push(("POSTLOG_INCLUDE_MASK", "01"));
        assert!(matches!(load(&vars), Err(ServerError::Sync(_))));

        let mut vars = BASE.to_vec();
        vars.push(("POSTLOG_TIMEZONE", "Mars/Olympus"));
        assert!(matches!(
            load(&vars),
            Err(ServerError::Sync(SyncError::Configuration(_)))
        ));
    }

    #[test]
    fn credentials_are_required() {
        let err = load(&BASE[..2]).unwrap_err();
        assert!(matches!(err, ServerError::Sync(_)));
    }
}
