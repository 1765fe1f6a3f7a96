//! Inputs of collect and clear runs.

use crate::error::{SyncError, SyncResult};

/// Input of a collect run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectRequest {
    /// Blog whose posts are counted.
    pub target_blog: String,
    /// Blog holding the storage post. Defaults to the target blog.
    pub storage_blog: Option<String>,
    /// Id of the storage post.
    pub storage_post_id: String,
    /// Months recomputed on this run. Clamped to `[1, 12]`, default 1.
    pub update_range: Option<u32>,
}

impl CollectRequest {
    /// Creates a request storing into the target blog itself.
    pub fn new(target_blog: impl Into<String>, storage_post_id: impl Into<String>) -> Self {
        Self {
            target_blog: target_blog.into(),
            storage_blog: None,
            storage_post_id: storage_post_id.into(),
            update_range: None,
        }
    }

    /// Sets the blog holding the storage post.
    pub fn with_storage_blog(mut self, blog: impl Into<String>) -> Self {
        self.storage_blog = Some(blog.into());
        self
    }

    /// Sets the requested update range.
    pub fn with_update_range(mut self, months: u32) -> Self {
        self.update_range = Some(months);
        self
    }

    /// Blog holding the storage post.
    pub fn storage_blog(&self) -> &str {
        match self.storage_blog.as_deref() {
            Some(blog) if !blog.trim().is_empty() => blog,
            _ => &self.target_blog,
        }
    }

    /// Storage location of this request.
    pub fn storage(&self) -> ClearRequest {
        ClearRequest::new(self.storage_blog(), self.storage_post_id.clone())
    }

    /// Checks required fields.
    pub fn validate(&self) -> SyncResult<()> {
        require("target blog name", &self.target_blog)?;
        require("storage post id", &self.storage_post_id)
    }
}

/// Input of a clear run, and the location of a storage post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearRequest {
    /// Blog holding the storage post.
    pub storage_blog: String,
    /// Id of the storage post.
    pub storage_post_id: String,
}

impl ClearRequest {
    /// Creates a request.
    pub fn new(storage_blog: impl Into<String>, storage_post_id: impl Into<String>) -> Self {
        Self {
            storage_blog: storage_blog.into(),
            storage_post_id: storage_post_id.into(),
        }
    }

    /// Checks required fields.
    pub fn validate(&self) -> SyncResult<()> {
        require("storage blog name", &self.storage_blog)?;
        require("storage post id", &self.storage_post_id)
    }
}

fn require(name: &str, value: &str) -> SyncResult<()> {
    if value.trim().is_empty() {
        return Err(SyncError::Configuration(format!("{name} is required")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_blog_defaults_to_target() {
        let request = CollectRequest::new("aerocode", "42");
        assert_eq!(request.storage_blog(), "aerocode");

        let request = request.with_storage_blog("vault");
        assert_eq!(request.storage_blog(), "vault");
        assert_eq!(request.storage(), ClearRequest::new("vault", "42"));
    }

    #[test]
    fn blank_storage_blog_falls_back() {
        let request = CollectRequest::new("aerocode", "42").with_storage_blog("  ");
        assert_eq!(request.storage_blog(), "aerocode");
    }

    #[test]
    fn missing_fields_are_configuration_errors() {
        assert!(matches!(
            CollectRequest::new("", "42").validate(),
            Err(SyncError::Configuration(_))
        ));
        assert!(matches!(
            CollectRequest::new("aerocode", " ").validate(),
            Err(SyncError::Configuration(_))
        ));
        assert!(ClearRequest::new("aerocode", "42").validate().is_ok());
        assert!(ClearRequest::new("", "42").validate().is_err());
    }
}
