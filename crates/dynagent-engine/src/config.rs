/*
[INPUT]:  YAML configuration file or caller-built values
[OUTPUT]: Parsed engine configuration
[POS]:    Configuration layer - upload acceptance policy
[UPDATE]: When adding new configuration options
*/

use serde::{Deserialize, Serialize};

use crate::upload::{UploadFile, UploadRejection};

/// Top-level configuration for the task engine
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Upload acceptance policy
    #[serde(default)]
    pub upload: UploadPolicy,
}

/// What the upload queue accepts; supplied by the caller, never hardcoded
/// in the managers.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadPolicy {
    /// Accepted media types (case-insensitive match)
    #[serde(default = "default_accepted_media_types")]
    pub accepted_media_types: Vec<String>,
    /// Maximum file size in bytes
    #[serde(default = "default_max_file_size_bytes")]
    pub max_file_size_bytes: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            accepted_media_types: default_accepted_media_types(),
            max_file_size_bytes: default_max_file_size_bytes(),
        }
    }
}

fn default_accepted_media_types() -> Vec<String> {
    vec!["application/pdf".to_string(), "text/csv".to_string()]
}

fn default_max_file_size_bytes() -> u64 {
    10 * 1024 * 1024
}

impl UploadPolicy {
    /// Validate a file against the policy before any task exists for it.
    pub fn check(&self, file: &UploadFile) -> Result<(), UploadRejection> {
        let accepted = self
            .accepted_media_types
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(&file.media_type));
        if !accepted {
            return Err(UploadRejection::UnsupportedMediaType {
                media_type: file.media_type.clone(),
            });
        }

        let size = file.size();
        if size > self.max_file_size_bytes {
            return Err(UploadRejection::FileTooLarge {
                size,
                max: self.max_file_size_bytes,
            });
        }

        Ok(())
    }
}

impl EngineConfig {
    /// Load configuration from YAML file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(media_type: &str, size: usize) -> UploadFile {
        UploadFile {
            name: "sample".to_string(),
            media_type: media_type.to_string(),
            bytes: vec![0u8; size],
        }
    }

    #[test]
    fn defaults_accept_pdf_and_csv_under_ten_mib() {
        let policy = UploadPolicy::default();
        assert!(policy.check(&file("application/pdf", 1024)).is_ok());
        assert!(policy.check(&file("TEXT/CSV", 1024)).is_ok());
    }

    #[test]
    fn rejects_unknown_media_type() {
        let policy = UploadPolicy::default();
        let err = policy.check(&file("image/png", 1024)).unwrap_err();
        assert!(matches!(
            err,
            UploadRejection::UnsupportedMediaType { .. }
        ));
    }

    #[test]
    fn rejects_oversize_file() {
        let policy = UploadPolicy {
            max_file_size_bytes: 16,
            ..UploadPolicy::default()
        };
        let err = policy.check(&file("text/csv", 17)).unwrap_err();
        match err {
            UploadRejection::FileTooLarge { size, max } => {
                assert_eq!(size, 17);
                assert_eq!(max, 16);
            }
            other => panic!("unexpected rejection: {other:?}"),
        }
    }

    #[test]
    fn yaml_defaults_fill_missing_fields() {
        let config: EngineConfig = serde_yaml::from_str("upload: {}\n").unwrap();
        assert_eq!(config.upload.max_file_size_bytes, 10 * 1024 * 1024);
        assert_eq!(config.upload.accepted_media_types.len(), 2);
    }
}
