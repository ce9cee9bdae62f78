use std::env;
use std::path::PathBuf;

/// Runtime settings for uploads, storage and CORS
#[derive(Debug, Clone)]
pub struct Settings {
    /// Database connection string. Required outside development; empty when unset
    pub database_url: String,

    /// Maximum declared upload size in bytes (default: 5 MB)
    pub max_upload_size: usize,

    /// MIME types accepted by the file store
    pub allowed_mime_types: Vec<String>,

    /// Allowed CORS origins (comma separated in the environment)
    pub allowed_origins: Vec<String>,

    /// Base directory under which category folders are created
    pub storage_root: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_upload_size: 5 * 1024 * 1024, // 5 MB
            allowed_mime_types: vec![
                "image/png".to_string(),
                "image/jpeg".to_string(),
                "image/webp".to_string(),
            ],
            allowed_origins: vec![
                "http://localhost:8080".to_string(),
                "http://127.0.0.1:8080".to_string(),
            ],
            storage_root: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();

        Self {
            database_url: lookup("DATABASE_URL")
                .map(|v| v.trim().to_string())
                .unwrap_or(default.database_url),

            max_upload_size: lookup("DATA_UPLOAD_MAX_MEMORY_SIZE")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default.max_upload_size),

            allowed_mime_types: lookup("ALLOWED_MIME_TYPES")
                .map(|v| split_list(&v))
                .filter(|v| !v.is_empty())
                .unwrap_or(default.allowed_mime_types),

            allowed_origins: lookup("ORIGINS")
                .map(|v| split_list(&v))
                .filter(|v| !v.is_empty())
                .unwrap_or(default.allowed_origins),

            storage_root: lookup("STORAGE_ROOT")
                .map(PathBuf::from)
                .unwrap_or(default.storage_root),
        }
    }

    /// Settings for local development and tests: relaxed limits, images and PDFs
    pub fn development() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            max_upload_size: 50 * 1024 * 1024,
            allowed_mime_types: vec![
                "image/png".to_string(),
                "image/jpeg".to_string(),
                "image/gif".to_string(),
                "image/webp".to_string(),
                "application/pdf".to_string(),
            ],
            ..Self::default()
        }
    }

    /// Exact match on the media type, ignoring parameters and case.
    pub fn is_mime_allowed(&self, mime_type: &str) -> bool {
        let Ok(parsed) = mime_type.trim().parse::<mime::Mime>() else {
            return false;
        };

        let essence = parsed.essence_str();
        self.allowed_mime_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(essence))
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
