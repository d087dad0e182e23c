use std::env;

/// 5 MiB, the platform body-size ceiling for the compression endpoint.
pub const DEFAULT_MAX_BODY_SIZE: usize = 5 * 1024 * 1024;

/// 4 MiB, the self-imposed ceiling on what the client uploads after its local pass.
pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 4 * 1024 * 1024;

/// Server-side configuration for the compression endpoint
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: "0.0.0.0")
    pub host: String,

    /// Listen port (default: 3000)
    pub port: u16,

    /// Maximum request body size in bytes (default: 5 MiB)
    pub max_body_size: usize,

    /// Allowed CORS Origins (comma separated, "*" for any)
    pub allowed_origins: Vec<String>,

    /// Objects packed into each object stream (default: 100)
    pub max_objects_per_stream: usize,

    /// Drop objects unreachable from the trailer before saving (default: true)
    pub prune_objects: bool,

    /// Flate-encode streams that carry no filter yet (default: true)
    pub compress_streams: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            max_objects_per_stream: 100,
            prune_objects: true,
            compress_streams: true,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            host: env::var("HOST").unwrap_or(default.host),

            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.port),

            max_body_size: env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_body_size),

            allowed_origins: env::var("ALLOWED_ORIGINS")
                .ok()
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(default.allowed_origins),

            max_objects_per_stream: env::var("MAX_OBJECTS_PER_STREAM")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(default.max_objects_per_stream),

            prune_objects: env::var("PRUNE_OBJECTS")
                .map(|v| parse_flag(&v))
                .unwrap_or(default.prune_objects),

            compress_streams: env::var("COMPRESS_STREAMS")
                .map(|v| parse_flag(&v))
                .unwrap_or(default.compress_streams),
        }
    }

    /// Create config for development (any origin, default limits)
    pub fn development() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            ..Self::default()
        }
    }

    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

/// Client-side configuration for the upload flow
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the compression server (default: "http://localhost:3000")
    pub server_url: String,

    /// Largest payload the client will upload after its local pass (default: 4 MiB)
    pub upload_ceiling: usize,

    /// Run a local compression pass before uploading (default: true)
    pub local_pass: bool,

    /// Directory the compressed download is written to (default: ".")
    pub output_dir: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:3000".to_string(),
            upload_ceiling: DEFAULT_MAX_UPLOAD_SIZE,
            local_pass: true,
            output_dir: ".".to_string(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            server_url: env::var("COMPRESS_SERVER_URL").unwrap_or(default.server_url),

            upload_ceiling: env::var("MAX_UPLOAD_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.upload_ceiling),

            local_pass: env::var("LOCAL_PASS")
                .map(|v| parse_flag(&v))
                .unwrap_or(default.local_pass),

            output_dir: env::var("OUTPUT_DIR").unwrap_or(default.output_dir),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/api/compress", self.server_url.trim_end_matches('/'))
    }
}

fn parse_flag(value: &str) -> bool {
    value.to_lowercase() != "false" && value != "0"
}
