#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub worker_server: WorkerServer,
    pub database: Database,
    pub expiration: Expiration,
}

#[derive(Debug, Clone)]
pub struct WorkerServer {
    pub port: u16,
    pub timeout: u64,
    pub body_limit: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
    pub max_connections: u32,
}

/// Expired-plan sweep settings.
#[derive(Debug, Clone)]
pub struct Expiration {
    pub interval_secs: u64,
    pub batch_limit: i64,
    /// Bearer token for the on-demand sweep endpoint. The endpoint answers 503 when unset.
    pub internal_token: Option<String>,
}
