// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

/// Configuration for the token registry daemon.
#[derive(Debug, Clone, clap::Args)]
pub struct RegistryConfig {
    /// Host to bind on.
    #[arg(long, default_value = "127.0.0.1", env = "TOKEND_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 9860, env = "TOKEND_PORT")]
    pub port: u16,

    /// Bearer token for API auth. If unset, auth is disabled.
    #[arg(long, env = "TOKEND_AUTH_TOKEN")]
    pub auth_token: Option<String>,

    /// Base URL of the broker management API.
    #[arg(long, default_value = "http://127.0.0.1:15672", env = "TOKEND_BROKER_MGMT_URL")]
    pub broker_mgmt_url: String,

    /// Username for the broker management API.
    #[arg(long, env = "TOKEND_BROKER_MGMT_USER")]
    pub broker_mgmt_user: Option<String>,

    /// Password for the broker management API.
    #[arg(long, env = "TOKEND_BROKER_MGMT_PASS")]
    pub broker_mgmt_pass: Option<String>,

    /// Timeout for broker management calls in milliseconds.
    #[arg(long, default_value_t = 3000, env = "TOKEND_BROKER_TIMEOUT_MS")]
    pub broker_timeout_ms: u64,

    /// Expired-token sweep interval in seconds.
    #[arg(long, default_value_t = 300, env = "TOKEND_SWEEP_INTERVAL_SECS")]
    pub sweep_interval_secs: u64,

    /// Prefix for broker principal names derived from device ids.
    #[arg(long, default_value = "device_", env = "TOKEND_PRINCIPAL_PREFIX")]
    pub principal_prefix: String,

    /// Path to the ledger persistence JSON file. If unset, the ledger is in-memory only.
    #[arg(long, env = "TOKEND_PERSIST_PATH")]
    pub persist_path: Option<std::path::PathBuf>,
}

impl RegistryConfig {
    pub fn broker_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.broker_timeout_ms)
    }

    pub fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sweep_interval_secs)
    }
}
