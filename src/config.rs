use serde::Deserialize;

/// Runtime settings, read from `ROWMQ_*` environment variables.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    pub db_path: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub max_connections: Option<u32>,
    /// Upper bound on the number of messages a single lease request may claim.
    pub queue_max_number_of_messages: Option<u32>,
    pub shutdown_timeout_seconds: Option<u64>,
    pub metrics_host: Option<String>,
    pub metrics_port: Option<u16>,
}

impl Config {
    /// Loads the configuration from the environment, after applying a `.env`
    /// file if one is found.
    pub fn load() -> eyre::Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::info!(path = %path.display(), "loaded .env");
        }

        Ok(envy::prefixed("ROWMQ_").from_env::<Self>()?)
    }

    pub fn db_path(&self) -> &str {
        self.db_path.as_deref().unwrap_or("rowmq.db")
    }

    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or("0.0.0.0")
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(8000)
    }

    pub fn max_connections(&self) -> u32 {
        self.max_connections.unwrap_or(5)
    }

    pub fn queue_max_number_of_messages(&self) -> u32 {
        self.queue_max_number_of_messages.unwrap_or(10)
    }

    pub fn shutdown_timeout_seconds(&self) -> u64 {
        self.shutdown_timeout_seconds.unwrap_or(5)
    }

    pub fn metrics_host(&self) -> &str {
        self.metrics_host.as_deref().unwrap_or("0.0.0.0")
    }

    pub fn metrics_port(&self) -> u16 {
        self.metrics_port.unwrap_or(9090)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();

        assert_eq!(config.db_path(), "rowmq.db");
        assert_eq!(config.host(), "0.0.0.0");
        assert_eq!(config.port(), 8000);
        assert_eq!(config.queue_max_number_of_messages(), 10);
        assert_eq!(config.metrics_host(), "0.0.0.0");
        assert_eq!(config.metrics_port(), 9090);
    }

    #[test]
    fn reads_prefixed_variables() {
        let vars = vec![
            ("ROWMQ_DB_PATH".to_owned(), "/tmp/queue.db".to_owned()),
            ("ROWMQ_PORT".to_owned(), "9000".to_owned()),
            ("ROWMQ_QUEUE_MAX_NUMBER_OF_MESSAGES".to_owned(), "25".to_owned()),
            ("ROWMQ_METRICS_PORT".to_owned(), "9100".to_owned()),
        ];

        let config: Config = envy::prefixed("ROWMQ_").from_iter(vars).unwrap();

        assert_eq!(config.db_path(), "/tmp/queue.db");
        assert_eq!(config.port(), 9000);
        assert_eq!(config.queue_max_number_of_messages(), 25);
        assert_eq!(config.max_connections(), 5);
        assert_eq!(config.metrics_port(), 9100);
    }
}
