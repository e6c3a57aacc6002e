use std::time::Duration;

use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[clap(name = "workout server")]
pub struct Cli {
    #[clap(long, env, default_value = "workouts.sqlite")]
    pub sqlite_connection_string: String,
    #[clap(long, env, default_value = "3000")]
    pub port: u16,
    #[clap(long, env, default_value = "127.0.0.1")]
    pub bind_addr: String,
    #[clap(long, env, default_value = "16")]
    pub pool_max_size: usize,

    /// Seconds allowed for reading a request body
    #[arg(long, env, default_value = "10")]
    pub read_timeout_secs: u64,
    /// Seconds allowed for producing a response
    #[arg(long, env, default_value = "20")]
    pub write_timeout_secs: u64,
    /// Seconds a connection may sit without sending a request before it's closed
    #[arg(long, env, default_value = "60")]
    pub idle_timeout_secs: u64,
    /// Seconds a request waits for a pooled connection
    #[arg(long, env, default_value = "5")]
    pub pool_timeout_secs: u64,
}

impl Cli {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn pool_timeout(&self) -> Duration {
        Duration::from_secs(self.pool_timeout_secs)
    }
}
