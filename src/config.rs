use crate::error::{
    BadEnvVarSnafu, ParseMaxConnectionsSnafu, ParsePortSnafu, ParseServerAddressSnafu,
    RollcallResult,
};
use dotenvy::var;
use secrecy::{ExposeSecret, SecretString};
use snafu::ResultExt;
use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_MAX_CONNECTIONS: u32 = 15;

#[derive(Clone, Debug)]
pub struct RuntimeConfiguration {
    server_address: SocketAddr,
    db_config: Arc<DbConfig>,
}

impl RuntimeConfiguration {
    pub fn new() -> RollcallResult<Self> {
        Self::from_lookup(|name| var(name))
    }

    /// Builds the configuration from any variable source, so tests don't
    /// have to touch the process environment.
    pub fn from_lookup(
        lookup: impl Fn(&'static str) -> Result<String, dotenvy::Error>,
    ) -> RollcallResult<Self> {
        let port = lookup("PORT").context(BadEnvVarSnafu { name: "PORT" })?;
        let port: u16 = port.trim().parse().context(ParsePortSnafu { original: port })?;

        let host = lookup("SERVER_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let ip: IpAddr = host
            .trim()
            .parse()
            .context(ParseServerAddressSnafu { original: host })?;

        Ok(Self {
            server_address: SocketAddr::new(ip, port),
            db_config: Arc::new(DbConfig::from_lookup(&lookup)?),
        })
    }

    pub const fn server_address(&self) -> SocketAddr {
        self.server_address
    }

    pub fn db_config(&self) -> Arc<DbConfig> {
        self.db_config.clone()
    }
}

#[derive(Debug)]
pub struct DbConfig {
    url: SecretString,
    max_connections: u32,
}

impl DbConfig {
    fn from_lookup(
        lookup: &impl Fn(&'static str) -> Result<String, dotenvy::Error>,
    ) -> RollcallResult<Self> {
        let url = lookup("DATABASE_URL").context(BadEnvVarSnafu {
            name: "DATABASE_URL",
        })?;

        let max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Ok(raw) => raw
                .trim()
                .parse()
                .context(ParseMaxConnectionsSnafu { original: raw })?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            url: SecretString::from(url),
            max_connections,
        })
    }

    pub fn url(&self) -> &str {
        self.url.expose_secret()
    }

    pub const fn max_connections(&self) -> u32 {
        self.max_connections
    }
}
