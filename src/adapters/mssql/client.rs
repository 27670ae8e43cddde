//! SQL Server client
//!
//! Runs one configured query per fetch over a single TDS connection opened
//! by `authenticate`.

use super::rows::{row_to_map, student_projection};
use crate::adapters::vendor::{not_authenticated, unsupported, FetchOutcome, SisVendor};
use crate::config::{HttpConfig, MssqlConfig};
use crate::domain::{Result, VendorError, VendorKind};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::{Map, Value};
use std::time::Duration;
use tiberius::{AuthMethod, Client, Config};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

const KIND: VendorKind = VendorKind::Mssql;

/// SQL Server error number for a rejected login
const LOGIN_FAILED: u32 = 18456;

type TdsClient = Client<Compat<TcpStream>>;

pub struct MssqlClient {
    config: MssqlConfig,
    connect_timeout: Duration,
    connection: Option<Mutex<TdsClient>>,
}

impl MssqlClient {
    pub fn new(config: MssqlConfig, http: &HttpConfig) -> Self {
        Self {
            config,
            connect_timeout: Duration::from_secs(http.timeout_seconds),
            connection: None,
        }
    }

    /// Driver configuration for this server
    pub fn tds_config(&self) -> Config {
        let mut config = Config::new();
        config.host(&self.config.host);
        config.port(self.config.port);
        config.database(&self.config.database);
        config.authentication(AuthMethod::sql_server(
            &self.config.username,
            self.config.password.expose_secret().as_str(),
        ));
        if self.config.trust_cert {
            config.trust_cert();
        }
        config
    }

    async fn connect(&self) -> Result<TdsClient> {
        let config = self.tds_config();
        let addr = config.get_addr();

        let connecting = async {
            let tcp = TcpStream::connect(&addr)
                .await
                .map_err(|e| connection_failed(format!("{addr}: {e}")))?;
            tcp.set_nodelay(true)
                .map_err(|e| connection_failed(format!("{addr}: {e}")))?;
            Client::connect(config, tcp.compat_write())
                .await
                .map_err(map_login_error)
        };

        tokio::time::timeout(self.connect_timeout, connecting)
            .await
            .map_err(|_| connection_failed(format!("{addr}: timed out")))?
    }

    /// Every row of the configured query as a column-name mapping
    pub async fn rows(&self) -> Result<Vec<Map<String, Value>>> {
        let connection = self.connection.as_ref().ok_or_else(|| not_authenticated(KIND))?;
        let mut client = connection.lock().await;

        tracing::debug!(vendor = %KIND, database = %self.config.database, "Running query");
        let rows = client
            .simple_query(self.config.query.as_str())
            .await
            .map_err(query_failed)?
            .into_first_result()
            .await
            .map_err(query_failed)?;

        Ok(rows.into_iter().map(row_to_map).collect())
    }

    /// Student contacts projected from the configured query
    pub async fn students(&self) -> Result<Vec<Value>> {
        Ok(self.rows().await?.iter().map(student_projection).collect())
    }
}

fn connection_failed(message: String) -> crate::domain::SatchelError {
    VendorError::ConnectionFailed {
        vendor: KIND.to_string(),
        message,
    }
    .into()
}

fn query_failed(err: tiberius::error::Error) -> crate::domain::SatchelError {
    VendorError::QueryFailed {
        vendor: KIND.to_string(),
        message: err.to_string(),
    }
    .into()
}

fn map_login_error(err: tiberius::error::Error) -> crate::domain::SatchelError {
    match &err {
        tiberius::error::Error::Server(token) if token.code() == LOGIN_FAILED => {
            VendorError::AuthenticationFailed {
                vendor: KIND.to_string(),
                message: token.message().to_string(),
            }
            .into()
        }
        _ => connection_failed(err.to_string()),
    }
}

#[async_trait]
impl SisVendor for MssqlClient {
    fn kind(&self) -> VendorKind {
        KIND
    }

    /// Open the connection; the login handshake authenticates it
    async fn authenticate(&mut self) -> Result<()> {
        let client = self.connect().await?;
        tracing::info!(
            vendor = %KIND,
            host = %self.config.host,
            database = %self.config.database,
            "Connected"
        );
        self.connection = Some(Mutex::new(client));
        Ok(())
    }

    async fn fetch(&self, collection: &str) -> Result<FetchOutcome> {
        match collection {
            "rows" => Ok(FetchOutcome::new(
                self.rows().await?.into_iter().map(Value::Object).collect(),
            )),
            "students" => Ok(FetchOutcome::new(self.students().await?)),
            other => Err(unsupported(KIND, other)),
        }
    }

    fn is_authenticated(&self) -> bool {
        self.connection.is_some()
    }

    fn base_url(&self) -> &str {
        &self.config.host
    }
}
