//! PostgreSQL catalog source.
//!
//! Reads the three tables straight from the catalog database:
//! organizations from `sys.cmplx`, sub-units from `sys.solun` and document
//! types from `gen.tmpls`. Only rows with both display columns filled are
//! fetched. The rest of the filer is synchronous, so the load runs on a
//! private current-thread runtime.

use crate::catalog::{CatalogEntry, CatalogSource, CatalogTables};
use anyhow::{Context, Result};
use sqlx::Connection;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use std::time::Duration;
use tracing::debug;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

// Codes are char(n) in the catalog; cast so padding is handled uniformly.
const ORGANIZATIONS_SQL: &str = "SELECT a.cpxid::text, a.rlvnc::text, a.dirna::text \
     FROM sys.cmplx AS a WHERE a.rlvnc <> '' AND a.dirna <> ''";
const SUB_UNITS_SQL: &str = "SELECT a.slnid::text, a.rlvnc::text, a.dirna::text \
     FROM sys.solun AS a WHERE a.rlvnc <> '' AND a.dirna <> ''";
const DOCUMENT_TYPES_SQL: &str = "SELECT a.tmlid::text, a.rlvnc::text, a.foldr::text \
     FROM gen.tmpls AS a WHERE a.rlvnc <> '' AND a.foldr <> ''";

type CatalogRow = (String, Option<String>, Option<String>);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PgConnectionParams {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: Option<String>,
}

impl PgConnectionParams {
    fn connect_options(&self) -> PgConnectOptions {
        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.dbname)
            .username(&self.user);
        match &self.password {
            Some(password) => options.password(password),
            None => options,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PgCatalog {
    params: PgConnectionParams,
}

impl PgCatalog {
    pub fn new(params: PgConnectionParams) -> Self {
        Self { params }
    }
}

impl CatalogSource for PgCatalog {
    fn describe(&self) -> String {
        format!(
            "postgres {}@{}:{}/{}",
            self.params.user, self.params.host, self.params.port, self.params.dbname
        )
    }

    fn load(&self) -> Result<CatalogTables> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("starting catalog query runtime")?;
        runtime.block_on(self.fetch())
    }
}

impl PgCatalog {
    async fn fetch(&self) -> Result<CatalogTables> {
        let options = self.params.connect_options();
        let mut conn = tokio::time::timeout(CONNECT_TIMEOUT, PgConnection::connect_with(&options))
            .await
            .with_context(|| format!("timed out connecting to {}", self.describe()))?
            .with_context(|| format!("connecting to {}", self.describe()))?;

        let organizations = fetch_table(&mut conn, ORGANIZATIONS_SQL)
            .await
            .context("querying organizations (sys.cmplx)")?;
        let sub_units = fetch_table(&mut conn, SUB_UNITS_SQL)
            .await
            .context("querying sub-units (sys.solun)")?;
        let document_types = fetch_table(&mut conn, DOCUMENT_TYPES_SQL)
            .await
            .context("querying document types (gen.tmpls)")?;

        if let Err(err) = conn.close().await {
            debug!("closing catalog connection: {err}");
        }
        Ok(CatalogTables {
            organizations,
            sub_units,
            document_types,
        })
    }
}

async fn fetch_table(conn: &mut PgConnection, sql: &str) -> Result<Vec<CatalogEntry>> {
    let rows: Vec<CatalogRow> = sqlx::query_as(sql).fetch_all(&mut *conn).await?;
    Ok(rows.into_iter().map(entry_from_row).collect())
}

fn entry_from_row((code, display_code, display_name): CatalogRow) -> CatalogEntry {
    CatalogEntry {
        code: code.trim_end().to_string(),
        display_code,
        display_name,
    }
}
