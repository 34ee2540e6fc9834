//! Reads [`DatabaseMetadata`] from a live database.

use crate::connection::{self, ConnectionError, JdbcCredentials};
use crate::error::ExportError;
use crate::metadata::DatabaseMetadata;
use may_postgres::Client;
use sea_query::{Expr, ExprTrait, PostgresQueryBuilder, Query, SelectStatement};

/// Source of the live schema compared against the mapped one
pub trait MetadataReader {
    fn read(&self, credentials: &JdbcCredentials) -> Result<DatabaseMetadata, ExportError>;
}

/// Reads `information_schema` of the connection's current schema
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresMetadataReader;

impl MetadataReader for PostgresMetadataReader {
    fn read(&self, credentials: &JdbcCredentials) -> Result<DatabaseMetadata, ExportError> {
        let client = connection::connect(credentials)?;
        let mut metadata = DatabaseMetadata::new();

        for (table, column) in string_pairs(&client, columns_query())? {
            metadata.table_mut(&table).add_column(&column);
        }
        for (table, constraint) in string_pairs(&client, foreign_keys_query())? {
            metadata.table_mut(&table).add_foreign_key(&constraint);
        }
        for sequence in strings(&client, sequences_query())? {
            metadata.add_sequence(&sequence);
        }

        log::info!(
            "Read {} table(s) from {}",
            metadata.table_count(),
            credentials.url
        );
        Ok(metadata)
    }
}

/// information_schema columns are `sql_identifier`, which the driver only reads as text
fn text(column: &str) -> sea_query::Expr {
    Expr::cust(format!("{}::text", column))
}

fn current_schema(column: &'static str) -> sea_query::Expr {
    Expr::col(column).eq(Expr::cust("current_schema()"))
}

pub(crate) fn columns_query() -> SelectStatement {
    Query::select()
        .exprs([text("table_name"), text("column_name")])
        .from(("information_schema", "columns"))
        .and_where(current_schema("table_schema"))
        .to_owned()
}

pub(crate) fn foreign_keys_query() -> SelectStatement {
    Query::select()
        .exprs([text("table_name"), text("constraint_name")])
        .from(("information_schema", "table_constraints"))
        .and_where(current_schema("table_schema"))
        .and_where(Expr::col("constraint_type").eq(Expr::cust("'FOREIGN KEY'")))
        .to_owned()
}

pub(crate) fn sequences_query() -> SelectStatement {
    Query::select()
        .expr(text("sequence_name"))
        .from(("information_schema", "sequences"))
        .and_where(current_schema("sequence_schema"))
        .to_owned()
}

fn run(client: &Client, query: SelectStatement) -> Result<Vec<may_postgres::Row>, ExportError> {
    let (sql, _) = query.build(PostgresQueryBuilder);
    log::debug!("Metadata query: {}", sql);
    client
        .query(sql.as_str(), &[])
        .map_err(|e| ExportError::Connection(ConnectionError::Postgres(e)))
}

fn string_pairs(client: &Client, query: SelectStatement) -> Result<Vec<(String, String)>, ExportError> {
    Ok(run(client, query)?
        .iter()
        .map(|row| (row.get::<_, String>(0), row.get::<_, String>(1)))
        .collect())
}

fn strings(client: &Client, query: SelectStatement) -> Result<Vec<String>, ExportError> {
    Ok(run(client, query)?
        .iter()
        .map(|row| row.get::<_, String>(0))
        .collect())
}
