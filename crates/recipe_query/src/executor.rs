use recipe_table::Table;
use tracing::{debug, trace};

use crate::connection::Connection;
use crate::errors::{QueryError, Result};
use crate::spec::QuerySpec;

/// Execute a query against an open connection and materialize the result.
///
/// Every placeholder in the spec's template must be bound. Exactly one
/// statement is sent to the database, and it is never retried. A query
/// returning no rows produces an empty table with the driver's declared
/// columns.
pub fn execute<C>(conn: &mut C, spec: &QuerySpec) -> Result<Table>
where
    C: Connection + ?Sized,
{
    if !conn.is_open() {
        return Err(QueryError::ConnectionClosed);
    }

    let bound = spec.to_bound(|pos| conn.placeholder(pos))?;
    debug!(sql = %bound.sql, num_params = bound.params.len(), "executing query");
    trace!(params = ?bound.params, "query params");

    let result = conn.query(&bound.sql, &bound.params)?;
    let table = result.into_table()?;

    debug!(
        num_rows = table.num_rows(),
        num_columns = table.num_columns(),
        "query complete"
    );

    Ok(table)
}
