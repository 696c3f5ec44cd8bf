//! Elixir Term Conversion Utilities
//!
//! Decodes import options from an Elixir map and encodes projection tables
//! and results as Elixir terms.

use rustler::types::atom;
use rustler::{Encoder, Env, Error, NewBinary, NifResult, Term};

use crate::projection::{CellValue, ImportOptions, Row, Table};

// Pre-defined atoms for efficiency - created once at compile time
rustler::atoms! {
    ok,
    error,
    record_path,
    limit,
    store_empty_strings,
    guess_cell_value_types,
    trim_strings,
}

/// Decode an options map; missing keys keep their defaults
///
/// Raises `badarg` if `opts` is not a map or a value has the wrong type.
pub fn decode_options(opts: Term<'_>) -> NifResult<ImportOptions> {
    if !opts.is_map() {
        return Err(Error::BadArg);
    }

    let mut options = ImportOptions::default();
    if let Ok(value) = opts.map_get(record_path()) {
        options.record_path = value.decode::<Option<Vec<String>>>()?;
    }
    if let Ok(value) = opts.map_get(limit()) {
        options.limit = value.decode::<Option<usize>>()?;
    }
    if let Ok(value) = opts.map_get(store_empty_strings()) {
        options.store_empty_strings = value.decode()?;
    }
    if let Ok(value) = opts.map_get(guess_cell_value_types()) {
        options.guess_cell_value_types = value.decode()?;
    }
    if let Ok(value) = opts.map_get(trim_strings()) {
        options.trim_strings = value.decode()?;
    }
    Ok(options)
}

/// Convert a string to a binary term (more efficient than .encode())
#[inline]
pub fn str_to_binary<'a>(env: Env<'a>, s: &str) -> Term<'a> {
    let bytes = s.as_bytes();
    let mut binary = NewBinary::new(env, bytes.len());
    binary.as_mut_slice().copy_from_slice(bytes);
    binary.into()
}

/// binary | integer | float | boolean | nil
pub fn cell_to_term<'a>(env: Env<'a>, cell: &Option<CellValue>) -> Term<'a> {
    match cell {
        Some(CellValue::Text(s)) => str_to_binary(env, s),
        Some(CellValue::Integer(i)) => i.encode(env),
        Some(CellValue::Float(f)) => f.encode(env),
        Some(CellValue::Boolean(b)) => b.encode(env),
        None => atom::nil().encode(env),
    }
}

fn row_to_term<'a>(env: Env<'a>, row: &Row) -> Term<'a> {
    let mut list = Term::list_new_empty(env);
    for cell in row.iter().rev() {
        list = list.list_prepend(cell_to_term(env, cell));
    }
    list
}

/// `{columns, records}`; each record a list of rows, each row a list of cells
pub fn table_to_term<'a>(env: Env<'a>, table: &Table) -> Term<'a> {
    let mut columns = Term::list_new_empty(env);
    for name in table.columns.iter().rev() {
        columns = columns.list_prepend(str_to_binary(env, name));
    }

    let mut records = Term::list_new_empty(env);
    for record in table.records.iter().rev() {
        let mut rows = Term::list_new_empty(env);
        for row in record.iter().rev() {
            rows = rows.list_prepend(row_to_term(env, row));
        }
        records = records.list_prepend(rows);
    }

    (columns, records).encode(env)
}

/// `{:ok, value}` or `{:error, reason}` with the reason as a binary
pub fn result_to_term<'a, T, E, F>(env: Env<'a>, result: Result<T, E>, encode: F) -> Term<'a>
where
    E: std::fmt::Display,
    F: FnOnce(Env<'a>, T) -> Term<'a>,
{
    match result {
        Ok(value) => (ok(), encode(env, value)).encode(env),
        Err(reason) => (error(), str_to_binary(env, &reason.to_string())).encode(env),
    }
}
