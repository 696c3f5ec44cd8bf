//! RustyTable - Tree-to-table projection for XML and JSON
//!
//! Flattens hierarchical records into rows and columns the way a
//! spreadsheet-style import does:
//! - Single document: project_xml, project_json
//! - Incremental job over several documents: job_new, job_import_*, job_finish
//! - Independent shards in parallel: project_xml_parallel, project_json_parallel
//! - Record element detection: detect_record_path, detect_json_record_path

// Rust-side API beyond the NIF surface is reached only from tests
#![allow(dead_code)]

use rustler::{Binary, Encoder, Env, NifResult, ResourceArc, Term};

mod core;
mod projection;
mod resource;
mod strategy;
mod term;
mod tree;

use projection::{DocumentFormat, ImportOptions, Projection, Table};
use resource::{ImportJobRef, ImportJobResource};
use term::{decode_options, result_to_term, table_to_term};

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "memory_tracking")]
mod tracking {
    use std::alloc::{GlobalAlloc, Layout};
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub static ALLOCATED: AtomicUsize = AtomicUsize::new(0);
    pub static PEAK_ALLOCATED: AtomicUsize = AtomicUsize::new(0);

    pub struct TrackingAllocator;

    #[cfg(feature = "mimalloc")]
    static UNDERLYING: mimalloc::MiMalloc = mimalloc::MiMalloc;

    #[cfg(not(feature = "mimalloc"))]
    static UNDERLYING: std::alloc::System = std::alloc::System;

    unsafe impl GlobalAlloc for TrackingAllocator {
        unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
            let ptr = UNDERLYING.alloc(layout);
            if !ptr.is_null() {
                let current = ALLOCATED.fetch_add(layout.size(), Ordering::Relaxed) + layout.size();
                let mut peak = PEAK_ALLOCATED.load(Ordering::Relaxed);
                while current > peak {
                    match PEAK_ALLOCATED.compare_exchange_weak(
                        peak,
                        current,
                        Ordering::Relaxed,
                        Ordering::Relaxed,
                    ) {
                        Ok(_) => break,
                        Err(p) => peak = p,
                    }
                }
            }
            ptr
        }

        unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
            ALLOCATED.fetch_sub(layout.size(), Ordering::Relaxed);
            UNDERLYING.dealloc(ptr, layout)
        }
    }
}

#[cfg(feature = "memory_tracking")]
#[global_allocator]
static GLOBAL: tracking::TrackingAllocator = tracking::TrackingAllocator;

#[cfg(all(feature = "mimalloc", not(feature = "memory_tracking")))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

// ============================================================================
// Memory Tracking NIFs
// ============================================================================

#[cfg(feature = "memory_tracking")]
use std::sync::atomic::Ordering;

#[cfg(feature = "memory_tracking")]
#[rustler::nif]
fn get_rust_memory() -> usize {
    tracking::ALLOCATED.load(Ordering::SeqCst)
}

#[cfg(feature = "memory_tracking")]
#[rustler::nif]
fn get_rust_memory_peak() -> usize {
    tracking::PEAK_ALLOCATED.load(Ordering::SeqCst)
}

#[cfg(feature = "memory_tracking")]
#[rustler::nif]
fn reset_rust_memory_stats() -> (usize, usize) {
    let current = tracking::ALLOCATED.load(Ordering::SeqCst);
    let peak = tracking::PEAK_ALLOCATED.swap(current, Ordering::SeqCst);
    (current, peak)
}

#[cfg(not(feature = "memory_tracking"))]
#[rustler::nif]
fn get_rust_memory() -> usize {
    0
}

#[cfg(not(feature = "memory_tracking"))]
#[rustler::nif]
fn get_rust_memory_peak() -> usize {
    0
}

#[cfg(not(feature = "memory_tracking"))]
#[rustler::nif]
fn reset_rust_memory_stats() -> (usize, usize) {
    (0, 0)
}

// ============================================================================
// Single Document Projection
// ============================================================================

fn encode_table<'a>(env: Env<'a>, table: Table) -> Term<'a> {
    table_to_term(env, &table)
}

/// Project one XML document: {:ok, {columns, records}} | {:error, reason}
#[rustler::nif(schedule = "DirtyCpu")]
fn project_xml<'a>(env: Env<'a>, input: Binary<'a>, opts: Term<'a>) -> NifResult<Term<'a>> {
    let options = decode_options(opts)?;
    let result = projection::project_xml(input.as_slice(), &options, log::logger())
        .map(Projection::into_table);
    Ok(result_to_term(env, result, encode_table))
}

/// Project one JSON document
#[rustler::nif(schedule = "DirtyCpu")]
fn project_json<'a>(env: Env<'a>, input: Binary<'a>, opts: Term<'a>) -> NifResult<Term<'a>> {
    let options = decode_options(opts)?;
    let result = projection::project_json(input.as_slice(), &options, log::logger())
        .map(Projection::into_table);
    Ok(result_to_term(env, result, encode_table))
}

/// Record path of an XML document, or nil if nothing repeats enough
#[rustler::nif(schedule = "DirtyCpu")]
fn detect_record_path(input: Binary) -> Option<Vec<String>> {
    projection::detect_record_path(input.as_slice())
}

/// {:ok, path | nil} | {:error, reason} for a JSON document
#[rustler::nif(schedule = "DirtyCpu")]
fn detect_json_record_path<'a>(env: Env<'a>, input: Binary<'a>) -> Term<'a> {
    let result = projection::detect_json_record_path(input.as_slice());
    result_to_term(env, result, |env, path| path.encode(env))
}

// ============================================================================
// Incremental Import Job
// ============================================================================

/// Create an import job (returns ResourceArc)
#[rustler::nif]
fn job_new(opts: Term) -> NifResult<ImportJobRef> {
    let options = decode_options(opts)?;
    Ok(ResourceArc::new(ImportJobResource::new(options)))
}

/// Import one XML document into the job: {:ok, records_added} | {:error, reason}
#[rustler::nif(schedule = "DirtyCpu")]
fn job_import_xml<'a>(env: Env<'a>, job: ImportJobRef, input: Binary<'a>) -> Term<'a> {
    let result = job.with_job(|job| job.import_xml(input.as_slice(), log::logger()));
    result_to_term(env, result, |env, count| count.encode(env))
}

/// Import one JSON document into the job
#[rustler::nif(schedule = "DirtyCpu")]
fn job_import_json<'a>(env: Env<'a>, job: ImportJobRef, input: Binary<'a>) -> Term<'a> {
    let result = job.with_job(|job| job.import_json(input.as_slice(), log::logger()));
    result_to_term(env, result, |env, count| count.encode(env))
}

/// Materialize the job's columns and return the table; the job is spent
#[rustler::nif(schedule = "DirtyCpu")]
fn job_finish<'a>(env: Env<'a>, job: ImportJobRef) -> Term<'a> {
    let result = job.finish().map(Projection::into_table);
    result_to_term(env, result, encode_table)
}

// ============================================================================
// Parallel Shards
// ============================================================================

fn project_parallel<'a>(
    env: Env<'a>,
    inputs: Vec<Binary<'a>>,
    opts: Term<'a>,
    format: DocumentFormat,
) -> NifResult<Term<'a>> {
    let options: ImportOptions = decode_options(opts)?;
    let shards: Vec<&[u8]> = inputs.iter().map(|b| b.as_slice()).collect();
    let result = strategy::project_shards(&shards, format, &options, log::logger());
    Ok(result_to_term(env, result, encode_table))
}

/// Project independent XML documents in parallel and concatenate the tables
#[rustler::nif(schedule = "DirtyCpu")]
fn project_xml_parallel<'a>(env: Env<'a>, inputs: Vec<Binary<'a>>, opts: Term<'a>) -> NifResult<Term<'a>> {
    project_parallel(env, inputs, opts, DocumentFormat::Xml)
}

/// Project independent JSON documents in parallel
#[rustler::nif(schedule = "DirtyCpu")]
fn project_json_parallel<'a>(env: Env<'a>, inputs: Vec<Binary<'a>>, opts: Term<'a>) -> NifResult<Term<'a>> {
    project_parallel(env, inputs, opts, DocumentFormat::Json)
}

// ============================================================================
// NIF Initialization
// ============================================================================

#[allow(non_local_definitions)]
fn load(_env: Env, _info: Term) -> bool {
    // ImportJobResource is registered via #[rustler::resource_impl]
    true
}

rustler::init!("Elixir.RustyTable.Native", load = load);
