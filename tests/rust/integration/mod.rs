//! Integration tests - full engine runs over a scripted driver

mod fake_driver;

/// Surface engine logging (routing decisions, mounts, emitted SQL) when a
/// test fails under `RUST_LOG`.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

mod federated_execution_tests;
mod paging_semantics_tests;
mod single_source_tests;
mod where_filter_equivalence_tests;
