//! Integration tests for the record storage backends

mod fs_scenarios;
mod storage_contract;
