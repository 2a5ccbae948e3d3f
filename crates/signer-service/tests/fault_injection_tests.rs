//! Fault injection tests for storage failures
//!
//! Test modules are organized in the fault_injection/ subdirectory.

mod fault_injection;
