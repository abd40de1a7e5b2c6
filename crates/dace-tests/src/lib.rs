//! End-to-end and adversarial test suite for DACE.
//!
//! Integration tests drive the evaluator through its public service API
//! and check the ledger, voting, and distribution invariants under
//! scripted and randomized inputs.
pub mod helpers;
