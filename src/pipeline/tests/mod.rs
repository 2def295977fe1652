//! Contract tests for the annotation pipeline as a whole

mod roundtrip_tests;
mod scan_pass_tests;
