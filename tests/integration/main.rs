//! Integration tests for pumpwatch

mod fakes;
mod pipeline_test;
mod scan_loop_test;
