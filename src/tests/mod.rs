//! Cross-module tests for the binary and the assessment pipeline.

mod cli_tests;
