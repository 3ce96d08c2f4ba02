//! Unit test suite for isotemplate
//!
//! Fast tests of the public library API that need no binary and no files.
//!
//! ```bash
//! cargo test --test unit
//! ```

mod output_tests;
mod registry_tests;
