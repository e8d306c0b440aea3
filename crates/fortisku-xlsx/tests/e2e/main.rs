//! End-to-end tests for fortisku-xlsx.
//!
//! Reading tests decode `tests/fixtures/catalog.xlsx`, a deflated workbook
//! produced by `tests/fixtures/make_catalog.py` with Python's `zipfile`, so
//! the inflater and the ZIP reader see output from an independent encoder.
//! Writing tests encode sheets and read them back with `XlsxReader`.
//!
//! Regenerate the fixture with:
//!
//! ```bash
//! python3 crates/fortisku-xlsx/tests/fixtures/make_catalog.py
//! ```

mod common;
mod reading;
mod writing;

pub use common::*;
