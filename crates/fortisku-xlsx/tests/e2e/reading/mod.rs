//! Reading tests: decode fixtures and assert on the resulting workbook.

mod data_types;
mod dimensions;
mod sheet_failures;
mod workbook_structure;
