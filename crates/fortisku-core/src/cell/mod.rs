//! Cell addressing and cell values

mod address;
mod value;

pub use address::{col_ref, column_index_from_ref, CellAddress, CellRange};
pub use value::CellValue;
