mod npy;
mod table;

pub use npy::numpy_extent;
pub use npy::read_numpy_bytes;
pub use npy::write_numpy;

pub use table::column_f64;
pub use table::column_str;
pub use table::read_table;
pub use table::write_table;
pub use table::write_table_csv;
pub use table::write_table_pq;
pub use table::write_table_tsv;
