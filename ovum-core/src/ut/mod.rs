pub mod macros;
pub mod path;
pub mod pool;
pub mod track;
