pub mod colors;
pub mod date;
pub mod files;
pub mod path;
pub mod table;
