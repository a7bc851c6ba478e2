//! File inventory collection

mod inventory;
mod scanner;

pub use inventory::{FileInfo, ScanOptions};
pub use scanner::ProjectScanner;
