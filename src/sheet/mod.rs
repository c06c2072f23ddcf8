pub mod scoresheet;

pub use scoresheet::{Scoresheet, SheetError};
