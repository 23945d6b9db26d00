pub mod check;
pub mod kill;

pub use check::{CheckCommand, CheckOptions};
pub use kill::KillCommand;
