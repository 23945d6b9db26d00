pub mod locale;
pub mod logging;
pub mod validation;

pub use locale::{Locale, Messages};
pub use logging::init_tracing;
pub use validation::{validate_fuzzy_port, validate_port, validate_ports};
