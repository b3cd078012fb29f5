mod session_driver;

pub use session_driver::*;
