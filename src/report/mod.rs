// Human and machine renderings of controller output.

pub mod console;
pub mod json;

pub use console::Console;
pub use json::write_report;
