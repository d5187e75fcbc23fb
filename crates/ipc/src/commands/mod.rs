//! Commands sent from the UI into the paint subsystem.

mod paint;

pub use paint::PaintCommand;
