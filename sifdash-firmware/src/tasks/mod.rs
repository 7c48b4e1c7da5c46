//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod console;
pub mod reporter;
pub mod sif;

pub use console::console_task;
pub use reporter::reporter_task;
pub use sif::sif_task;
