pub mod logging;
pub mod output;
pub mod progress;
pub mod utils;

pub use logging::*;
pub use output::{ExportPaths, JsonlWriter};
pub use progress::{create_count_progress_bar, create_spinner};
pub use utils::*;
