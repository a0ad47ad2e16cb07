pub mod enrich;
pub mod export;
pub mod generate;
pub mod import;
pub mod reset;
pub mod stats;
pub mod strip;

pub use enrich::run_enrich;
pub use export::run_export;
pub use generate::run_generate;
pub use import::run_import_corpus;
pub use reset::run_reset;
pub use stats::run_stats;
pub use strip::run_strip;
