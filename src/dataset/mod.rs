//! Dataset documents: assembly from resolved bibliographies, the generation run,
//! stripping and export.

pub mod assembler;
pub mod export;
pub mod generator;
pub mod model;
pub mod stripper;

pub use assembler::*;
pub use export::*;
pub use generator::*;
pub use model::*;
pub use stripper::*;
