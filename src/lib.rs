pub mod calendar;
pub mod error;
pub mod geography;
pub mod impact;
pub mod pipeline;
pub mod profile;
pub mod relations;
pub mod rng;
pub mod scenario;
pub mod schema;
pub mod sink;
pub mod stages;
pub mod summary;

pub use error::GenerationError;
pub use pipeline::{Assembler, AssemblerBuilder, DisasterRecord, DisasterTable};
pub use scenario::{Scenario, ScenarioLoader};
pub use schema::{Column, Schema, SchemaPreset};
