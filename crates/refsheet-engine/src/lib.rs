//! refsheet_engine - Cell content evaluation (addresses, strategy chain, validation).

pub mod engine;
