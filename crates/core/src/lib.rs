//! Domain model and pure logic for the ClearSkyIQ visualization front-end.
//!
//! Everything here is free of I/O: request validation, the wire shapes
//! exchanged with the Harmony API, the job-poll state machine and the
//! view-state decisions the presentation layer renders.

pub mod envelope;
pub mod error;
pub mod job;
pub mod plot;
pub mod poll;
pub mod request;
pub mod types;
pub mod view;
