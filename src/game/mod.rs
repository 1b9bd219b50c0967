pub mod calibration;
pub mod chart;
pub mod input;
pub mod judgment;
pub mod note;
pub mod scoring;
pub mod session;
pub mod summary;
pub mod tempo;
