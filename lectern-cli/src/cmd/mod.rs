pub mod config;
pub mod doctor;
pub mod lectures;
pub mod progress;
pub mod quiz;
pub mod save_lecture;
pub mod status;
pub mod summarize;
pub mod transcript;
