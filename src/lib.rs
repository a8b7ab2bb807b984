//! EduMind gateway
//!
//! Relays exam-chat requests to the AI backend and hosts conversations with
//! a clarification round-trip.

#![allow(clippy::missing_errors_doc, clippy::must_use_candidate, clippy::module_name_repetitions)]

pub mod api;
pub mod config;
pub mod conversation;
pub mod i18n;
pub mod proxy;
pub mod runtime;
