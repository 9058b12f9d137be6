//! influencer-hub - core of an influencer marketing dashboard
//!
//! This library provides the application state container, translations,
//! local persistence and the AI-backed discovery and assistant features.

pub mod ai;
pub mod app;
pub mod config;
pub mod console;
pub mod i18n;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;
pub mod theme;
