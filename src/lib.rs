//! formdesk - Self-hosted Form Builder
//!
//! Define forms with typed fields, publish a submission page and record
//! every submitter's answers in a local SQLite file.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              FORMDESK                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                           ROUTER                                 │   │
//! │  │   /  |  /forms/new  |  /forms/create  |  /forms/view/:id        │   │
//! │  │   /forms/submit/:id  |  /static/*  |  /health                   │   │
//! │  └───────────────┬──────────────────────────────┬──────────────────┘   │
//! │                  │                              │                      │
//! │  ┌───────────────▼──────────────┐  ┌────────────▼─────────────────┐   │
//! │  │          FORM STORE          │  │          RENDERER            │   │
//! │  │  forms | form_fields         │  │  list | new | detail         │   │
//! │  │  form_submissions | values   │  │  not found | error           │   │
//! │  └──────────────────────────────┘  └──────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod render;
pub mod routes;

pub use config::ServerConfig;
pub use db::{FormStore, SqliteFormStore, StoreError};
pub use error::AppError;
pub use models::*;
pub use render::Renderer;
pub use routes::{build_router, AppState};
