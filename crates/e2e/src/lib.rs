//! Club Administration E2E Test Framework
//!
//! This crate drives the club administration console end to end:
//! - Registers a throwaway admin user through the backend API
//! - Controls Chromium over the DevTools Protocol
//! - Locates elements by CSS, ARIA role and text, with polling assertions
//! - Captures the API responses that UI actions trigger
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    E2E Test Runner (Rust)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner                                                  │
//! │    ├── before_all() -> ApiContext + SuiteFixtures           │
//! │    ├── BrowserSession::launch() -> AppPage                  │
//! │    ├── suite test, recorded step by step in a StepLog       │
//! │    └── after_all() + write_results()                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  console helpers                                            │
//! │    ├── login_via_ui                                         │
//! │    ├── create_root_category_via_ui / create_sub_category…   │
//! │    ├── go_to_last_pagination_page                           │
//! │    └── expect_success_toast_to_show_and_auto_dismiss        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Locator ── expect() ── poll_until()                        │
//! │  ResponseWaiter (registered before the triggering click)    │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod browser;
pub mod config;
pub mod console;
pub mod error;
pub mod expect;
pub mod fixtures;
pub mod locator;
pub mod model;
pub mod network;
pub mod page;
pub mod runner;
pub mod suite;
pub mod wait;

pub use config::SuiteConfig;
pub use error::{E2eError, E2eResult};
pub use runner::TestRunner;
