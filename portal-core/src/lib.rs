//! Client core for the university portal: session persistence, the
//! authenticated request pipeline, resource controllers, and the schedule
//! and navigation models the browser app renders.

pub mod auth;
pub mod capabilities;
pub mod client;
pub mod config;
pub mod endpoints;
mod error;
pub mod format;
pub mod http;
pub mod navigation;
pub mod resources;
pub mod schedule;
pub mod session;
pub mod validation;

pub use capabilities::{require, visible_actions, Capability};
pub use client::{ApiClient, RequestOptions};
pub use config::PortalConfig;
pub use error::PortalError;
pub use http::{HttpResponse, PendingRequest, ReqwestTransport, Transport};
pub use navigation::{NavigationController, Page, PageLoader};
pub use session::{MemoryStorage, Session, SessionStorage, SessionStore, UserProfile, UserRole};

#[cfg(not(target_arch = "wasm32"))]
pub use session::JsonFileStorage;
