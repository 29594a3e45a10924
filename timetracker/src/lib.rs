mod auth;
mod client;
pub mod dates;
mod domain;
mod error;
pub mod form;
mod report;
mod site;
mod tracker_url;
mod workflow;

pub use auth::*;
pub use client::*;
pub use domain::*;
pub use error::*;
pub use form::{FormPayload, FormState, OptionSet, PartialUpdate, SelectOption, Selection, Tokens};
pub use report::*;
pub use site::*;
pub use tracker_url::*;
pub use workflow::*;
