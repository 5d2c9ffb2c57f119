//! Gemchat is a terminal chat front-end for a hosted Gemini model that keeps
//! the conversation on disk so it survives restarts.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the conversation model, the snapshot store, the model
//!   adapter that talks to the generation endpoint, configuration, and the
//!   conversation controller that ties them together.
//! - [`api`] defines the request/response payloads of the generation API.
//! - [`auth`] resolves the API key from the environment or the system keyring.
//! - [`ui`] is the line-oriented shell that renders the conversation and
//!   forwards user input to the controller.
//! - [`cli`] parses arguments and dispatches subcommands.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod auth;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
