//! Embeddable core library for purviewx.
//!
//! Provides a clap-free, I/O-abstracted entry point suitable for linking
//! into another host process.
//!
//! # Port traits
//!
//! All I/O is abstracted behind port traits in [`ports`]:
//! - [`WizardSource`](ports::WizardSource): load the wizard snapshot
//! - [`BinderStore`](ports::BinderStore): find the previous evidence binder
//! - [`WritePort`](ports::WritePort): write files and create directories
//!
//! The [`adapters`] module provides default filesystem-backed implementations.
//!
//! # Entry points
//!
//! - [`run_plan`](pipeline::run_plan): validate and plan
//! - [`run_apply`](pipeline::run_apply): execute the plan on the simulated tenant
//! - [`run_binder`](pipeline::run_binder): generate the next evidence binder

pub mod adapters;
pub mod pipeline;
pub mod ports;
pub mod settings;

pub use pipeline::ToolError;
