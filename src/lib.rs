//! MHWMM - REFramework manager for Monster Hunter Wilds
//!
//! Library crate shared by the CLI. The `core` tier (config store, logging,
//! context, game path checks, release tag parsing) has no network or archive
//! dependencies; the `installer` feature adds the release catalog and the
//! install pipeline.

pub mod paths;

pub mod config;
pub mod context;
pub mod games;
pub mod logging;
pub mod version;

#[cfg(feature = "installer")]
pub mod catalog;
#[cfg(feature = "installer")]
pub mod github;
#[cfg(feature = "installer")]
pub mod http;
#[cfg(feature = "installer")]
pub mod installers;
