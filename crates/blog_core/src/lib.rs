//! Data model and logic shared by the blog front end.
//!
//! The crate holds no I/O of its own: every network call goes through a
//! [`provider::ContentProvider`], and everything else is a plain transformation
//! over values the caller owns.

pub mod content;
pub mod error;
pub mod provider;

pub use error::{Error, FetchFailure, Result};
