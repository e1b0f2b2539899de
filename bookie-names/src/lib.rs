//! # bookie-names
//!
//! Tera-based resolution of multilingual name templates into finished
//! name sets.
//!
//! ## Usage
//!
//! ```rust
//! use bookie_core::{AttributeBag, NameTemplate};
//! use bookie_names::resolve;
//!
//! let template = NameTemplate::default()
//!     .with_pattern("en", "Handy Cap - {HC}")
//!     .with_parameter("HC", "handy_cap");
//! let attributes = AttributeBag::new().with("handy_cap", 3.5);
//!
//! let names = resolve(&template, &attributes).unwrap();
//! assert_eq!(names.get("en"), Some("Handy Cap - 3.5"));
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use context::ParameterBinding;
pub use engine::{placeholders, resolve};
pub use error::ResolveError;
