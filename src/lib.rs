//! # log4j-fingerprint
//!
//! Identifies which log4j-core release produced a compiled class, using only
//! its bytecode. Works on shaded and renamed jars where manifests and package
//! names cannot be trusted.
//!
//! ## Architecture
//!
//! - **archive**: JAR access, class entry reads and entry listings
//! - **classfile**: class-file decoding into per-method opcode streams
//! - **digest**: content and instruction digests (`ClassHash`)
//! - **known**: known-hash tables mapping digests to version ranges
//! - **signatures**: exact and partial opcode signatures per version
//! - **matcher**: two-pass signature matcher for recompiled classes
//! - **naming**: average package/class name lengths as a shading hint
//! - **identify**: content hash, instruction hash, then signature lookup
//! - **cli** / **config** / **logging**: binary surface

pub mod archive;
pub mod classfile;
pub mod cli;
pub mod config;
pub mod digest;
pub mod error;
pub mod identify;
pub mod known;
pub mod logging;
pub mod matcher;
pub mod naming;
pub mod signatures;

pub use error::{Error, Result};
pub use identify::{Evidence, Fingerprinter, Identification};
