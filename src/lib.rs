//! Core library for the `limitprobe` CLI.
//!
//! This crate provides the internal building blocks used by the binary:
//! CLI argument types, configuration parsing, the request driver that
//! fires sequential and burst patterns, response classification, and
//! console reporting. The primary user-facing interface is the
//! `limitprobe` command-line application.
pub mod args;
pub mod config;
pub mod error;
pub mod probe;
