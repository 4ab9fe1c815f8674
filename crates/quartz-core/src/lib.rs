//! Quartz Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Quartz indexer
//! and transformation engine. It includes:
//!
//! - **Lines**: The line-indexed text buffer ([`lines::LineStore`]) that is the
//!   single source of truth for a document, plus the integer coordinates
//!   ([`lines::LineRange`], [`lines::ValueCoord`]) used to address it
//! - **Colors**: Color values backed by the `color` crate ([`color::Color`])
//! - **Fields**: The color-bearing emitter fields ([`field::ColorField`])

pub mod color;
pub mod field;
pub mod lines;
