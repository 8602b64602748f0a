//! Shared test support: synthesized PE images with hand-picked metadata.

mod image;

pub use image::{ImageBuilder, MetadataBuilder, TestMethod, TestType};
