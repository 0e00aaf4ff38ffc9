pub mod canvas;
pub mod error;
pub mod intersection;
pub mod pattern;
pub mod ray;
pub mod render;
pub mod scene;
pub mod shape;
pub mod transform;

pub use error::{Error, Result};
