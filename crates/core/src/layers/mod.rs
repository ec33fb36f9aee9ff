//! Map layers module - domain models and service.

mod layers_model;
mod layers_service;

pub use layers_model::{ColorFunction, ColorStyle, Layer, LayerType};
pub use layers_service::LayerService;
