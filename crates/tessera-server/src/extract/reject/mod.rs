//! Request body extractors whose rejections use the handler error format.

mod enhanced_json;
mod validated_json;

pub use self::enhanced_json::Json;
pub use self::validated_json::ValidateJson;
