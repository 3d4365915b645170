//! Model export module
//!
//! Durable artifact format shared by the trainer (writer) and the prediction
//! service (reader).

mod serializer;

pub use serializer::{
    from_artifact_bytes, load_model, save_model, to_artifact_bytes, ModelMetadata, SerializedModel,
};
