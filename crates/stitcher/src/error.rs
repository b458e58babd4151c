use serde_json::Value;
use thiserror::Error;

/// Data-integrity failures. None of these are retried: the input has to be
/// fixed upstream.
#[derive(Debug, Error)]
pub enum StitchError {
    #[error("region matches no known shape: {0}")]
    UnrecognizedRegionShape(Value),

    #[error("malformed {shape} region {region}: {source}")]
    MalformedRegion {
        shape: &'static str,
        region: Value,
        #[source]
        source: serde_json::Error,
    },

    #[error("sprite {0} is referenced by an icon but was not loaded")]
    SpriteNotFound(u32),

    #[error("map {0} has an empty region list")]
    EmptyRegionList(i32),
}
