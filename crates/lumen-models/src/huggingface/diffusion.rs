//! Text-to-image pipeline. The API answers with an encoded image.

use async_trait::async_trait;
use lumen_abstraction::{ImageBuffer, ModelError, Pipeline, PipelineLoader};
use serde::Serialize;
use tracing::debug;

use super::{HuggingFaceClient, HuggingFaceConfig};

#[derive(Serialize)]
struct ImageRequest<'a> {
    inputs: &'a str,
}

/// Decodes PNG or JPEG bytes into an RGBA8 buffer.
pub fn decode_image(bytes: &[u8]) -> Result<ImageBuffer, ModelError> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| ModelError::InferenceFailure(format!("could not decode image: {e}")))?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(ImageBuffer::new(width, height, rgba.into_raw()))
}

/// Loads a [`HfImagePipeline`].
#[derive(Debug, Clone)]
pub struct HfImageLoader {
    config: HuggingFaceConfig,
    repository: String,
}

impl HfImageLoader {
    #[must_use]
    pub fn new(config: HuggingFaceConfig, repository: impl Into<String>) -> Self {
        Self { config, repository: repository.into() }
    }
}

#[async_trait]
impl PipelineLoader<ImageBuffer> for HfImageLoader {
    async fn load(&self) -> Result<Box<dyn Pipeline<ImageBuffer>>, ModelError> {
        let client = HuggingFaceClient::connect(&self.config)?;
        Ok(Box::new(HfImagePipeline { client, repository: self.repository.clone() }))
    }
}

#[derive(Debug)]
pub struct HfImagePipeline {
    client: HuggingFaceClient,
    repository: String,
}

#[async_trait]
impl Pipeline<ImageBuffer> for HfImagePipeline {
    async fn infer(&self, input: &str) -> Result<ImageBuffer, ModelError> {
        let response = self.client.post_json(&self.repository, &ImageRequest { inputs: input }).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ModelError::RequestError(format!("failed to read image payload: {e}")))?;

        debug!(bytes = bytes.len(), "Image payload received");
        decode_image(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_decode_png() {
        let source = image::RgbaImage::from_pixel(4, 2, image::Rgba([10, 20, 30, 255]));
        let mut png = Vec::new();
        image::DynamicImage::ImageRgba8(source)
            .write_to(&mut Cursor::new(&mut png), image::ImageOutputFormat::Png)
            .unwrap();

        let decoded = decode_image(&png).unwrap();
        assert_eq!((decoded.width, decoded.height), (4, 2));
        assert!(decoded.is_well_formed());
        assert_eq!(&decoded.pixels[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let err = decode_image(b"{\"error\":\"not an image\"}").unwrap_err();
        assert!(matches!(err, ModelError::InferenceFailure(_)));
    }
}
