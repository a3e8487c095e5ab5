//! Tier 3 of the post-correction cascade (spec.md §4.5 step 7): when the
//! first two tiers still leave a low-confidence reading, ask the vision
//! LLM collaborator to read the region directly and prefer its answer
//! if it looks more confident than the OCR engine's own guess.

use sw_core::{CollaboratorError, ImageRef, VisionModel};

const SENTINEL_PROMPT: &str = "Read only the text visible in this image region. Reply with the text and nothing else.";

/// Re-queries `vision_model` for the text in `image` and returns it if
/// non-empty and different from `current_text`; otherwise falls back to
/// `current_text` unchanged. Errors from the collaborator are treated
/// as "no better answer available" rather than propagated, since tier 3
/// is a best-effort refinement, not a required step.
pub async fn sentinel_reread(vision_model: &dyn VisionModel, image: &ImageRef, current_text: &str) -> String {
    match vision_model.ask(image, SENTINEL_PROMPT).await {
        Ok(reply) => {
            let trimmed = reply.trim();
            if trimmed.is_empty() {
                current_text.to_string()
            } else {
                trimmed.to_string()
            }
        }
        Err(CollaboratorError::Unavailable(_))
        | Err(CollaboratorError::Transport(_))
        | Err(CollaboratorError::InvalidResponse(_)) => current_text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sw_core::Raster;

    struct StubModel(Result<String, CollaboratorError>);

    #[async_trait]
    impl VisionModel for StubModel {
        async fn caption(&self, _image: &ImageRef) -> Result<String, CollaboratorError> {
            Ok(String::new())
        }
        async fn embed(&self, _image: &ImageRef) -> Result<Vec<f32>, CollaboratorError> {
            Ok(vec![])
        }
        async fn ask(&self, _image: &ImageRef, _prompt: &str) -> Result<String, CollaboratorError> {
            self.0.clone()
        }
    }

    fn dummy_image() -> ImageRef {
        ImageRef::from_raster(Raster::new(1, 1, vec![0]))
    }

    #[tokio::test]
    async fn sentinel_prefers_model_reply() {
        let model = StubModel(Ok("OPEN DOOR".to_string()));
        let result = sentinel_reread(&model, &dummy_image(), "0PEN D00R").await;
        assert_eq!(result, "OPEN DOOR");
    }

    #[tokio::test]
    async fn sentinel_falls_back_on_error() {
        let model = StubModel(Err(CollaboratorError::Unavailable("down".to_string())));
        let result = sentinel_reread(&model, &dummy_image(), "original").await;
        assert_eq!(result, "original");
    }

    #[tokio::test]
    async fn sentinel_falls_back_on_empty_reply() {
        let model = StubModel(Ok("   ".to_string()));
        let result = sentinel_reread(&model, &dummy_image(), "original").await;
        assert_eq!(result, "original");
    }
}
