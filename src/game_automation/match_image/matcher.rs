//! Normalized cross-correlation template matching over captured frames

use super::template::{Template, TemplateLibrary};
use crate::game_automation::backends::TemplateMatcher;
use crate::game_automation::error::{AutomationError, AutomationResult};
use crate::game_automation::types::{Frame, Point};
use async_trait::async_trait;
use image::GrayImage;
use imageproc::template_matching::{MatchTemplateMethod, match_template};

/// Best location of `template` inside `screen`: top-left corner and score.
/// `None` when the template does not fit inside the screen.
pub fn best_match(screen: &GrayImage, template: &GrayImage) -> Option<((u32, u32), f32)> {
    if template.width() > screen.width() || template.height() > screen.height() {
        return None;
    }
    let result = match_template(
        screen,
        template,
        MatchTemplateMethod::CrossCorrelationNormalized,
    );

    let mut max_score = f32::MIN;
    let mut best = (0u32, 0u32);
    for (x, y, pixel) in result.enumerate_pixels() {
        let score = pixel[0];
        if score.is_finite() && score > max_score {
            max_score = score;
            best = (x, y);
        }
    }
    if max_score == f32::MIN {
        return None;
    }
    Some((best, max_score))
}

#[async_trait]
impl TemplateMatcher for TemplateLibrary {
    async fn find(
        &self,
        frame: &Frame,
        image: &str,
        threshold: f64,
    ) -> AutomationResult<Option<(Point, f64)>> {
        let template: Template = self.get(image).map_err(|reason| AutomationError::Template {
            image: image.to_string(),
            reason,
        })?;
        let frame = frame.clone();
        let tpl = template.clone();

        let found = tokio::task::spawn_blocking(move || -> AutomationResult<_> {
            let screen = frame.decode()?.to_luma8();
            Ok(best_match(&screen, &tpl.image))
        })
        .await
        .map_err(|e| AutomationError::Template {
            image: image.to_string(),
            reason: format!("matching task failed: {e}"),
        })??;

        let Some(((x, y), score)) = found else {
            log::debug!("⚠️ Template '{}' larger than frame, skipped", image);
            return Ok(None);
        };
        let score = score as f64;
        if score < threshold {
            log::debug!(
                "👀 Template '{}' best score {:.3} < {:.3}",
                image,
                score,
                threshold
            );
            return Ok(None);
        }
        let (tap_x, tap_y) = template.tap_coordinates(x, y);
        Ok(Some((Point::new(tap_x, tap_y), score)))
    }
}
