//! Builders for background canvas elements.

use bingo_core::identity::generate_id;
use bingo_core::rng::DeterministicRng;

use super::model::{CanvasElement, ElementType, Point};

/// Default footprint of a placed image.
pub const DEFAULT_IMAGE_SIZE: f64 = 200.0;

impl CanvasElement {
    /// A freehand stroke. The element is anchored at the stroke's first point.
    pub fn path(
        points: Vec<Point>,
        color: &str,
        brush_size: f64,
        author_id: &str,
        rng: &mut dyn DeterministicRng,
    ) -> Self {
        let origin = points.first().copied().unwrap_or(Point { x: 0.0, y: 0.0 });
        Self {
            id: generate_id(rng),
            kind: ElementType::Path,
            x: origin.x,
            y: origin.y,
            color: Some(color.to_owned()),
            brush_size: Some(brush_size),
            content: None,
            points: Some(points),
            width: None,
            height: None,
            author_id: author_id.to_owned(),
        }
    }

    /// A text label at `position`.
    pub fn text(
        position: Point,
        content: &str,
        color: &str,
        author_id: &str,
        rng: &mut dyn DeterministicRng,
    ) -> Self {
        Self {
            id: generate_id(rng),
            kind: ElementType::Text,
            x: position.x,
            y: position.y,
            color: Some(color.to_owned()),
            brush_size: None,
            content: Some(content.to_owned()),
            points: None,
            width: None,
            height: None,
            author_id: author_id.to_owned(),
        }
    }

    /// An image (URL or data URL) at `position`, sized [`DEFAULT_IMAGE_SIZE`].
    pub fn image(
        position: Point,
        source: &str,
        author_id: &str,
        rng: &mut dyn DeterministicRng,
    ) -> Self {
        Self {
            id: generate_id(rng),
            kind: ElementType::Image,
            x: position.x,
            y: position.y,
            color: None,
            brush_size: None,
            content: Some(source.to_owned()),
            points: None,
            width: Some(DEFAULT_IMAGE_SIZE),
            height: Some(DEFAULT_IMAGE_SIZE),
            author_id: author_id.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bingo_core::rng::SeededRng;

    #[test]
    fn test_path_is_anchored_at_first_point() {
        let mut rng = SeededRng::new(1);
        let points = vec![Point { x: 4.0, y: 9.0 }, Point { x: 5.0, y: 10.0 }];

        let element = CanvasElement::path(points.clone(), "#55ACEE", 5.0, "u1", &mut rng);

        assert_eq!(element.kind, ElementType::Path);
        assert_eq!((element.x, element.y), (4.0, 9.0));
        assert_eq!(element.points, Some(points));
        assert_eq!(element.brush_size, Some(5.0));
        assert_eq!(element.author_id, "u1");
    }

    #[test]
    fn test_empty_path_is_anchored_at_origin() {
        let mut rng = SeededRng::new(1);

        let element = CanvasElement::path(Vec::new(), "#000000", 2.0, "u1", &mut rng);

        assert_eq!((element.x, element.y), (0.0, 0.0));
    }

    #[test]
    fn test_image_has_default_footprint_and_no_color() {
        let mut rng = SeededRng::new(2);

        let element = CanvasElement::image(
            Point { x: 150.0, y: 150.0 },
            "https://example.com/cat.png",
            "u2",
            &mut rng,
        );

        assert_eq!(element.kind, ElementType::Image);
        assert_eq!(element.width, Some(DEFAULT_IMAGE_SIZE));
        assert_eq!(element.height, Some(DEFAULT_IMAGE_SIZE));
        assert!(element.color.is_none());
        assert_eq!(element.content.as_deref(), Some("https://example.com/cat.png"));
    }

    #[test]
    fn test_text_carries_content_and_color() {
        let mut rng = SeededRng::new(3);

        let element =
            CanvasElement::text(Point { x: 1.0, y: 2.0 }, "2026!", "#A29BFE", "u3", &mut rng);

        assert_eq!(element.kind, ElementType::Text);
        assert_eq!(element.content.as_deref(), Some("2026!"));
        assert_eq!(element.color.as_deref(), Some("#A29BFE"));
    }
}
