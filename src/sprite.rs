use std::collections::HashMap;

/// First and last rows of a sprite image containing non-transparent pixels.
/// Used to tighten collision and render bounds to visible content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerticalTrim {
    pub top: u32,
    pub bottom: u32,
}

impl VerticalTrim {
    pub fn height(&self) -> u32 {
        self.bottom - self.top + 1
    }

    /// Scan RGBA pixel data for the first and last rows with any opaque
    /// pixel. Returns `None` for empty or fully transparent images.
    pub fn from_rgba(data: &[u8], width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 || data.len() < (width * height * 4) as usize {
            return None;
        }

        let row_has_content = |y: u32| {
            (0..width).any(|x| data[((y * width + x) * 4 + 3) as usize] != 0)
        };

        let top = (0..height).find(|&y| row_has_content(y))?;
        let bottom = (0..height).rev().find(|&y| row_has_content(y))?;
        Some(Self { top, bottom })
    }
}

/// Every image the two games declare, keyed by a stable id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageId {
    FlappyBird,
    FlappyBackground,
    FlappyGround,
    Pipe,
    DinoRun0,
    DinoRun1,
    DinoStationary,
    DinoLose,
    DinoGround,
    Cactus,
}

impl ImageId {
    pub const ALL: [ImageId; 10] = [
        ImageId::FlappyBird,
        ImageId::FlappyBackground,
        ImageId::FlappyGround,
        ImageId::Pipe,
        ImageId::DinoRun0,
        ImageId::DinoRun1,
        ImageId::DinoStationary,
        ImageId::DinoLose,
        ImageId::DinoGround,
        ImageId::Cactus,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            ImageId::FlappyBird => "Images/flappy.png",
            ImageId::FlappyBackground => "Images/flappy-bg.png",
            ImageId::FlappyGround => "Images/flappy-ground.png",
            ImageId::Pipe => "Images/pipe.png",
            ImageId::DinoRun0 => "Images/dino-run-0.png",
            ImageId::DinoRun1 => "Images/dino-run-1.png",
            ImageId::DinoStationary => "Images/dino-stationary.png",
            ImageId::DinoLose => "Images/dino-lose.png",
            ImageId::DinoGround => "Images/dino-ground.png",
            ImageId::Cactus => "Images/cactus.png",
        }
    }

    /// Images whose transparent padding matters for collision or flush
    /// ground placement get a trim scan on decode.
    pub fn wants_trim(&self) -> bool {
        matches!(self, ImageId::Pipe | ImageId::Cactus | ImageId::DinoGround)
    }
}

/// Metadata for one decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub trim: Option<VerticalTrim>,
}

impl ImageInfo {
    /// Source height to draw from: the trimmed slice when known, otherwise
    /// the full image.
    pub fn src_height(&self) -> u32 {
        self.trim.map(|t| t.height()).unwrap_or(self.height)
    }

    pub fn src_top(&self) -> u32 {
        self.trim.map(|t| t.top).unwrap_or(0)
    }
}

/// Which declared images have finished decoding, with their metadata.
/// An absent entry means "not ready" and render paths fall back to
/// primitive shapes.
#[derive(Debug, Clone, Default)]
pub struct AssetCatalog {
    images: HashMap<ImageId, ImageInfo>,
}

impl AssetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: ImageId, info: ImageInfo) {
        self.images.insert(id, info);
    }

    pub fn get(&self, id: ImageId) -> Option<ImageInfo> {
        self.images.get(&id).copied()
    }

    pub fn contains(&self, id: ImageId) -> bool {
        self.images.contains_key(&id)
    }
}

/// Obstacle sprite measurements frozen at run start, so collision geometry
/// matches the rendered (trimmed) sprite and stays stable for a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteMetrics {
    pub width: u32,
    pub src_height: u32,
}

impl SpriteMetrics {
    pub fn resolve(catalog: &AssetCatalog, id: ImageId) -> Option<Self> {
        let info = catalog.get(id)?;
        if info.width == 0 {
            return None;
        }
        Some(Self {
            width: info.width,
            src_height: info.src_height(),
        })
    }

    /// Rendered height for a destination width, preserving aspect ratio,
    /// never thinner than 8px.
    pub fn scaled_height(&self, dest_width: f64) -> f64 {
        let h = (self.src_height as f64 * dest_width / self.width as f64).round();
        h.max(8.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba(width: u32, height: u32, opaque_rows: &[u32]) -> Vec<u8> {
        let mut data = vec![0u8; (width * height * 4) as usize];
        for &y in opaque_rows {
            // one opaque pixel per row is enough
            data[((y * width) * 4 + 3) as usize] = 255;
        }
        data
    }

    #[test]
    fn test_trim_finds_opaque_row_bounds() {
        let data = rgba(4, 10, &[3, 4, 7]);
        let trim = VerticalTrim::from_rgba(&data, 4, 10).unwrap();
        assert_eq!(trim.top, 3);
        assert_eq!(trim.bottom, 7);
        assert_eq!(trim.height(), 5);
    }

    #[test]
    fn test_trim_of_fully_transparent_image_is_none() {
        let data = rgba(4, 10, &[]);
        assert_eq!(VerticalTrim::from_rgba(&data, 4, 10), None);
    }

    #[test]
    fn test_trim_of_single_opaque_row() {
        let data = rgba(4, 10, &[6]);
        let trim = VerticalTrim::from_rgba(&data, 4, 10).unwrap();
        assert_eq!(trim.top, 6);
        assert_eq!(trim.bottom, 6);
        assert_eq!(trim.height(), 1);
    }

    #[test]
    fn test_trim_rejects_short_buffer() {
        assert_eq!(VerticalTrim::from_rgba(&[0u8; 8], 4, 10), None);
        assert_eq!(VerticalTrim::from_rgba(&[], 0, 0), None);
    }

    #[test]
    fn test_scaled_height_preserves_aspect() {
        // 40px wide sprite with 120px of visible content, drawn 20px wide
        let m = SpriteMetrics { width: 40, src_height: 120 };
        assert_eq!(m.scaled_height(20.0), 60.0);
    }

    #[test]
    fn test_scaled_height_has_floor() {
        let m = SpriteMetrics { width: 100, src_height: 10 };
        assert_eq!(m.scaled_height(10.0), 8.0);
    }

    #[test]
    fn test_metrics_prefer_trimmed_height() {
        let mut catalog = AssetCatalog::new();
        catalog.insert(
            ImageId::Cactus,
            ImageInfo {
                width: 40,
                height: 100,
                trim: Some(VerticalTrim { top: 10, bottom: 89 }),
            },
        );
        let m = SpriteMetrics::resolve(&catalog, ImageId::Cactus).unwrap();
        assert_eq!(m.src_height, 80);
        assert_eq!(SpriteMetrics::resolve(&catalog, ImageId::Pipe), None);
    }
}
