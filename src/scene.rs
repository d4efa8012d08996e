use crate::geom::Rect;
use crate::sprite::ImageId;

/// CSS color string, the same form the canvas API takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub &'static str);

/// Source sub-rectangle of an image, in image pixels. `None` on a sprite
/// command means the whole image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SrcRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// One drawing operation. Scenes are plain data so game render passes stay
/// pure functions of state and backends stay interchangeable.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Clear,
    FillRect {
        rect: Rect,
        color: Color,
    },
    StrokeRect {
        rect: Rect,
        color: Color,
        line_width: f64,
    },
    FillCircle {
        cx: f64,
        cy: f64,
        r: f64,
        color: Color,
    },
    /// Vertical linear gradient filling the rect.
    Gradient {
        rect: Rect,
        stops: &'static [(f64, &'static str)],
    },
    Sprite {
        image: ImageId,
        src: Option<SrcRect>,
        dst: Rect,
        flip_y: bool,
    },
    Text {
        text: String,
        x: f64,
        y: f64,
        color: Color,
        font: &'static str,
    },
}

/// Score values mirrored into DOM text elements or terminal info lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hud {
    pub score: u32,
    pub best: u32,
    pub over: bool,
}

/// Output of one render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub cmds: Vec<DrawCmd>,
    pub hud: Hud,
}

impl Scene {
    pub fn new(width: f64, height: f64, hud: Hud) -> Self {
        Self {
            width,
            height,
            cmds: vec![DrawCmd::Clear],
            hud,
        }
    }

    pub fn push(&mut self, cmd: DrawCmd) {
        self.cmds.push(cmd);
    }

    /// Tile an image horizontally across the scene at `y`, shifted left by a
    /// scroll offset. The offset is normalized so tiling never snaps as it
    /// wraps.
    pub fn tile_x(&mut self, image: ImageId, tile_w: f64, y: f64, h: f64, offset: f64) {
        if tile_w <= 0.0 {
            return;
        }
        let start_x = -((offset % tile_w) + tile_w) % tile_w;
        let mut x = start_x;
        while x < self.width {
            self.push(DrawCmd::Sprite {
                image,
                src: None,
                dst: Rect::new(x, y, tile_w, h),
                flip_y: false,
            });
            x += tile_w;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> Scene {
        Scene::new(480.0, 640.0, Hud { score: 0, best: 0, over: false })
    }

    #[test]
    fn test_scene_starts_with_clear() {
        assert_eq!(scene().cmds, vec![DrawCmd::Clear]);
    }

    #[test]
    fn test_tile_covers_full_width() {
        let mut s = scene();
        s.tile_x(ImageId::FlappyGround, 100.0, 616.0, 24.0, 0.0);
        let tiles: Vec<&DrawCmd> = s.cmds.iter().skip(1).collect();
        assert_eq!(tiles.len(), 5);
        match tiles[0] {
            DrawCmd::Sprite { dst, .. } => assert_eq!(dst.x, 0.0),
            other => panic!("expected sprite, got {:?}", other),
        }
        match tiles[4] {
            DrawCmd::Sprite { dst, .. } => assert!(dst.x < 480.0 && dst.x + 100.0 >= 480.0),
            other => panic!("expected sprite, got {:?}", other),
        }
    }

    #[test]
    fn test_tile_offset_wraps_without_gap() {
        let mut s = scene();
        // offset far beyond one tile width still starts at or left of zero
        s.tile_x(ImageId::FlappyGround, 100.0, 616.0, 24.0, 730.0);
        match &s.cmds[1] {
            DrawCmd::Sprite { dst, .. } => {
                assert!(dst.x <= 0.0 && dst.x > -100.0, "start x {}", dst.x);
            }
            other => panic!("expected sprite, got {:?}", other),
        }
    }

    #[test]
    fn test_tile_with_zero_width_is_noop() {
        let mut s = scene();
        s.tile_x(ImageId::FlappyGround, 0.0, 616.0, 24.0, 10.0);
        assert_eq!(s.cmds.len(), 1);
    }
}
