//! Pure-computation RGBA rasterizer for a [`GravitySim`] frame.
//!
//! This module is always available (no feature gate); the `png` snapshot
//! path only encodes the buffer produced here. Everything is drawn with
//! straight alpha blending onto an opaque RGBA8 framebuffer.

use gravity_points_core::clock::DEFAULT_FPS;
use gravity_points_core::error::EngineError;
use gravity_points_core::theme::Shape;
use gravity_points_core::ui::Rect;
use gravity_points_core::{GravitySim, Srgb, Theme, Vector2, Xorshift64};

/// Mixed into the run seed so stars do not mirror particle spawns.
const STAR_SALT: u64 = 0x5747_A125_0000_0001;

/// Opaque RGBA8 image, row-major, four bytes per pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Framebuffer {
    /// Creates a black framebuffer.
    ///
    /// Returns `EngineError::InvalidDimensions` if either dimension is zero
    /// or the byte length overflows.
    pub fn new(width: usize, height: usize) -> Result<Self, EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        let len = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(4))
            .ok_or(EngineError::InvalidDimensions)?;
        let mut data = vec![0u8; len];
        data.chunks_exact_mut(4).for_each(|px| px[3] = 255);
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// RGBA bytes at (x, y), or `None` outside the image.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    pub fn clear(&mut self, color: Srgb) {
        let [r, g, b] = color.to_rgb8();
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&[r, g, b, 255]);
        }
    }

    /// Blends `color` over the pixel at (x, y) with opacity `alpha`.
    /// Coordinates outside the image are ignored.
    pub fn blend_pixel(&mut self, x: i64, y: i64, color: Srgb, alpha: f64) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let a = if alpha.is_nan() { 0.0 } else { alpha.clamp(0.0, 1.0) };
        if a == 0.0 {
            return;
        }
        let i = (y as usize * self.width + x as usize) * 4;
        for (dst, src) in self.data[i..i + 3].iter_mut().zip(color.to_rgb8()) {
            let d = *dst as f64;
            *dst = (d + (src as f64 - d) * a).round() as u8;
        }
    }

    /// Fills every pixel whose center lies inside `rect`.
    pub fn fill_rect(&mut self, rect: Rect, color: Srgb, alpha: f64) {
        let (x0, x1) = pixel_span(rect.x, rect.x + rect.w, self.width);
        let (y0, y1) = pixel_span(rect.y, rect.y + rect.h, self.height);
        for y in y0..y1 {
            for x in x0..x1 {
                self.blend_pixel(x, y, color, alpha);
            }
        }
    }

    /// Axis-aligned square of side `2 * half` centered on `center`.
    pub fn fill_square(&mut self, center: Vector2, half: f64, color: Srgb, alpha: f64) {
        let rect = Rect::new(center.x - half, center.y - half, 2.0 * half, 2.0 * half);
        self.fill_rect(rect, color, alpha);
    }

    /// Filled disc. The pixel holding `center` is always painted so that
    /// sub-pixel radii stay visible.
    pub fn fill_circle(&mut self, center: Vector2, radius: f64, color: Srgb, alpha: f64) {
        if !center.is_finite() || !(radius > 0.0) {
            return;
        }
        self.for_disc_pixels(center, radius, |fb, x, y, dist| {
            if dist <= radius {
                fb.blend_pixel(x, y, color, alpha);
            }
        });
        let (cx, cy) = (center.x.floor() as i64, center.y.floor() as i64);
        let painted = {
            let dx = cx as f64 + 0.5 - center.x;
            let dy = cy as f64 + 0.5 - center.y;
            dx.hypot(dy) <= radius
        };
        if !painted {
            self.blend_pixel(cx, cy, color, alpha);
        }
    }

    /// Ring of the given `thickness` whose outer edge is `radius`.
    pub fn stroke_circle(
        &mut self,
        center: Vector2,
        radius: f64,
        thickness: f64,
        color: Srgb,
        alpha: f64,
    ) {
        if !center.is_finite() || !(radius > 0.0) {
            return;
        }
        let inner = (radius - thickness).max(0.0);
        self.for_disc_pixels(center, radius, |fb, x, y, dist| {
            if dist <= radius && dist >= inner {
                fb.blend_pixel(x, y, color, alpha);
            }
        });
    }

    fn for_disc_pixels<F>(&mut self, center: Vector2, radius: f64, mut f: F)
    where
        F: FnMut(&mut Self, i64, i64, f64),
    {
        let x0 = ((center.x - radius).floor() as i64).max(0);
        let y0 = ((center.y - radius).floor() as i64).max(0);
        let x1 = ((center.x + radius).ceil() as i64).min(self.width as i64 - 1);
        let y1 = ((center.y + radius).ceil() as i64).min(self.height as i64 - 1);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f64 + 0.5 - center.x;
                let dy = y as f64 + 0.5 - center.y;
                f(self, x, y, dx.hypot(dy));
            }
        }
    }
}

/// Pixel index range covering [start, end), clipped to [0, limit).
fn pixel_span(start: f64, end: f64, limit: usize) -> (i64, i64) {
    let limit = limit as i64;
    (
        (start.round() as i64).clamp(0, limit),
        (end.round() as i64).clamp(0, limit),
    )
}

fn inset(rect: Rect, by: f64) -> Rect {
    Rect::new(
        rect.x + by,
        rect.y + by,
        (rect.w - 2.0 * by).max(0.0),
        (rect.h - 2.0 * by).max(0.0),
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub position: Vector2,
    pub size: f64,
}

/// Static background stars that twinkle over time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Starfield {
    stars: Vec<Star>,
}

impl Starfield {
    /// `count` stars at seeded random positions with sizes in [0.5, 2).
    pub fn generate(count: usize, width: f64, height: f64, seed: u64) -> Self {
        let mut rng = Xorshift64::new(seed ^ STAR_SALT);
        let stars = (0..count)
            .map(|_| Star {
                position: rng.next_point(width, height),
                size: rng.next_range(0.5, 2.0),
            })
            .collect();
        Self { stars }
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }
}

/// Gray level in [50, 255] of a star at horizontal position `x`.
pub fn star_brightness(x: f64, time_ms: f64) -> f64 {
    (100.0 + 55.0 * (time_ms * 0.001 + x * 0.01).sin()).clamp(50.0, 255.0)
}

/// Wall-clock milliseconds a frame index corresponds to at the default rate.
pub fn frame_time_ms(frame: u64) -> f64 {
    frame as f64 * 1000.0 / DEFAULT_FPS as f64
}

/// Draws one frame of `sim` in `theme`. `time_ms` drives the star twinkle
/// and attractor pulse.
pub fn render(
    sim: &GravitySim,
    theme: &Theme,
    stars: &Starfield,
    time_ms: f64,
) -> Result<Framebuffer, EngineError> {
    let mut fb = Framebuffer::new(sim.width() as usize, sim.height() as usize)?;
    fb.clear(theme.background);

    for star in stars.stars() {
        let level = star_brightness(star.position.x, time_ms) / 255.0;
        let radius = star.size.floor().max(1.0);
        fb.fill_circle(star.position, radius, Srgb::WHITE.scale(level), 1.0);
    }

    for particle in sim.particles() {
        let color = theme.particle_color(particle.tint);
        if theme.draw_trails {
            if let Some(trail) = &particle.trail {
                let n = trail.len() as f64;
                for (i, point) in trail.iter().enumerate() {
                    let frac = i as f64 / n;
                    let size = particle.radius * frac * 0.5;
                    if size > 0.5 {
                        fb.fill_circle(*point, size, color, frac * 0.3);
                    }
                }
            }
        }
        if theme.particle_glow {
            fb.fill_circle(particle.position, particle.radius * 3.0, color, 30.0 / 255.0);
        }
        match theme.particle_shape {
            Shape::Circle => fb.fill_circle(particle.position, particle.radius, color, 1.0),
            Shape::Square => fb.fill_square(particle.position, particle.radius, color, 1.0),
        }
    }

    for (i, attractor) in sim.attractors().iter().enumerate() {
        let mut size = theme.attractor_size;
        if theme.attractor_pulse {
            size = (size * (1.0 + 0.3 * (time_ms * 0.005 + i as f64).sin())).trunc();
            fb.fill_circle(attractor.position, size * 3.0, theme.attractor_color, 50.0 / 255.0);
        }
        match theme.attractor_shape {
            Shape::Circle => fb.fill_circle(attractor.position, size, theme.attractor_color, 1.0),
            Shape::Square => fb.fill_square(attractor.position, size, theme.attractor_color, 1.0),
        }
        if theme.attractor_pulse {
            fb.stroke_circle(attractor.position, size, 2.0, Srgb::WHITE, 1.0);
        }
    }

    if let Some(panel) = sim.panel() {
        let chrome = theme.chrome;
        fb.fill_rect(panel.region, chrome.background, chrome.bar_alpha);

        let track = panel.slider.rect;
        fb.fill_rect(track, chrome.border, 1.0);
        fb.fill_rect(inset(track, 2.0), chrome.background, 1.0);
        let handle_x = track.x + panel.slider.fraction() * track.w;
        let handle = Rect::new(handle_x - 8.0, track.y - 5.0, 16.0, track.h + 10.0);
        fb.fill_rect(handle, chrome.slider_active, 1.0);

        for button in &panel.buttons {
            let face = if button.hovered {
                chrome.button_hover
            } else {
                chrome.background
            };
            fb.fill_rect(button.rect, chrome.border, 1.0);
            fb.fill_rect(inset(button.rect, 2.0), face, 1.0);
        }
    }

    Ok(fb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Variant;
    use gravity_points_core::InputEvent;
    use serde_json::json;

    fn empty_sim(variant: Variant, width: usize, height: usize) -> GravitySim {
        variant
            .build(width, height, 7, &json!({"particle_count": 0}), Some(&[]))
            .unwrap()
    }

    #[test]
    fn new_rejects_zero_dimensions() {
        assert!(matches!(
            Framebuffer::new(0, 4),
            Err(EngineError::InvalidDimensions)
        ));
        assert!(Framebuffer::new(4, usize::MAX).is_err());
    }

    #[test]
    fn new_is_opaque_black() {
        let fb = Framebuffer::new(3, 2).unwrap();
        assert_eq!(fb.data().len(), 3 * 2 * 4);
        assert_eq!(fb.pixel(2, 1), Some([0, 0, 0, 255]));
        assert_eq!(fb.pixel(3, 0), None);
    }

    #[test]
    fn blend_half_alpha_mixes_channels() {
        let mut fb = Framebuffer::new(1, 1).unwrap();
        fb.blend_pixel(0, 0, Srgb::WHITE, 0.5);
        assert_eq!(fb.pixel(0, 0), Some([128, 128, 128, 255]));
    }

    #[test]
    fn drawing_off_screen_is_clipped() {
        let mut fb = Framebuffer::new(8, 8).unwrap();
        fb.fill_circle(Vector2::new(-50.0, -50.0), 4.0, Srgb::WHITE, 1.0);
        fb.fill_rect(Rect::new(100.0, 100.0, 5.0, 5.0), Srgb::WHITE, 1.0);
        fb.blend_pixel(-1, 3, Srgb::WHITE, 1.0);
        assert!(fb.data().chunks_exact(4).all(|px| px == [0, 0, 0, 255]));
    }

    #[test]
    fn fill_circle_covers_center_not_corners() {
        let mut fb = Framebuffer::new(16, 16).unwrap();
        fb.fill_circle(Vector2::new(8.0, 8.0), 3.0, Srgb::WHITE, 1.0);
        assert_eq!(fb.pixel(8, 8), Some([255, 255, 255, 255]));
        assert_eq!(fb.pixel(0, 0), Some([0, 0, 0, 255]));
        assert_eq!(fb.pixel(11, 11), Some([0, 0, 0, 255]));
    }

    #[test]
    fn tiny_circle_still_paints_its_pixel() {
        let mut fb = Framebuffer::new(4, 4).unwrap();
        fb.fill_circle(Vector2::new(2.1, 1.1), 0.2, Srgb::WHITE, 1.0);
        assert_eq!(fb.pixel(2, 1), Some([255, 255, 255, 255]));
    }

    #[test]
    fn stroke_circle_leaves_center_empty() {
        let mut fb = Framebuffer::new(32, 32).unwrap();
        fb.stroke_circle(Vector2::new(16.0, 16.0), 8.0, 2.0, Srgb::WHITE, 1.0);
        assert_eq!(fb.pixel(16, 16), Some([0, 0, 0, 255]));
        assert_eq!(fb.pixel(23, 16), Some([255, 255, 255, 255]));
    }

    #[test]
    fn fill_square_spans_twice_half() {
        let mut fb = Framebuffer::new(8, 8).unwrap();
        fb.fill_square(Vector2::new(4.0, 4.0), 1.0, Srgb::WHITE, 1.0);
        let lit = fb
            .data()
            .chunks_exact(4)
            .filter(|px| px[0] == 255)
            .count();
        assert_eq!(lit, 4);
    }

    #[test]
    fn mono_attractor_is_green_on_black() {
        let mut sim = empty_sim(Variant::Classic, 64, 64);
        sim.add_attractor(Vector2::new(32.5, 32.5));
        let fb = render(&sim, &Theme::mono(), &Starfield::default(), 0.0).unwrap();
        assert_eq!(fb.pixel(32, 32), Some([0, 255, 100, 255]));
        assert_eq!(fb.pixel(0, 0), Some([0, 0, 0, 255]));
    }

    #[test]
    fn particles_are_drawn_in_theme_color() {
        let sim = Variant::Tidal
            .build(32, 32, 5, &json!({"particle_count": 20}), Some(&[]))
            .unwrap();
        let fb = render(&sim, &Theme::matrix(), &Starfield::default(), 0.0).unwrap();
        let green = fb
            .data()
            .chunks_exact(4)
            .filter(|px| *px == [0, 255, 100, 255])
            .count();
        assert!(green > 0);
    }

    #[test]
    fn panel_bar_tints_top_rows_only() {
        let theme = Theme {
            stars: 0,
            ..Theme::nebula()
        };
        let sim = empty_sim(Variant::Enhanced, 640, 200);
        let fb = render(&sim, &theme, &Starfield::default(), 0.0).unwrap();
        let bg = theme.background.to_rgb8();
        let top = fb.pixel(600, 10).unwrap();
        let below = fb.pixel(600, 150).unwrap();
        assert_ne!(&top[..3], &bg[..]);
        assert_eq!(&below[..3], &bg[..]);
    }

    #[test]
    fn hovered_button_changes_color() {
        let theme = Theme::nebula();
        let mut sim = empty_sim(Variant::Enhanced, 640, 200);
        let before = render(&sim, &theme, &Starfield::default(), 0.0).unwrap();
        sim.frame([InputEvent::MouseMove {
            position: Vector2::new(300.0, 60.0),
        }]);
        let after = render(&sim, &theme, &Starfield::default(), 0.0).unwrap();
        assert_ne!(before.pixel(330, 60), after.pixel(330, 60));
    }

    #[test]
    fn starfield_is_seeded() {
        let a = Starfield::generate(200, 640.0, 480.0, 11);
        let b = Starfield::generate(200, 640.0, 480.0, 11);
        assert_eq!(a, b);
        assert_eq!(a.stars().len(), 200);
        assert!(a.stars().iter().all(|s| (0.5..2.0).contains(&s.size)
            && s.position.x < 640.0
            && s.position.y < 480.0));
    }

    #[test]
    fn star_brightness_stays_in_range() {
        for t in [0.0, 1234.5, 1.0e7] {
            for x in [0.0, 157.0, 2559.0] {
                let b = star_brightness(x, t);
                assert!((50.0..=255.0).contains(&b));
            }
        }
    }

    #[test]
    fn frame_time_is_sixty_per_second() {
        assert_eq!(frame_time_ms(0), 0.0);
        assert_eq!(frame_time_ms(60), 1000.0);
    }

    #[test]
    fn trails_render_behind_moving_particles() {
        let mut sim = Variant::Enhanced
            .build(
                200,
                200,
                3,
                &json!({"particle_count": 1, "min_radius": 3.0, "max_radius": 3.0}),
                Some(&[]),
            )
            .unwrap();
        for _ in 0..30 {
            sim.advance();
        }
        let theme = Theme {
            particle_glow: false,
            stars: 0,
            ..Theme::nebula()
        };
        let with = render(&sim, &theme, &Starfield::default(), 0.0).unwrap();
        let without = render(
            &sim,
            &Theme {
                draw_trails: false,
                ..theme.clone()
            },
            &Starfield::default(),
            0.0,
        )
        .unwrap();
        assert_ne!(with, without);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn shapes_anywhere_keep_the_buffer_opaque(
                x in -1.0e6f64..1.0e6,
                y in -1.0e6f64..1.0e6,
                r in 0.0f64..40.0,
                alpha in -1.0f64..2.0,
            ) {
                let mut fb = Framebuffer::new(24, 16).unwrap();
                let c = Vector2::new(x, y);
                fb.fill_circle(c, r, Srgb::WHITE, alpha);
                fb.stroke_circle(c, r, 2.0, Srgb::WHITE, alpha);
                fb.fill_square(c, r, Srgb::WHITE, alpha);
                prop_assert_eq!(fb.data().len(), 24 * 16 * 4);
                prop_assert!(fb.data().chunks_exact(4).all(|px| px[3] == 255));
            }
        }
    }
}
