use crate::config::MediaConfig;
use ballsync_core::{CoordinatePair, Frame};

const BALL_COLOR: [u8; 3] = [0, 255, 0];

/// Synthetic frame source: a green ball bouncing inside the canvas.
#[derive(Debug, Clone)]
pub struct BallGenerator {
    width: u32,
    height: u32,
    radius: u32,
    position: CoordinatePair,
    velocity: CoordinatePair,
    physics_divisor: u32,
    frame_index: u64,
}

impl BallGenerator {
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            radius: config.radius,
            position: config.start,
            velocity: config.velocity,
            physics_divisor: config.physics_divisor.max(1),
            frame_index: 0,
        }
    }

    pub fn position(&self) -> CoordinatePair {
        self.position
    }

    pub fn velocity(&self) -> CoordinatePair {
        self.velocity
    }

    /// Renders the next frame, advancing the physics on every
    /// `physics_divisor`-th call.
    pub fn next_frame(&mut self) -> Frame {
        if self.frame_index % u64::from(self.physics_divisor) == 0 {
            self.tick();
        }
        self.frame_index += 1;
        self.render()
    }

    /// One physics step: move, stay inside the canvas, reflect on contact.
    pub fn tick(&mut self) {
        let (x, vx) = step_axis(self.position.x, self.velocity.x, self.width as i32);
        let (y, vy) = step_axis(self.position.y, self.velocity.y, self.height as i32);
        self.position = CoordinatePair::new(x, y);
        self.velocity = CoordinatePair::new(vx, vy);
    }

    /// Black canvas with a filled disc at the current position.
    pub fn render(&self) -> Frame {
        let mut frame = Frame::blank(self.width, self.height);
        draw_disc(&mut frame, self.position, self.radius);
        frame
    }
}

fn step_axis(pos: i32, vel: i32, bound: i32) -> (i32, i32) {
    let next = pos.saturating_add(vel).clamp(0, bound);
    let outward = (next <= 0 && vel < 0) || (next >= bound && vel > 0);
    if outward { (next, -vel) } else { (next, vel) }
}

pub(crate) fn draw_disc(frame: &mut Frame, center: CoordinatePair, radius: u32) {
    let r = radius as i64;
    let (cx, cy) = (i64::from(center.x), i64::from(center.y));
    let y0 = (cy - r).max(0);
    let y1 = (cy + r).min(i64::from(frame.height) - 1);
    let x0 = (cx - r).max(0);
    let x1 = (cx + r).min(i64::from(frame.width) - 1);

    for y in y0..=y1 {
        let dy = y - cy;
        for x in x0..=x1 {
            let dx = x - cx;
            if dx * dx + dy * dy <= r * r {
                frame.set_pixel(x as u32, y as u32, BALL_COLOR);
            }
        }
    }
}
