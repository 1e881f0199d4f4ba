use rand::Rng;

const BALLOON_SYMBOLS: [char; 3] = ['o', 'O', '0'];

/// Animation length in seconds
const DURATION_SECS: f64 = 4.0;

/// A balloon floating up the screen
#[derive(Debug, Clone)]
pub struct Balloon {
    pub x: f64,
    pub y: f64,
    pub symbol: char,
    pub color_index: usize,
    rise_speed: f64,
    sway: f64,
    sway_phase: f64,
}

impl Balloon {
    fn launch<R: Rng + ?Sized>(width: f64, height: f64, rng: &mut R) -> Self {
        Self {
            x: rng.gen_range(0.0..width.max(1.0)),
            // stagger the start below the bottom edge
            y: height + rng.gen_range(0.0..height.max(1.0) / 2.0),
            symbol: BALLOON_SYMBOLS[rng.gen_range(0..BALLOON_SYMBOLS.len())],
            color_index: rng.gen_range(0..7),
            rise_speed: rng.gen_range(4.0..9.0),
            sway: rng.gen_range(0.5..1.5),
            sway_phase: rng.gen_range(0.0..std::f64::consts::TAU),
        }
    }

    fn update(&mut self, dt: f64, elapsed: f64) {
        self.y -= self.rise_speed * dt;
        self.x += (elapsed * 2.0 + self.sway_phase).sin() * self.sway * dt;
    }

    /// The string hanging below the balloon, one row down
    pub fn string_y(&self) -> f64 {
        self.y + 1.0
    }
}

/// Balloons released when a session ends with every answer correct.
#[derive(Debug, Default)]
pub struct Celebration {
    pub balloons: Vec<Balloon>,
    elapsed: f64,
    active: bool,
    height: f64,
}

impl Celebration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start<R: Rng + ?Sized>(&mut self, width: u16, height: u16, rng: &mut R) {
        let (w, h) = (f64::from(width), f64::from(height));
        let count = (width as usize / 3).clamp(8, 40);
        self.balloons = (0..count).map(|_| Balloon::launch(w, h, rng)).collect();
        self.elapsed = 0.0;
        self.height = h;
        self.active = true;
    }

    pub fn stop(&mut self) {
        self.active = false;
        self.balloons.clear();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Advance by `dt` seconds; stops once the time is up or every balloon has left.
    pub fn update(&mut self, dt: f64) {
        if !self.active {
            return;
        }
        self.elapsed += dt;
        let elapsed = self.elapsed;
        for balloon in &mut self.balloons {
            balloon.update(dt, elapsed);
        }
        self.balloons.retain(|b| b.string_y() >= 0.0);

        if self.elapsed >= DURATION_SECS || self.balloons.is_empty() {
            self.stop();
        }
    }
}
