//! Cushion Sim benchmark runner
//!
//! Places non-overlapping balls on the reference table and times full runs.

#[cfg(not(target_arch = "wasm32"))]
mod bench {
    use std::time::Instant;

    use cushion_sim::consts::{BALL_RADIUS, TABLE_HEIGHT, TABLE_WIDTH};
    use cushion_sim::{Arena, BodySpec, Settings, SimResult, Vector2D, simulate};
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    /// Simulated time per run
    const HORIZON: f64 = 120_000.0;
    /// Placement attempts before starting the layout over
    const MAX_ATTEMPTS: u32 = 5000;

    fn random_ball(rng: &mut Pcg32) -> BodySpec {
        let x = rng.random_range(BALL_RADIUS..TABLE_WIDTH - BALL_RADIUS);
        let y = rng.random_range(BALL_RADIUS..TABLE_HEIGHT - BALL_RADIUS);
        let velocity = Vector2D::new(rng.random_range(0.0..0.8), rng.random_range(0.0..0.8));
        BodySpec::new(Vector2D::new(x, y), velocity, BALL_RADIUS)
    }

    fn collides(a: &BodySpec, b: &BodySpec) -> bool {
        a.position.distance(b.position) <= a.radius + b.radius
    }

    /// Rejection-sample `count` balls that don't touch each other
    pub fn random_layout(count: usize, seed: u64) -> Vec<BodySpec> {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut balls: Vec<BodySpec> = Vec::with_capacity(count);

        while balls.len() < count {
            let mut attempts = 0;
            let ball = loop {
                let candidate = random_ball(&mut rng);
                if !balls.iter().any(|b| collides(b, &candidate)) {
                    break candidate;
                }
                attempts += 1;
                if attempts >= MAX_ATTEMPTS {
                    log::debug!("Layout stuck at {} balls, starting over", balls.len());
                    balls.clear();
                    attempts = 0;
                }
            };
            balls.push(ball);
        }

        balls
    }

    pub fn run(count: usize, seed: u64) -> SimResult<()> {
        let arena = Arena::new(TABLE_WIDTH, TABLE_HEIGHT)?;
        let balls = random_layout(count, seed);

        let start = Instant::now();
        let records = simulate(arena, &balls, HORIZON, &Settings::default())?;
        let elapsed = start.elapsed();

        println!(
            "{count} balls: {} events over {HORIZON} time units in {:.2?}",
            records.len() - 1,
            elapsed
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Cushion Sim (native) benchmark starting...");

    for (count, seed) in [(10, 1), (20, 2)] {
        if let Err(err) = bench::run(count, seed) {
            log::error!("Benchmark with {count} balls failed: {err}");
            std::process::exit(1);
        }
    }
    println!("✓ Benchmarks complete");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No benchmark harness in the browser
}
