/// Per-frame timing handed to every navigation component.
///
/// `elapsed_seconds` is the simulation timeline. Scheduled display events are keyed by it rather
/// than by `tick`, so they fire at the same time regardless of frame rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickContext {
    pub tick: u64,
    pub dt_seconds: f32,
    pub elapsed_seconds: f64,
}

impl TickContext {
    pub fn first(dt_seconds: f32) -> Self {
        Self {
            tick: 0,
            dt_seconds,
            elapsed_seconds: dt_seconds.max(0.0) as f64,
        }
    }

    /// The context for the frame after this one.
    pub fn next(self, dt_seconds: f32) -> Self {
        Self {
            tick: self.tick + 1,
            dt_seconds,
            elapsed_seconds: self.elapsed_seconds + dt_seconds.max(0.0) as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_accumulates_elapsed_time() {
        let ctx = TickContext::first(0.5).next(0.25).next(-1.0);
        assert_eq!(ctx.tick, 2);
        assert!((ctx.elapsed_seconds - 0.75).abs() < 1e-9);
    }
}
