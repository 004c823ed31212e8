use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use populator_generate::ProgressCallback;

pub const BAR_WIDTH: usize = 40;
pub const REDRAW_INTERVAL: Duration = Duration::from_millis(100);

/// `[====----] current/total (pct%)`
pub fn render_bar(current: usize, total: usize, width: usize) -> String {
    let ratio = if total > 0 {
        current as f64 / total as f64
    } else {
        0.0
    };
    let filled = ((width as f64 * ratio) as usize).min(width);
    format!(
        "[{}{}] {current}/{total} ({:.1}%)",
        "=".repeat(filled),
        "-".repeat(width - filled),
        ratio * 100.0
    )
}

/// Decides when the bar is worth redrawing.
#[derive(Debug, Default)]
struct Throttle {
    last_draw: Option<Instant>,
}

impl Throttle {
    fn should_draw(&mut self, current: usize, total: usize, now: Instant) -> bool {
        let due = match self.last_draw {
            Some(last) => now.duration_since(last) >= REDRAW_INTERVAL,
            None => true,
        };
        if due || current >= total {
            self.last_draw = Some(now);
            return true;
        }
        false
    }
}

/// Stderr progress bar fed by the engine's progress callback.
pub fn stderr_progress() -> ProgressCallback {
    let throttle = Arc::new(Mutex::new(Throttle::default()));
    Arc::new(move |current: usize, total: usize| {
        let draw = match throttle.lock() {
            Ok(mut throttle) => throttle.should_draw(current, total, Instant::now()),
            Err(_) => current >= total,
        };
        if !draw {
            return;
        }

        let mut stderr = io::stderr().lock();
        let _ = write!(stderr, "\r{}", render_bar(current, total, BAR_WIDTH));
        if current >= total {
            let _ = writeln!(stderr);
        }
        let _ = stderr.flush();
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_layout() {
        assert_eq!(render_bar(0, 4, 8), "[--------] 0/4 (0.0%)");
        assert_eq!(render_bar(1, 4, 8), "[==------] 1/4 (25.0%)");
        assert_eq!(render_bar(4, 4, 8), "[========] 4/4 (100.0%)");
        assert_eq!(render_bar(1, 3, 40).len(), render_bar(0, 3, 40).len());
    }

    #[test]
    fn empty_total_does_not_divide_by_zero() {
        assert_eq!(render_bar(0, 0, 4), "[----] 0/0 (0.0%)");
    }

    #[test]
    fn redraws_are_throttled_except_the_last() {
        let start = Instant::now();
        let mut throttle = Throttle::default();
        assert!(throttle.should_draw(1, 10, start));
        assert!(!throttle.should_draw(2, 10, start + Duration::from_millis(20)));
        assert!(throttle.should_draw(3, 10, start + Duration::from_millis(120)));
        assert!(!throttle.should_draw(4, 10, start + Duration::from_millis(130)));
        assert!(throttle.should_draw(10, 10, start + Duration::from_millis(131)));
    }
}
