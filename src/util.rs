use simple_error::{SimpleError, SimpleResult};

use crate::types::Tick;

pub fn get_decay_factor(t: Tick, last_t: Tick, tau: f32, dt: f64) -> f32 {
    let t_diff = t - last_t;
    (-(t_diff as f64) * dt / tau as f64).exp() as f32
}

/// Number of clock steps covering `duration` (ms) at step size `dt` (ms).
pub fn duration_to_ticks(duration: f64, dt: f64) -> SimpleResult<usize> {
    if !duration.is_finite() || duration <= 0.0 {
        return Err(SimpleError::new("duration must be strictly positive"));
    }

    let ticks = (duration / dt).round();

    if ticks < 1.0 {
        return Err(SimpleError::new(format!(
            "duration {} is shorter than one clock step ({})",
            duration, dt
        )));
    }

    Ok(ticks as usize)
}

pub fn time_to_tick(t: f64, dt: f64) -> Tick {
    (t / dt).round() as Tick
}

pub fn tick_to_time(t: Tick, dt: f64) -> f64 {
    t as f64 * dt
}

/// Evenly spaced values from `start` to `stop`, both inclusive.
pub fn linspace(start: f32, stop: f32, num: usize) -> Vec<f32> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop as f64 - start as f64) / (num - 1) as f64;
            (0..num)
                .map(|i| {
                    if i == num - 1 {
                        stop
                    } else {
                        (start as f64 + step * i as f64) as f32
                    }
                })
                .collect()
        }
    }
}
