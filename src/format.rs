//! Display helpers for elapsed seconds.

/// `1h 2m 3s`, always showing all three units. Used for running tasks.
pub fn clock(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    format!("{}h {}m {}s", hours, minutes, seconds % 60)
}

/// Drops the units that carry no information: `42s`, `4m`, `4m 10s`, `2h`, `2h 5m`.
pub fn friendly(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        let minutes = seconds / 60;
        match seconds % 60 {
            0 => format!("{}m", minutes),
            s => format!("{}m {}s", minutes, s),
        }
    } else {
        let hours = seconds / 3600;
        match (seconds % 3600) / 60 {
            0 => format!("{}h", hours),
            m => format!("{}h {}m", hours, m),
        }
    }
}

/// `MM:SS` countdown for the rest timer.
pub fn countdown(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
