// ABOUTME: Display helpers for dashboard cards and tables
// ABOUTME: Duration formatting, success-rate bands, and percentage rendering

use std::fmt;

/// Format a duration in seconds as `12.5s` or `3m 4.2s`
pub fn format_duration(seconds: f64) -> String {
    if seconds < 60.0 {
        return format!("{:.1}s", seconds);
    }

    let minutes = (seconds / 60.0).floor();
    let remaining = seconds - minutes * 60.0;
    format!("{}m {:.1}s", minutes as u64, remaining)
}

/// Render a fractional rate as a percentage with one decimal
pub fn format_percentage(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

/// Health bucket for an agent's success rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessBand {
    Healthy,
    Degraded,
    Failing,
}

impl SuccessBand {
    pub fn from_rate(rate: f64) -> Self {
        if rate >= 0.8 {
            SuccessBand::Healthy
        } else if rate >= 0.5 {
            SuccessBand::Degraded
        } else {
            SuccessBand::Failing
        }
    }
}

impl fmt::Display for SuccessBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SuccessBand::Healthy => "healthy",
            SuccessBand::Degraded => "degraded",
            SuccessBand::Failing => "failing",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "0.0s");
        assert_eq!(format_duration(42.3), "42.3s");
        assert_eq!(format_duration(60.0), "1m 0.0s");
        assert_eq!(format_duration(184.5), "3m 4.5s");
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(0.875), "87.5%");
        assert_eq!(format_percentage(1.0), "100.0%");
    }

    #[test]
    fn test_success_band_thresholds() {
        assert_eq!(SuccessBand::from_rate(0.95), SuccessBand::Healthy);
        assert_eq!(SuccessBand::from_rate(0.8), SuccessBand::Healthy);
        assert_eq!(SuccessBand::from_rate(0.79), SuccessBand::Degraded);
        assert_eq!(SuccessBand::from_rate(0.5), SuccessBand::Degraded);
        assert_eq!(SuccessBand::from_rate(0.1), SuccessBand::Failing);
    }
}
