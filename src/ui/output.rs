//! Output verbosity.

/// Output verbosity mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Show everything.
    #[default]
    Normal,
    /// Show results and errors only: no headers, no status chatter.
    Quiet,
}

impl OutputMode {
    /// Check if this mode shows headers.
    pub fn shows_headers(&self) -> bool {
        matches!(self, Self::Normal)
    }

    /// Check if this mode shows success and warning lines.
    pub fn shows_status(&self) -> bool {
        matches!(self, Self::Normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_shows_everything() {
        assert!(OutputMode::Normal.shows_headers());
        assert!(OutputMode::Normal.shows_status());
    }

    #[test]
    fn quiet_hides_headers_and_status() {
        assert!(!OutputMode::Quiet.shows_headers());
        assert!(!OutputMode::Quiet.shows_status());
    }
}
