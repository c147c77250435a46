/// Outcome of a probe that received a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    /// Status code fell in `200..300`
    pub online: bool,

    /// Time from sending the request to receiving the response headers
    pub latency_ms: u64,

    /// HTTP status code, `None` for the offline substitute
    pub status_code: Option<u16>,
}

impl Probe {
    /// Classify a received status code
    pub fn from_status(status_code: u16, latency_ms: u64) -> Self {
        Self { online: (200..300).contains(&status_code), latency_ms, status_code: Some(status_code) }
    }

    /// What gets recorded when no response was received at all
    pub fn offline() -> Self {
        Self { online: false, latency_ms: 0, status_code: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_range_is_2xx_only() {
        assert!(Probe::from_status(200, 5).online);
        assert!(Probe::from_status(204, 5).online);
        assert!(Probe::from_status(299, 5).online);

        assert!(!Probe::from_status(199, 5).online);
        assert!(!Probe::from_status(300, 5).online);
        assert!(!Probe::from_status(301, 5).online);
        assert!(!Probe::from_status(404, 5).online);
        assert!(!Probe::from_status(503, 5).online);
    }

    #[test]
    fn test_offline_substitute() {
        let probe = Probe::offline();
        assert!(!probe.online);
        assert_eq!(probe.latency_ms, 0);
        assert_eq!(probe.status_code, None);
    }
}
