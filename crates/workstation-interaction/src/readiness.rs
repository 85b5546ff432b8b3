//! Best-effort detection of "dev server is ready" output.
//!
//! Matches the phrases common dev servers print once they listen. A server
//! that prints something else is simply not detected.

/// Returns whether `text` looks like a dev server announcing it is ready.
pub fn indicates_ready(text: &str) -> bool {
    let text = text.to_lowercase();

    (text.contains("ready") && text.contains("localhost"))
        || text.contains("local:")
        || (text.contains("compiled") && text.contains("success"))
        || text.contains("uvicorn running on")
        || text.contains("application startup complete")
        || (text.contains("running on") && text.contains("http://"))
}

/// Fires at most once per stream.
#[derive(Debug, Default)]
pub struct ReadinessDetector {
    fired: bool,
}

impl ReadinessDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true the first time `text` indicates readiness.
    pub fn observe(&mut self, text: &str) -> bool {
        if self.fired || !indicates_ready(text) {
            return false;
        }
        self.fired = true;
        true
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_server_banners() {
        assert!(indicates_ready("  ▲ Next.js 14 - ready started server on 0.0.0.0:3000, url: http://localhost:3000"));
        assert!(indicates_ready("  ➜  Local:   http://localhost:5173/"));
        assert!(indicates_ready("Compiled successfully!"));
        assert!(indicates_ready("INFO:     Uvicorn running on http://0.0.0.0:8001"));
        assert!(indicates_ready("INFO:     Application startup complete."));
        assert!(indicates_ready(" * Running on http://127.0.0.1:5000"));
    }

    #[test]
    fn test_ordinary_output_is_not_ready() {
        assert!(!indicates_ready("npm WARN deprecated"));
        assert!(!indicates_ready("ready"));
        assert!(!indicates_ready("Compiled with warnings"));
    }

    #[test]
    fn test_detector_fires_once() {
        let mut detector = ReadinessDetector::new();
        assert!(!detector.observe("installing..."));
        assert!(detector.observe("Local: http://localhost:5173"));
        assert!(!detector.observe("Local: http://localhost:5173"));
        assert!(detector.has_fired());
    }
}
