/// Host platform the picker runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Android,
    Ios,
    Web,
    Desktop,
}

impl Platform {
    /// Platform this binary was compiled for
    pub fn current() -> Self {
        if cfg!(target_os = "android") {
            Platform::Android
        } else if cfg!(target_os = "ios") {
            Platform::Ios
        } else if cfg!(target_arch = "wasm32") {
            Platform::Web
        } else {
            Platform::Desktop
        }
    }

    /// The browser has no media library permission to ask for
    pub fn is_web(&self) -> bool {
        matches!(self, Platform::Web)
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Android => write!(f, "android"),
            Platform::Ios => write!(f, "ios"),
            Platform::Web => write!(f, "web"),
            Platform::Desktop => write!(f, "desktop"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_platform_on_host() {
        let platform = Platform::current();
        #[cfg(not(any(target_os = "android", target_os = "ios", target_arch = "wasm32")))]
        assert_eq!(platform, Platform::Desktop);
        assert_eq!(platform.is_web(), cfg!(target_arch = "wasm32"));
    }

    #[test]
    fn test_only_web_is_web() {
        assert!(Platform::Web.is_web());
        assert!(!Platform::Android.is_web());
        assert!(!Platform::Ios.is_web());
        assert!(!Platform::Desktop.is_web());
    }
}
