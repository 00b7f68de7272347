/// Host operating system, as far as picking the `oc` binary name goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
}

impl Platform {
    /// Platform of the running process. Compute once per run and pass it on.
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` value. Unknown systems are treated as Linux.
    pub fn from_os(os: &str) -> Self {
        match os {
            "windows" => Platform::Windows,
            "macos" => Platform::MacOs,
            "linux" => Platform::Linux,
            other => {
                tracing::warn!(os = other, "unrecognized OS, assuming linux");
                Platform::Linux
            }
        }
    }

    pub fn executable_name(self) -> &'static str {
        match self {
            Platform::Windows => "oc.exe",
            Platform::Linux | Platform::MacOs => "oc",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Linux => write!(f, "linux"),
            Platform::MacOs => write!(f, "macos"),
            Platform::Windows => write!(f, "windows"),
        }
    }
}
