/// A platform pattern on the allow-list. `None` fields match anything.
struct SupportedPlatform {
    os: Option<&'static str>,
    arch: Option<&'static str>,
}

/// Platforms the camera/render path has actually been exercised on.
const SUPPORTED_PLATFORMS: &[SupportedPlatform] = &[
    SupportedPlatform {
        os: Some("macos"),
        arch: None,
    },
    SupportedPlatform {
        os: Some("windows"),
        arch: None,
    },
    SupportedPlatform {
        os: Some("linux"),
        arch: Some("x86_64"),
    },
];

/// Check the host against the allow-list. Returns a warning message to show
/// the user when the platform is unmatched; never fatal, the app runs anyway.
pub fn check_support() -> Option<String> {
    let warning = support_warning(std::env::consts::OS, std::env::consts::ARCH);
    if let Some(message) = &warning {
        log::warn!("{message}");
    }
    warning
}

fn support_warning(os: &str, arch: &str) -> Option<String> {
    let supported = SUPPORTED_PLATFORMS.iter().any(|platform| {
        platform.os.is_none_or(|p| p == os) && platform.arch.is_none_or(|p| p == arch)
    });

    if supported {
        None
    } else {
        Some(format!(
            "This app, running on {os}/{arch}, is not well supported at this time, \
             expect some flakiness while we improve our code."
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_platforms_pass() {
        assert!(support_warning("macos", "aarch64").is_none());
        assert!(support_warning("windows", "x86_64").is_none());
        assert!(support_warning("linux", "x86_64").is_none());
    }

    #[test]
    fn unknown_platforms_warn_but_name_the_host() {
        let warning = support_warning("freebsd", "riscv64").expect("should warn");
        assert!(warning.contains("freebsd/riscv64"));
    }

    #[test]
    fn arch_constrained_entries_apply() {
        assert!(support_warning("linux", "aarch64").is_some());
    }
}
