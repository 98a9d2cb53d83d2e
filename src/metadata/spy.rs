/// Agent spy names and the language tag records carry for them.
pub const SPY_LANGUAGES: [(&str, &str); 10] = [
    ("gospy", "go"),
    ("pyspy", "python"),
    ("rbspy", "ruby"),
    ("phpspy", "php"),
    ("dotnetspy", "dotnet"),
    ("ebpfspy", "ebpf"),
    ("javaspy", "java"),
    ("nodespy", "nodejs"),
    ("rustspy", "rust"),
    ("pyroscope-rs", "rust"),
];

pub const UNKNOWN_SPY: &str = "unknown";

/// Unknown spy names are passed through untouched.
pub fn language_of(spy_name: &str) -> &str {
    if spy_name.is_empty() {
        return UNKNOWN_SPY;
    }

    SPY_LANGUAGES
        .iter()
        .find(|(spy, _)| *spy == spy_name)
        .map(|(_, language)| *language)
        .unwrap_or(spy_name)
}
