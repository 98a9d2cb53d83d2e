/// Value type names and the record type they are filed under. Anything not
/// listed becomes `profile_<valueType>`.
pub const RECORD_TYPES: [(&str, &str); 17] = [
    ("cpu", "profile_cpu"),
    ("itimer", "profile_cpu"),
    ("wall", "profile_cpu"),
    ("samples", "profile_cpu"),
    ("alloc_objects", "profile_mem"),
    ("alloc_space", "profile_mem"),
    ("inuse_objects", "profile_mem"),
    ("inuse_space", "profile_mem"),
    ("goroutine", "profile_goroutines"),
    ("goroutines", "profile_goroutines"),
    ("contentions", "profile_mutex"),
    ("delay", "profile_mutex"),
    ("lock_count", "profile_mutex"),
    ("lock_duration", "profile_mutex"),
    ("block_count", "profile_block"),
    ("block_duration", "profile_block"),
    ("exception", "profile_exception"),
];

pub fn record_type(value_type: &str) -> String {
    RECORD_TYPES
        .iter()
        .find(|(vt, _)| *vt == value_type)
        .map(|(_, rt)| rt.to_string())
        .unwrap_or_else(|| format!("profile_{}", value_type))
}

/// Renders a record value the way the pipeline expects: fixed two decimals.
pub fn format_val(val: f64) -> String {
    format!("{:.2}", val)
}

pub fn stack_id<'a>(frames: impl IntoIterator<Item = &'a [u8]>) -> String {
    let mut hasher = xxhash_rust::xxh64::Xxh64::new(0);
    for (i, frame) in frames.into_iter().enumerate() {
        if i > 0 {
            hasher.update(b"\n");
        }
        hasher.update(frame);
    }
    format!("{:016x}", hasher.digest())
}
