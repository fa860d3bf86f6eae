use log::LevelFilter;

/// 0: defer to `RUST_LOG`, 1: info, 2: debug, anything above: trace
pub fn to_level_filter(ulevel: u64) -> Option<LevelFilter> {
    match ulevel {
        0 => None,
        1 => Some(LevelFilter::Info),
        2 => Some(LevelFilter::Debug),
        _ => Some(LevelFilter::Trace),
    }
}

pub fn init_logging(ulevel: u64) {
    let mut builder = env_logger::Builder::from_default_env();
    if let Some(level) = to_level_filter(ulevel) {
        builder.filter_level(level);
    }
    // a logger may already be installed, e.g. when embedded in a larger simulator
    let _ = builder.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_levels_map_to_filters() {
        assert_eq!(to_level_filter(0), None);
        assert_eq!(to_level_filter(1), Some(LevelFilter::Info));
        assert_eq!(to_level_filter(2), Some(LevelFilter::Debug));
        assert_eq!(to_level_filter(9), Some(LevelFilter::Trace));
    }
}
