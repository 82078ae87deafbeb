/// Generic function to get environment variable, parsing it to the desired type.
pub fn get_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

/// Comma separated list from an environment variable. Unparseable items make the whole value invalid.
pub fn get_env_list<T: std::str::FromStr>(key: &str) -> Option<Vec<T>> {
    let value: String = get_env(key)?;
    parse_list(&value)
}

fn parse_list<T: std::str::FromStr>(value: &str) -> Option<Vec<T>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().ok())
        .collect()
}
