//! Configuration access port trait.

/// Section/key lookups over whatever holds the dashboard settings.
/// Missing or malformed numeric and boolean values fall back to `default`.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;
}
