/// Environment-backed configuration for a Leadgate service.
///
/// A service defines its config struct with `serde::Deserialize` and calls
/// `Config::from_env()` once in `main`.
///
/// # Panics
///
/// Panics when a required variable is missing or unparseable — a service
/// with broken config should not come up at all.
pub trait Config: Sized + serde::de::DeserializeOwned {
    fn from_env() -> Self {
        envy::from_env().expect("failed to load config from environment")
    }
}
