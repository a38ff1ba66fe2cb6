/// Main configuration module.
///
/// Game rules and server binding.
pub mod game;
pub mod server;
