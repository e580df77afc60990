pub mod settings;
pub mod theme;
pub mod whoami;

pub use settings::settings_get;
pub use theme::theme_get;
pub use whoami::whoami_get;
