pub mod error;
pub mod models;
pub mod template_loader;
pub mod tpl;

pub use error::TemplateError;
pub use models::settings::Settings;
pub use tpl::engine::{Engine, Template, remove_template, render_template};
pub use tpl::library::TagLibrary;
pub use tpl::value::Value;
