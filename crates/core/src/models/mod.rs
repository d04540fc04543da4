pub mod analytics;
pub mod crisis;
pub mod month;
pub mod position;
pub mod price;
pub mod request;
pub mod settings;
pub mod symbol;
