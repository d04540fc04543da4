pub mod analytics_service;
pub mod crisis_service;
pub mod drop_service;
pub mod extremes_service;
pub mod market_data_service;
pub mod monthly_service;
pub mod position_service;
pub mod price_history;
pub mod valuation_service;
