pub mod bot_service;
pub mod run_state;
pub mod telegram_service;
