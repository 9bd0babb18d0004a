pub mod db;
pub mod recorder;
pub mod repositories;

pub use recorder::{SqliteTradeRecorder, TradeRecorder};
pub use repositories::TradeRepository;
