pub mod audit;
pub mod classify;
pub mod config;
pub mod fsview;
pub mod locate;
pub mod merge;
pub mod orphans;
pub mod plan;
pub mod record;
pub mod run;
pub mod unique;
