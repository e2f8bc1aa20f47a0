pub mod baby_mapper;
pub mod care_log_mapper;
pub mod sleep_check_mapper;

pub use baby_mapper::BabyMapper;
pub use care_log_mapper::CareLogMapper;
pub use sleep_check_mapper::SleepCheckMapper;
