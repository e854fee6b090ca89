pub mod record;
pub mod run;
pub mod sessions;
pub mod status;
pub mod stop;
