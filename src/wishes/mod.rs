pub mod new;
pub mod update;
pub mod view;
