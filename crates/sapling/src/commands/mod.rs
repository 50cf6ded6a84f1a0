pub mod exists;
pub mod scaffold;
pub mod update;
