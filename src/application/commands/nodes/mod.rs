// src/application/commands/nodes/mod.rs
mod create;
mod fields;
mod service;
mod update;

pub use create::CreateNodeCommand;
pub use service::NodeCommandService;
pub use update::UpdateNodeCommand;
