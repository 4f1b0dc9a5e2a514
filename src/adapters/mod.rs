//! Adapters implementing domain ports.

pub mod controls;
pub mod in_memory_repository;
pub mod msgpack_repository;

pub use controls::{HeadlessControls, InterruptibleControls, ScriptedControls, interrupt_flag};
pub use in_memory_repository::InMemoryRepository;
pub use msgpack_repository::MsgPackRepository;
