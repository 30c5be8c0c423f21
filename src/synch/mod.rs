//! Synchronization primitives

pub mod atomic;

pub use self::atomic::CoreAtomic;
